//! Credential store contract consumed by the authentication strategy.

use async_trait::async_trait;
use secrecy::SecretString;
use uuid::Uuid;

use super::error::StoreError;

/// Which accounts a username lookup may match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RealmScope {
    /// Any account, local or federated.
    Any,
    /// Only accounts owned by the given host (realm) id.
    Host(i64),
}

impl RealmScope {
    #[must_use]
    pub fn matches(self, host_id: i64) -> bool {
        match self {
            Self::Any => true,
            Self::Host(id) => id == host_id,
        }
    }

    /// Host id as an optional SQL parameter (`NULL` means no restriction).
    #[must_use]
    pub fn host_id(self) -> Option<i64> {
        match self {
            Self::Any => None,
            Self::Host(id) => Some(id),
        }
    }
}

/// Account handle returned by a [`CredentialStore`].
///
/// The password hash is only ever read back by the store that produced it.
#[derive(Clone, Debug)]
pub struct AccountRecord {
    pub id: Uuid,
    pub username: String,
    pub host_id: i64,
    pub auth: String,
    password_hash: Option<SecretString>,
}

impl AccountRecord {
    #[must_use]
    pub fn new(id: Uuid, username: String, host_id: i64, auth: String) -> Self {
        Self {
            id,
            username,
            host_id,
            auth,
            password_hash: None,
        }
    }

    #[must_use]
    pub fn with_password_hash(mut self, hash: SecretString) -> Self {
        self.password_hash = Some(hash);
        self
    }

    #[must_use]
    pub fn password_hash(&self) -> Option<&SecretString> {
        self.password_hash.as_ref()
    }
}

/// Account lookup and password verification.
///
/// Implementations must be safe under concurrent calls; each call is expected to
/// be atomic and return a consistent snapshot.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_username(
        &self,
        username: &str,
        scope: RealmScope,
    ) -> Result<Option<AccountRecord>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AccountRecord>, StoreError>;

    /// Check `password` against the account's stored hash.
    ///
    /// Accounts without a hash never verify.
    async fn verify(
        &self,
        account: &AccountRecord,
        password: &SecretString,
    ) -> Result<bool, StoreError>;

    /// Create an account owned by `auth`, storing a hash of `password` when given.
    /// An existing account with the same username and host is returned unchanged.
    async fn create_account(
        &self,
        username: &str,
        auth: &str,
        host_id: i64,
        password: Option<&SecretString>,
    ) -> Result<AccountRecord, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn realm_scope_matches() {
        assert!(RealmScope::Any.matches(1));
        assert!(RealmScope::Any.matches(42));
        assert!(RealmScope::Host(1).matches(1));
        assert!(!RealmScope::Host(1).matches(2));
    }

    #[test]
    fn realm_scope_host_id() {
        assert_eq!(RealmScope::Any.host_id(), None);
        assert_eq!(RealmScope::Host(3).host_id(), Some(3));
    }

    #[test]
    fn account_record_debug_redacts_hash() {
        let record = AccountRecord::new(Uuid::nil(), "alice".to_string(), 1, "link".to_string())
            .with_password_hash(SecretString::from("$argon2id$secret"));
        assert!(record.password_hash().is_some());
        assert!(!format!("{record:?}").contains("$argon2id$secret"));
    }
}
