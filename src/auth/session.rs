//! Per-request session view and the session manager contract.

use async_trait::async_trait;
use uuid::Uuid;

use super::{error::StoreError, store::AccountRecord};

/// What the authentication strategy can see of the host session.
#[derive(Clone, Debug, Default)]
pub struct SessionContext {
    account_id: Option<Uuid>,
    wants_url: Option<String>,
    issued_token: Option<String>,
}

impl SessionContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_account(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    /// Forget the account, e.g. when it no longer exists.
    #[must_use]
    pub fn without_account(mut self) -> Self {
        self.account_id = None;
        self
    }

    #[must_use]
    pub fn with_wants_url(mut self, wants_url: String) -> Self {
        self.wants_url = Some(wants_url).filter(|url| !url.is_empty());
        self
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.account_id.is_some()
    }

    #[must_use]
    pub fn account_id(&self) -> Option<Uuid> {
        self.account_id
    }

    /// URL stored when an anonymous visitor was bounced to the login page.
    #[must_use]
    pub fn wants_url(&self) -> Option<&str> {
        self.wants_url.as_deref()
    }

    /// Raw session token minted by the last [`SessionManager::complete_login`].
    #[must_use]
    pub fn issued_token(&self) -> Option<&str> {
        self.issued_token.as_deref()
    }

    /// Mark the session as authenticated. Only session managers call this.
    pub fn bind(&mut self, account_id: Uuid, token: String) {
        self.account_id = Some(account_id);
        self.issued_token = Some(token);
    }
}

#[async_trait]
pub trait SessionManager: Send + Sync {
    /// Bind `account` to the session and mint a new session token.
    async fn complete_login(
        &self,
        session: &mut SessionContext,
        account: &AccountRecord,
    ) -> Result<(), StoreError>;

    /// Resolve a raw session token into the account it was issued for.
    async fn resume(&self, token: &str) -> Result<Option<Uuid>, StoreError>;

    async fn revoke(&self, token: &str) -> Result<(), StoreError>;
}
