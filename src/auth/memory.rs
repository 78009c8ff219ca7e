//! In-memory collaborators for development and tests.

use async_trait::async_trait;
use secrecy::SecretString;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    error::StoreError,
    password::{hash_password, verify_password},
    session::{SessionContext, SessionManager},
    store::{AccountRecord, CredentialStore, RealmScope},
    utils::{generate_session_token, hash_session_token},
};

/// Accounts kept in creation order, so lookups across realms return the oldest.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    accounts: RwLock<Vec<AccountRecord>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an account with a local password hash.
    ///
    /// # Errors
    /// Returns an error if the password cannot be hashed.
    pub async fn insert(
        &self,
        username: &str,
        password: &SecretString,
        host_id: i64,
        auth: &str,
    ) -> Result<AccountRecord, StoreError> {
        let hash = hash_password(password)?;
        let record = AccountRecord::new(
            Uuid::new_v4(),
            username.to_string(),
            host_id,
            auth.to_string(),
        )
        .with_password_hash(SecretString::from(hash));
        self.accounts.write().await.push(record.clone());
        Ok(record)
    }

    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_username(
        &self,
        username: &str,
        scope: RealmScope,
    ) -> Result<Option<AccountRecord>, StoreError> {
        Ok(self
            .accounts
            .read()
            .await
            .iter()
            .find(|record| record.username == username && scope.matches(record.host_id))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AccountRecord>, StoreError> {
        Ok(self
            .accounts
            .read()
            .await
            .iter()
            .find(|record| record.id == id)
            .cloned())
    }

    async fn verify(
        &self,
        account: &AccountRecord,
        password: &SecretString,
    ) -> Result<bool, StoreError> {
        Ok(account
            .password_hash()
            .is_some_and(|hash| verify_password(password, hash)))
    }

    async fn create_account(
        &self,
        username: &str,
        auth: &str,
        host_id: i64,
        password: Option<&SecretString>,
    ) -> Result<AccountRecord, StoreError> {
        let hash = password.map(hash_password).transpose()?;
        let mut accounts = self.accounts.write().await;
        // Same (username, host) pair is unique, like the Postgres schema.
        if let Some(existing) = accounts
            .iter()
            .find(|record| record.username == username && record.host_id == host_id)
        {
            return Ok(existing.clone());
        }
        let record = AccountRecord::new(
            Uuid::new_v4(),
            username.to_string(),
            host_id,
            auth.to_string(),
        );
        let record = match hash {
            Some(hash) => record.with_password_hash(SecretString::from(hash)),
            None => record,
        };
        accounts.push(record.clone());
        Ok(record)
    }
}

#[derive(Debug, Default)]
pub struct MemorySessionManager {
    sessions: RwLock<HashMap<Vec<u8>, Uuid>>,
}

impl MemorySessionManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live sessions.
    pub async fn active(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionManager for MemorySessionManager {
    async fn complete_login(
        &self,
        session: &mut SessionContext,
        account: &AccountRecord,
    ) -> Result<(), StoreError> {
        let token = generate_session_token()?;
        self.sessions
            .write()
            .await
            .insert(hash_session_token(&token), account.id);
        session.bind(account.id, token);
        Ok(())
    }

    async fn resume(&self, token: &str) -> Result<Option<Uuid>, StoreError> {
        Ok(self
            .sessions
            .read()
            .await
            .get(&hash_session_token(token))
            .copied())
    }

    async fn revoke(&self, token: &str) -> Result<(), StoreError> {
        self.sessions
            .write()
            .await
            .remove(&hash_session_token(token));
        Ok(())
    }
}
