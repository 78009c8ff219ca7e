//! Authorization by direct link.
//!
//! Any username is accepted unless a local account with that username already
//! exists, in which case the local password decides. Federated accounts are never
//! matched by [`LinkAuth::user_login`], so a remote identity cannot be taken over
//! through this strategy.

use async_trait::async_trait;
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::{
    error::StoreError,
    interceptor::{LoginInterceptor, LoginParams},
    plugin::{AuthPlugin, LoginOutcome},
    session::{SessionContext, SessionManager},
    site::SiteConfig,
    store::{AccountRecord, CredentialStore, RealmScope},
};

pub const AUTH_TYPE: &str = "link";

#[derive(Clone)]
pub struct LinkAuth {
    store: Arc<dyn CredentialStore>,
    sessions: Arc<dyn SessionManager>,
    site: SiteConfig,
}

impl LinkAuth {
    #[must_use]
    pub fn new(
        store: Arc<dyn CredentialStore>,
        sessions: Arc<dyn SessionManager>,
        site: SiteConfig,
    ) -> Self {
        Self {
            store,
            sessions,
            site,
        }
    }

    fn interceptor(&self) -> LoginInterceptor<'_> {
        LoginInterceptor::new(self.store.as_ref(), self.sessions.as_ref(), &self.site)
    }
}

#[async_trait]
impl AuthPlugin for LinkAuth {
    fn auth_type(&self) -> &'static str {
        AUTH_TYPE
    }

    #[instrument(skip(self, password))]
    async fn user_login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<bool, StoreError> {
        let scope = RealmScope::Host(self.site.local_host_id());
        match self.store.find_by_username(username, scope).await? {
            Some(account) => self.store.verify(&account, password).await,
            None => {
                debug!("No local account, accepting");
                Ok(true)
            }
        }
    }

    async fn update_password(
        &self,
        _account: &AccountRecord,
        _new_password: &SecretString,
    ) -> Result<bool, StoreError> {
        Ok(false)
    }

    fn can_change_password(&self) -> bool {
        false
    }

    fn can_reset_password(&self) -> bool {
        true
    }

    fn is_internal(&self) -> bool {
        true
    }

    fn prevent_local_passwords(&self) -> bool {
        false
    }

    fn can_be_manually_set(&self) -> bool {
        true
    }

    async fn pre_loginpage_hook(
        &self,
        params: &LoginParams,
        session: &mut SessionContext,
    ) -> Result<LoginOutcome, StoreError> {
        self.loginpage_hook(params, session).await
    }

    async fn loginpage_hook(
        &self,
        params: &LoginParams,
        session: &mut SessionContext,
    ) -> Result<LoginOutcome, StoreError> {
        self.interceptor().run(params, session).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::memory::{MemoryCredentialStore, MemorySessionManager};
    use anyhow::Result;

    struct Fixture {
        store: Arc<MemoryCredentialStore>,
        sessions: Arc<MemorySessionManager>,
        auth: LinkAuth,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryCredentialStore::new());
        let sessions = Arc::new(MemorySessionManager::new());
        let site = SiteConfig::parse("https://school.example/").map(|site| site.with_local_host_id(1));
        let auth = LinkAuth::new(
            store.clone(),
            sessions.clone(),
            site.expect("valid site url"),
        );
        Fixture {
            store,
            sessions,
            auth,
        }
    }

    fn params(pairs: &[(&str, &str)]) -> LoginParams {
        LoginParams::from_query(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    #[tokio::test]
    async fn unknown_username_is_accepted() -> Result<()> {
        let f = fixture();
        for password in ["", "anything", "🔑"] {
            assert!(f.auth.user_login("newuser", &SecretString::from(password)).await?);
        }
        Ok(())
    }

    #[tokio::test]
    async fn local_account_requires_its_password() -> Result<()> {
        let f = fixture();
        f.store
            .insert("alice", &SecretString::from("right"), 1, "manual")
            .await?;
        assert!(f.auth.user_login("alice", &SecretString::from("right")).await?);
        assert!(!f.auth.user_login("alice", &SecretString::from("wrong")).await?);
        Ok(())
    }

    #[tokio::test]
    async fn federated_account_is_not_matched() -> Result<()> {
        let f = fixture();
        f.store
            .insert("remote", &SecretString::from("right"), 2, "mnet")
            .await?;
        assert!(f.auth.user_login("remote", &SecretString::from("wrong")).await?);
        Ok(())
    }

    /// Lookups succeed or fail per flag; verification always hits the database.
    struct FailingStore {
        lookup_fails: bool,
    }

    #[async_trait]
    impl CredentialStore for FailingStore {
        async fn find_by_username(
            &self,
            username: &str,
            scope: RealmScope,
        ) -> Result<Option<AccountRecord>, StoreError> {
            if self.lookup_fails {
                return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
            }
            Ok(Some(AccountRecord::new(
                uuid::Uuid::new_v4(),
                username.to_string(),
                scope.host_id().unwrap_or(1),
                "manual".to_string(),
            )))
        }

        async fn find_by_id(
            &self,
            _id: uuid::Uuid,
        ) -> Result<Option<AccountRecord>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn verify(
            &self,
            _account: &AccountRecord,
            _password: &SecretString,
        ) -> Result<bool, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        }

        async fn create_account(
            &self,
            username: &str,
            _auth: &str,
            _host_id: i64,
            _password: Option<&SecretString>,
        ) -> Result<AccountRecord, StoreError> {
            Err(StoreError::MissingAccount(username.to_string()))
        }
    }

    fn failing(lookup_fails: bool) -> Result<LinkAuth> {
        let site = SiteConfig::parse("https://school.example/")?;
        Ok(LinkAuth::new(
            Arc::new(FailingStore { lookup_fails }),
            Arc::new(MemorySessionManager::new()),
            site,
        ))
    }

    #[tokio::test]
    async fn user_login_propagates_lookup_failure() -> Result<()> {
        let auth = failing(true)?;
        let result = auth.user_login("alice", &SecretString::from("right")).await;
        assert!(matches!(
            result,
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn user_login_propagates_verify_failure() -> Result<()> {
        let auth = failing(false)?;
        let result = auth.user_login("alice", &SecretString::from("right")).await;
        assert!(matches!(
            result,
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn user_login_has_no_side_effects() -> Result<()> {
        let f = fixture();
        f.auth.user_login("newuser", &SecretString::from("x")).await?;
        assert!(f.store.is_empty().await);
        assert_eq!(f.sessions.active().await, 0);
        Ok(())
    }

    #[tokio::test]
    async fn password_policy_is_constant() -> Result<()> {
        let f = fixture();
        let account = f.store.create_account("bob", AUTH_TYPE, 1, None).await?;
        assert_eq!(f.auth.auth_type(), "link");
        assert!(!f.auth.can_change_password());
        assert!(f.auth.can_reset_password());
        assert!(f.auth.is_internal());
        assert!(!f.auth.prevent_local_passwords());
        assert!(f.auth.change_password_url().is_none());
        assert!(f.auth.can_be_manually_set());
        assert!(!f.auth.update_password(&account, &SecretString::from("new")).await?);
        Ok(())
    }

    #[tokio::test]
    async fn hook_logs_in_and_redirects() -> Result<()> {
        let f = fixture();
        f.store
            .insert("alice", &SecretString::from("right"), 1, "manual")
            .await?;
        let mut session = SessionContext::new();
        let outcome = f
            .auth
            .loginpage_hook(
                &params(&[("username", "alice"), ("password", "right"), ("lang", "en")]),
                &mut session,
            )
            .await?;

        let target = url::Url::parse("https://school.example/?lang=en")?;
        assert_eq!(outcome, LoginOutcome::Redirect(target));
        assert!(session.is_logged_in());
        assert!(session.issued_token().is_some());
        assert_eq!(f.sessions.active().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn hook_matches_any_realm() -> Result<()> {
        let f = fixture();
        f.store
            .insert("remote", &SecretString::from("right"), 2, "mnet")
            .await?;
        let mut session = SessionContext::new();
        let outcome = f
            .auth
            .pre_loginpage_hook(
                &params(&[("username", "remote"), ("password", "right")]),
                &mut session,
            )
            .await?;
        assert!(matches!(outcome, LoginOutcome::Redirect(_)));
        Ok(())
    }

    #[tokio::test]
    async fn hook_wrong_password_falls_through() -> Result<()> {
        let f = fixture();
        f.store
            .insert("alice", &SecretString::from("right"), 1, "manual")
            .await?;
        let mut session = SessionContext::new();
        let outcome = f
            .auth
            .loginpage_hook(
                &params(&[("username", "alice"), ("password", "wrong")]),
                &mut session,
            )
            .await?;
        assert_eq!(outcome, LoginOutcome::Continue);
        assert!(!session.is_logged_in());
        assert_eq!(f.sessions.active().await, 0);
        Ok(())
    }

    #[tokio::test]
    async fn hook_needs_both_parameters() -> Result<()> {
        let f = fixture();
        f.store
            .insert("alice", &SecretString::from("right"), 1, "manual")
            .await?;
        for pairs in [
            vec![("username", "alice")],
            vec![("password", "right")],
            vec![("username", ""), ("password", "right")],
            vec![("username", "alice"), ("password", "")],
            vec![],
        ] {
            let mut session = SessionContext::new();
            let outcome = f.auth.loginpage_hook(&params(&pairs), &mut session).await?;
            assert_eq!(outcome, LoginOutcome::Continue);
        }
        assert_eq!(f.sessions.active().await, 0);
        Ok(())
    }

    #[tokio::test]
    async fn hook_is_idempotent_once_logged_in() -> Result<()> {
        let f = fixture();
        f.store
            .insert("alice", &SecretString::from("right"), 1, "manual")
            .await?;
        let login = params(&[("username", "alice"), ("password", "right")]);
        let mut session = SessionContext::new();

        let first = f.auth.loginpage_hook(&login, &mut session).await?;
        assert!(matches!(first, LoginOutcome::Redirect(_)));
        let token = session.issued_token().map(ToString::to_string);

        for _ in 0..2 {
            let again = f.auth.loginpage_hook(&login, &mut session).await?;
            assert_eq!(again, LoginOutcome::Continue);
        }
        assert_eq!(session.issued_token().map(ToString::to_string), token);
        assert_eq!(f.sessions.active().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn hook_prefers_session_wants_url() -> Result<()> {
        let f = fixture();
        f.store
            .insert("alice", &SecretString::from("right"), 1, "manual")
            .await?;
        let mut session = SessionContext::new().with_wants_url("/course/5".to_string());
        let outcome = f
            .auth
            .loginpage_hook(
                &params(&[
                    ("username", "alice"),
                    ("password", "right"),
                    ("wantsurl", "/evil"),
                ]),
                &mut session,
            )
            .await?;
        let target = url::Url::parse("https://school.example/course/5")?;
        assert_eq!(outcome, LoginOutcome::Redirect(target));
        Ok(())
    }

    #[tokio::test]
    async fn hook_rejects_off_site_wants_url() -> Result<()> {
        let f = fixture();
        f.store
            .insert("alice", &SecretString::from("right"), 1, "manual")
            .await?;
        let mut session = SessionContext::new();
        let outcome = f
            .auth
            .loginpage_hook(
                &params(&[
                    ("username", "alice"),
                    ("password", "right"),
                    ("wantsurl", "https://attacker.example/phish"),
                ]),
                &mut session,
            )
            .await?;
        let target = url::Url::parse("https://school.example/")?;
        assert_eq!(outcome, LoginOutcome::Redirect(target));
        Ok(())
    }
}
