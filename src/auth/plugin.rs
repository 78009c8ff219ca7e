//! Pluggable authentication strategy contract.

use async_trait::async_trait;
use secrecy::SecretString;
use url::Url;

use super::{
    error::StoreError, interceptor::LoginParams, session::SessionContext, store::AccountRecord,
};

/// Result of a login page hook.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Nothing happened, render the page as usual.
    Continue,
    /// The session was completed, send the client here and stop handling.
    Redirect(Url),
}

/// Capabilities a host expects from an authentication strategy.
///
/// Defaults describe a conservative internal strategy: no password management
/// and no login page hooks. Strategies override what they support.
#[async_trait]
pub trait AuthPlugin: Send + Sync {
    /// Name stored on accounts created through this strategy.
    fn auth_type(&self) -> &'static str;

    /// Decide whether `username` / `password` may log in.
    async fn user_login(&self, username: &str, password: &SecretString)
        -> Result<bool, StoreError>;

    /// Store a new password for `account`; `false` when the strategy refuses.
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
        false
    }

    fn is_internal(&self) -> bool {
        true
    }

    fn prevent_local_passwords(&self) -> bool {
        !self.is_internal()
    }

    /// Where users change their password; `None` means the host default.
    fn change_password_url(&self) -> Option<Url> {
        None
    }

    fn can_be_manually_set(&self) -> bool {
        false
    }

    /// Runs before an anonymous visitor is bounced to the login page.
    async fn pre_loginpage_hook(
        &self,
        _params: &LoginParams,
        _session: &mut SessionContext,
    ) -> Result<LoginOutcome, StoreError> {
        Ok(LoginOutcome::Continue)
    }

    /// Runs before the login page is rendered.
    async fn loginpage_hook(
        &self,
        _params: &LoginParams,
        _session: &mut SessionContext,
    ) -> Result<LoginOutcome, StoreError> {
        Ok(LoginOutcome::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DenyAll;

    #[async_trait]
    impl AuthPlugin for DenyAll {
        fn auth_type(&self) -> &'static str {
            "nologin"
        }

        async fn user_login(&self, _: &str, _: &SecretString) -> Result<bool, StoreError> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn defaults_are_conservative() {
        let plugin = DenyAll;
        assert!(!plugin.can_change_password());
        assert!(!plugin.can_reset_password());
        assert!(plugin.is_internal());
        assert!(!plugin.prevent_local_passwords());
        assert!(plugin.change_password_url().is_none());
        assert!(!plugin.can_be_manually_set());

        let mut session = SessionContext::new();
        let params = LoginParams::from_query(vec![
            ("username".to_string(), "alice".to_string()),
            ("password".to_string(), "secret".to_string()),
        ]);
        let outcome = plugin.loginpage_hook(&params, &mut session).await;
        assert!(matches!(outcome, Ok(LoginOutcome::Continue)));
        assert!(!session.is_logged_in());
    }
}
