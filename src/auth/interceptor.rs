//! Login completed from page parameters instead of a form submission.

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, instrument};

use super::{
    error::StoreError,
    plugin::LoginOutcome,
    redirect::{resolve, RedirectIntent},
    session::{SessionContext, SessionManager},
    site::SiteConfig,
    store::{CredentialStore, RealmScope},
};

/// Untrusted login parameters taken verbatim from the request.
#[derive(Debug)]
pub struct LoginParams {
    pub username: String,
    pub password: SecretString,
    pub wants_url: Option<String>,
    /// Every query parameter of the request, in order.
    pub query: Vec<(String, String)>,
}

impl LoginParams {
    /// Pick `username`, `password` and `wantsurl` out of raw query pairs.
    /// Later duplicates win, missing values are empty.
    #[must_use]
    pub fn from_query(query: Vec<(String, String)>) -> Self {
        let last = |name: &str| {
            query
                .iter()
                .rev()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
        };

        Self {
            username: last("username").unwrap_or_default(),
            password: SecretString::from(last("password").unwrap_or_default()),
            wants_url: last("wantsurl").filter(|url| !url.is_empty()),
            query,
        }
    }

    fn has_credentials(&self) -> bool {
        !self.username.is_empty() && !self.password.expose_secret().is_empty()
    }
}

pub struct LoginInterceptor<'a> {
    store: &'a dyn CredentialStore,
    sessions: &'a dyn SessionManager,
    site: &'a SiteConfig,
}

impl<'a> LoginInterceptor<'a> {
    #[must_use]
    pub fn new(
        store: &'a dyn CredentialStore,
        sessions: &'a dyn SessionManager,
        site: &'a SiteConfig,
    ) -> Self {
        Self {
            store,
            sessions,
            site,
        }
    }

    /// Authenticate from page parameters and pick the redirect target.
    ///
    /// Any account may match here, regardless of realm. A wrong password or an
    /// unknown username both end in `Continue`, so the login page renders the same
    /// way in either case.
    ///
    /// # Errors
    /// Store and session failures propagate unchanged.
    #[instrument(skip_all, fields(username = %params.username))]
    pub async fn run(
        &self,
        params: &LoginParams,
        session: &mut SessionContext,
    ) -> Result<LoginOutcome, StoreError> {
        if session.is_logged_in() || !params.has_credentials() {
            return Ok(LoginOutcome::Continue);
        }

        let Some(account) = self
            .store
            .find_by_username(&params.username, RealmScope::Any)
            .await?
        else {
            debug!("No account for link login");
            return Ok(LoginOutcome::Continue);
        };

        if !self.store.verify(&account, &params.password).await? {
            debug!("Link login rejected");
            return Ok(LoginOutcome::Continue);
        }

        self.sessions.complete_login(session, &account).await?;
        info!(account_id = %account.id, "Link login completed");

        let intent = RedirectIntent::new(params.query.clone())
            .with_session_wants_url(session.wants_url())
            .with_request_wants_url(params.wants_url.as_deref());

        Ok(LoginOutcome::Redirect(resolve(&intent, self.site)))
    }
}
