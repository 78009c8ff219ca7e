//! Shared state for the HTTP handlers.

use std::sync::Arc;

use crate::auth::{AuthPlugin, CredentialStore, SessionManager, SiteConfig};

const DEFAULT_SESSION_TTL_SECONDS: i64 = 12 * 60 * 60;

#[derive(Clone)]
pub struct AppState {
    plugin: Arc<dyn AuthPlugin>,
    store: Arc<dyn CredentialStore>,
    sessions: Arc<dyn SessionManager>,
    site: SiteConfig,
    session_ttl_seconds: i64,
}

impl AppState {
    #[must_use]
    pub fn new(
        plugin: Arc<dyn AuthPlugin>,
        store: Arc<dyn CredentialStore>,
        sessions: Arc<dyn SessionManager>,
        site: SiteConfig,
    ) -> Self {
        Self {
            plugin,
            store,
            sessions,
            site,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    pub(crate) fn plugin(&self) -> &dyn AuthPlugin {
        self.plugin.as_ref()
    }

    pub(crate) fn store(&self) -> &dyn CredentialStore {
        self.store.as_ref()
    }

    pub(crate) fn sessions(&self) -> &dyn SessionManager {
        self.sessions.as_ref()
    }

    pub(crate) fn site(&self) -> &SiteConfig {
        &self.site
    }

    pub(crate) fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }
}
