use crate::{
    api::{self, AppState},
    auth::{LinkAuth, SiteConfig},
    storage::{PgCredentialStore, PgSessionManager},
};
use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tracing::debug;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub site_url: Url,
    pub local_host_id: i64,
    pub session_ttl_seconds: i64,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database is unreachable or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&args.dsn)
        .await
        .context("Failed to connect to database")?;

    let site = SiteConfig::new(args.site_url).with_local_host_id(args.local_host_id);
    debug!("Site: {:?}", site);

    let store = Arc::new(PgCredentialStore::new(pool.clone()));
    let sessions =
        Arc::new(PgSessionManager::new(pool).with_ttl_seconds(args.session_ttl_seconds));
    let plugin = Arc::new(LinkAuth::new(store.clone(), sessions.clone(), site.clone()));

    let state = AppState::new(plugin, store, sessions, site)
        .with_session_ttl_seconds(args.session_ttl_seconds);

    api::new(args.port, Arc::new(state)).await
}
