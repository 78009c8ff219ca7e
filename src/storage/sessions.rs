//! Session rows in the `sessions` table, keyed by token hash.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use crate::auth::{
    utils::{generate_session_token, hash_session_token},
    AccountRecord, SessionContext, SessionManager, StoreError,
};

const DEFAULT_SESSION_TTL_SECONDS: i64 = 12 * 60 * 60;

#[derive(Clone, Debug)]
pub struct PgSessionManager {
    pool: PgPool,
    ttl_seconds: i64,
}

impl PgSessionManager {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_ttl_seconds(mut self, seconds: i64) -> Self {
        self.ttl_seconds = seconds;
        self
    }
}

#[async_trait]
impl SessionManager for PgSessionManager {
    async fn complete_login(
        &self,
        session: &mut SessionContext,
        account: &AccountRecord,
    ) -> Result<(), StoreError> {
        let token = generate_session_token()?;
        // Only the hash is stored; the raw token goes to the cookie.
        let query = r"
            INSERT INTO sessions (token_hash, user_id, expires_at)
            VALUES ($1, $2, NOW() + make_interval(secs => $3))
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        sqlx::query(query)
            .bind(hash_session_token(&token))
            .bind(account.id)
            .bind(self.ttl_seconds as f64)
            .execute(&self.pool)
            .instrument(span)
            .await?;

        session.bind(account.id, token);
        Ok(())
    }

    async fn resume(&self, token: &str) -> Result<Option<Uuid>, StoreError> {
        let query = r"
            SELECT user_id
            FROM sessions
            WHERE token_hash = $1 AND expires_at > NOW()
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(hash_session_token(token))
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;

        Ok(row.map(|row| row.get("user_id")))
    }

    async fn revoke(&self, token: &str) -> Result<(), StoreError> {
        let query = "DELETE FROM sessions WHERE token_hash = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "DELETE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(hash_session_token(token))
            .execute(&self.pool)
            .instrument(span)
            .await?;
        Ok(())
    }
}
