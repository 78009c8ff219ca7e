//! Account lookups against the `users` table.

use async_trait::async_trait;
use secrecy::SecretString;
use sqlx::{postgres::PgRow, PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use crate::auth::{
    hash_password, verify_password, AccountRecord, CredentialStore, RealmScope, StoreError,
};

#[derive(Clone, Debug)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_span(operation: &'static str, statement: &'static str) -> tracing::Span {
    tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

fn account_from_row(row: &PgRow) -> AccountRecord {
    let record = AccountRecord::new(
        row.get("id"),
        row.get("username"),
        row.get("host_id"),
        row.get("auth"),
    );
    match row.get::<Option<String>, _>("password_hash") {
        Some(hash) => record.with_password_hash(SecretString::from(hash)),
        None => record,
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_username(
        &self,
        username: &str,
        scope: RealmScope,
    ) -> Result<Option<AccountRecord>, StoreError> {
        // NULL host id means any realm.
        let query = r"
            SELECT id, username, host_id, auth, password_hash
            FROM users
            WHERE username = $1
              AND ($2::bigint IS NULL OR host_id = $2)
              AND deleted_at IS NULL
            ORDER BY created_at
            LIMIT 1
        ";
        let row = sqlx::query(query)
            .bind(username)
            .bind(scope.host_id())
            .fetch_optional(&self.pool)
            .instrument(db_span("SELECT", query))
            .await?;

        Ok(row.as_ref().map(account_from_row))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<AccountRecord>, StoreError> {
        let query = r"
            SELECT id, username, host_id, auth, password_hash
            FROM users
            WHERE id = $1 AND deleted_at IS NULL
        ";
        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(db_span("SELECT", query))
            .await?;

        Ok(row.as_ref().map(account_from_row))
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

        // A concurrent login for the same username may insert first; the no-op
        // update makes RETURNING yield that active row. Deleted rows are outside
        // the arbiter index, so they never come back.
        let query = r"
            INSERT INTO users (username, host_id, auth, password_hash)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (username, host_id) WHERE deleted_at IS NULL
            DO UPDATE SET username = EXCLUDED.username
            RETURNING id, username, host_id, auth, password_hash
        ";
        let row = sqlx::query(query)
            .bind(username)
            .bind(host_id)
            .bind(auth)
            .bind(hash)
            .fetch_one(&self.pool)
            .instrument(db_span("INSERT", query))
            .await?;

        Ok(account_from_row(&row))
    }
}
