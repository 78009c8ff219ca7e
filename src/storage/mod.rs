//! Postgres backed collaborators.

mod accounts;
mod sessions;

pub use accounts::PgCredentialStore;
pub use sessions::PgSessionManager;
