//! Argon2 password hashing for locally stored credentials.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, SaltString},
    Argon2, PasswordHasher, PasswordVerifier,
};
use secrecy::{ExposeSecret, SecretString};

use super::error::StoreError;

/// Hash a password into a PHC string.
///
/// # Errors
/// Returns an error if the hasher rejects its parameters.
pub fn hash_password(password: &SecretString) -> Result<String, StoreError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.expose_secret().as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| StoreError::Hash(err.to_string()))
}

/// Check a password against a PHC string. Malformed hashes never verify.
#[must_use]
pub fn verify_password(password: &SecretString, phc: &SecretString) -> bool {
    PasswordHash::new(phc.expose_secret()).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.expose_secret().as_bytes(), &parsed)
            .is_ok()
    })
}
