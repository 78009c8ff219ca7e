//! Token and hashing helpers shared by the session managers.

use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

use super::error::StoreError;

/// Create a new session token for the auth cookie.
/// The raw value is only returned to set the cookie; stores keep a hash.
pub(crate) fn generate_session_token() -> Result<String, StoreError> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|err| StoreError::Hash(format!("failed to generate session token: {err}")))?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}

/// Hash a session token so raw values never touch storage.
pub(crate) fn hash_session_token(token: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_session_token_round_trip() {
        let decoded_len = generate_session_token()
            .ok()
            .and_then(|token| Base64UrlUnpadded::decode_vec(&token).ok())
            .map(|bytes| bytes.len());
        assert_eq!(decoded_len, Some(32));
    }

    #[test]
    fn generate_session_token_unique() {
        let first = generate_session_token().ok();
        let second = generate_session_token().ok();
        assert!(first.is_some());
        assert_ne!(first, second);
    }

    #[test]
    fn hash_session_token_stable() {
        assert_eq!(hash_session_token("token"), hash_session_token("token"));
        assert_ne!(hash_session_token("token"), hash_session_token("other"));
        assert_eq!(hash_session_token("token").len(), 32);
    }
}
