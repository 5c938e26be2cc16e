//! Token format and hashing.
//!
//! Plaintext tokens look like `rsk_<token id, 32 hex>_<secret, 64 hex>`. The id
//! half selects the stored record and the secret half is checked against its
//! argon2 hash, so authentication costs one lookup and one verification.

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        rand_core::{OsRng, RngCore},
    },
};
use uuid::Uuid;

use crate::error::{TokenError, TokenResult};

pub const TOKEN_PREFIX: &str = "rsk_";

const SECRET_BYTES: usize = 32;

/// Fresh random secret, hex encoded
pub fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    OsRng.fill_bytes(&mut bytes);
    const_hex::encode(bytes)
}

pub fn format_token(id: Uuid, secret: &str) -> String {
    format!("{TOKEN_PREFIX}{}_{secret}", id.simple())
}

/// Split a plaintext token into its id and secret
pub fn parse_token(token: &str) -> TokenResult<(Uuid, &str)> {
    let rest = token.trim().strip_prefix(TOKEN_PREFIX).ok_or(TokenError::InvalidToken)?;
    let (id, secret) = rest.split_once('_').ok_or(TokenError::InvalidToken)?;
    if secret.is_empty() {
        return Err(TokenError::InvalidToken);
    }
    let id = Uuid::try_parse(id).map_err(|_| TokenError::InvalidToken)?;
    Ok((id, secret))
}

pub fn hash_secret(secret: &str) -> TokenResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| TokenError::Hash(e.to_string()))
}

pub fn verify_secret(secret: &str, hash: &str) -> TokenResult<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| TokenError::Hash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(secret.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_then_parse() {
        let id = Uuid::now_v7();
        let secret = generate_secret();
        let token = format_token(id, &secret);

        assert!(token.starts_with("rsk_"));
        let (parsed_id, parsed_secret) = parse_token(&token).unwrap();
        assert_eq!(parsed_id, id);
        assert_eq!(parsed_secret, secret);
    }

    #[test]
    fn test_secrets_are_random_hex() {
        let a = generate_secret();
        let b = generate_secret();
        assert_eq!(a.len(), SECRET_BYTES * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for token in [
            "",
            "rsk_",
            "abc_def",
            "rsk_nothex_secret",
            "rsk_0190a5b2c3d47e8f9a0b1c2d3e4f5a6b_",
            "rsk_0190a5b2c3d47e8f9a0b1c2d3e4f5a6b",
        ] {
            assert!(
                matches!(parse_token(token), Err(TokenError::InvalidToken)),
                "accepted {token:?}"
            );
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_secret("s3cret").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(verify_secret("s3cret", &hash).unwrap());
        assert!(!verify_secret("other", &hash).unwrap());
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(matches!(
            verify_secret("s3cret", "not-a-phc-string"),
            Err(TokenError::Hash(_))
        ));
    }
}
