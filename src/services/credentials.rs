//! Password records, password hashing and token generation.
//!
//! Password storage comes in two shapes: a legacy unsalted SHA-256 hex
//! digest carried over from old installations, and the current Argon2id
//! PHC string. Legacy records are upgraded in place on the next
//! successful authentication (see `UserService::authenticate`).

use anyhow::Result;
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

use crate::config::SecurityConfig;

/// Initial-signup passwords are mailed to the user, so they stay short.
pub const GENERATED_PASSWORD_LEN: usize = 12;

/// Feed tokens end up in URLs; same alphabet and length as passwords.
pub const FEED_TOKEN_LEN: usize = 12;

pub const RECOVER_KEY_LEN: usize = 30;

/// Tagged password record. The on-disk form is a single string column;
/// the `$argon2` prefix distinguishes the two variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordRecord {
    /// Unsalted SHA-256 hex digest over the plaintext.
    Legacy(String),

    /// Argon2id PHC string (salt embedded).
    Salted(String),
}

impl PasswordRecord {
    #[must_use]
    pub fn parse(stored: &str) -> Self {
        if stored.starts_with("$argon2") {
            Self::Salted(stored.to_string())
        } else {
            Self::Legacy(stored.to_string())
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Legacy(s) | Self::Salted(s) => s,
        }
    }

    #[must_use]
    pub const fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy(_))
    }
}

fn argon2(config: &SecurityConfig) -> Result<Argon2<'static>> {
    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a password with a freshly generated salt.
///
/// CPU-intensive; call through `spawn_blocking` on async paths.
pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<PasswordRecord> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = argon2(config)?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(PasswordRecord::Salted(hash.to_string()))
}

/// Verify a plaintext against a stored record. Legacy records compare
/// against the unsalted digest; salted records go through Argon2.
pub fn verify_password(record: &PasswordRecord, password: &str) -> Result<bool> {
    match record {
        PasswordRecord::Legacy(digest) => Ok(legacy_digest(password) == *digest),
        PasswordRecord::Salted(phc) => {
            let parsed = PasswordHash::new(phc)
                .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

            Ok(Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok())
        }
    }
}

/// Unsalted digest used by legacy records.
#[must_use]
pub fn legacy_digest(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());

    digest.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

fn random_alphanumeric(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Random initial password for new signups.
#[must_use]
pub fn generate_password() -> String {
    random_alphanumeric(GENERATED_PASSWORD_LEN)
}

/// Random single-use password recovery key.
#[must_use]
pub fn generate_recover_key() -> String {
    random_alphanumeric(RECOVER_KEY_LEN)
}

/// Random feed access token.
#[must_use]
pub fn generate_feed_token() -> String {
    random_alphanumeric(FEED_TOKEN_LEN)
}

/// Constant-time equality for feed tokens.
#[must_use]
pub fn token_matches(presented: &str, stored: &str) -> bool {
    use subtle::ConstantTimeEq;

    if presented.len() != stored.len() {
        return false;
    }

    presented.as_bytes().ct_eq(stored.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SecurityConfig {
        // Low-cost params keep the test suite fast.
        SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        }
    }

    #[test]
    fn hash_and_verify_roundtrip() {
        let record = hash_password("letmein", &test_config()).unwrap();

        assert!(!record.is_legacy());
        assert!(verify_password(&record, "letmein").unwrap());
        assert!(!verify_password(&record, "letmeout").unwrap());
    }

    #[test]
    fn hashing_salts_every_time() {
        let a = hash_password("letmein", &test_config()).unwrap();
        let b = hash_password("letmein", &test_config()).unwrap();

        assert_ne!(a.as_str(), b.as_str());
    }

    #[test]
    fn legacy_records_verify_against_unsalted_digest() {
        let record = PasswordRecord::parse(&legacy_digest("letmein"));

        assert!(record.is_legacy());
        assert!(verify_password(&record, "letmein").unwrap());
        assert!(!verify_password(&record, "wrong").unwrap());
    }

    #[test]
    fn parse_distinguishes_record_shapes() {
        let salted = hash_password("x", &test_config()).unwrap();

        assert!(matches!(
            PasswordRecord::parse(salted.as_str()),
            PasswordRecord::Salted(_)
        ));
        assert!(matches!(
            PasswordRecord::parse("0d107d09f5bbe40cade3de5c71e9e9b7"),
            PasswordRecord::Legacy(_)
        ));
    }

    #[test]
    fn generated_tokens_have_expected_shape() {
        let password = generate_password();
        let key = generate_recover_key();
        let token = generate_feed_token();

        assert_eq!(GENERATED_PASSWORD_LEN, password.len());
        assert_eq!(RECOVER_KEY_LEN, key.len());
        assert_eq!(FEED_TOKEN_LEN, token.len());
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));

        // Two draws from a CSPRNG must not collide.
        assert_ne!(generate_feed_token(), token);
    }

    #[test]
    fn token_comparison_requires_exact_match() {
        assert!(token_matches("abc123", "abc123"));
        assert!(!token_matches("abc123", "abc124"));
        assert!(!token_matches("abc123", "abc1234"));
        assert!(!token_matches("", "abc123"));
    }
}
