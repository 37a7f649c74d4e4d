//! Secret hashing and comparison.
//!
//! Argon2id with the crate's default parameters. Hashing is CPU-bound and
//! deliberately slow; async callers go through the `*_blocking` variants so
//! the work lands on tokio's blocking pool instead of a reactor thread.

use std::sync::OnceLock;

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};
use thiserror::Error;

const SALT_LEN: usize = 16;
const DUMMY_SECRET: &str = "bridge-dummy-secret";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HashError {
    #[error("failed to generate salt: {0}")]
    Salt(String),

    #[error("failed to hash secret: {0}")]
    Hash(String),

    #[error("hashing task failed: {0}")]
    Join(String),
}

/// Hash a plaintext secret into a PHC string.
pub fn hash_secret(plaintext: &str) -> Result<String, HashError> {
    let mut salt_bytes = [0u8; SALT_LEN];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| HashError::Salt(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| HashError::Salt(e.to_string()))?;

    let phc = Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|e| HashError::Hash(e.to_string()))?
        .to_string();
    Ok(phc)
}

/// Compare a plaintext secret against a stored hash.
///
/// A mismatch and a malformed hash are both just `false`.
pub fn compare_secret(hash: &str, plaintext: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

pub async fn hash_secret_blocking(plaintext: String) -> Result<String, HashError> {
    tokio::task::spawn_blocking(move || hash_secret(&plaintext))
        .await
        .map_err(|e| HashError::Join(e.to_string()))?
}

pub async fn compare_secret_blocking(hash: String, plaintext: String) -> Result<bool, HashError> {
    tokio::task::spawn_blocking(move || compare_secret(&hash, &plaintext))
        .await
        .map_err(|e| HashError::Join(e.to_string()))
}

/// Hash used when there is no stored hash to compare against.
///
/// Computed once with the same parameters as real hashes. Empty if hashing
/// failed, in which case comparisons against it are just `false`.
fn dummy_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY.get_or_init(|| hash_secret(DUMMY_SECRET).unwrap_or_default())
}

/// Run one full comparison that can never succeed.
///
/// Lets a lookup miss cost as much as a wrong password.
pub async fn compare_dummy_blocking(plaintext: String) -> Result<bool, HashError> {
    tokio::task::spawn_blocking(move || {
        let hash = dummy_hash();
        compare_secret(hash, &plaintext) && plaintext != DUMMY_SECRET
    })
    .await
    .map_err(|e| HashError::Join(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn hash_is_phc_and_salted() {
        let a = hash_secret("secret").unwrap();
        let b = hash_secret("secret").unwrap();
        assert!(a.starts_with("$argon2id$"));
        assert_ne!(a, b);
    }

    #[test]
    fn compare_matches_only_the_original() {
        let hash = hash_secret("secret").unwrap();
        assert!(compare_secret(&hash, "secret"));
        assert!(!compare_secret(&hash, "wrong"));
        assert!(!compare_secret(&hash, ""));
    }

    #[test]
    fn malformed_hash_is_false() {
        assert!(!compare_secret("", "secret"));
        assert!(!compare_secret("not-a-hash", "secret"));
        assert!(!compare_secret("$2a$10$bcryptlookingvalue", "secret"));
    }

    #[tokio::test]
    async fn blocking_variants_agree() {
        let hash = hash_secret_blocking("secret".to_string()).await.unwrap();
        assert!(compare_secret_blocking(hash.clone(), "secret".to_string()).await.unwrap());
        assert!(!compare_secret_blocking(hash, "other".to_string()).await.unwrap());
    }

    #[test]
    fn dummy_hash_is_a_real_argon2id_hash() {
        assert!(dummy_hash().starts_with("$argon2id$"));
        assert!(PasswordHash::new(dummy_hash()).is_ok());
    }

    #[tokio::test]
    async fn dummy_comparison_never_matches() {
        for plaintext in ["secret", "", DUMMY_SECRET] {
            assert!(!compare_dummy_blocking(plaintext.to_string()).await.unwrap());
        }
    }

    proptest! {
        // Argon2 is slow by design; keep the case count small.
        #![proptest_config(ProptestConfig {
            cases: 8,
            ..ProptestConfig::default()
        })]

        #[test]
        fn hash_then_compare(p in ".{0,32}", q in ".{0,32}") {
            let hash = hash_secret(&p).unwrap();
            prop_assert!(compare_secret(&hash, &p));
            if p != q {
                prop_assert!(!compare_secret(&hash, &q));
            }
        }
    }
}
