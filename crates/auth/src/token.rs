//! Access token codec.
//!
//! Tokens are `v2.local.` followed by unpadded base64url of
//! `nonce || ciphertext || tag`. The claims are JSON sealed with
//! XChaCha20-Poly1305; header, nonce and the (empty) footer are bound as
//! associated data using pre-authentication encoding. There is no server-side
//! session: a token is valid iff it decrypts under the process key and has not
//! expired.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use bridge_core::Account;

use crate::claims::{Claims, validate_claims};

/// Key size of the token cipher, in bytes.
pub const KEY_SIZE: usize = 32;

const HEADER: &str = "v2.local.";
const NONCE_SIZE: usize = 24;
const TAG_SIZE: usize = 16;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid key size: must be exactly {expected} bytes, got {actual}")]
    InvalidSize { expected: usize, actual: usize },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Decryption or authentication failed, or the payload is malformed.
    #[error("invalid token")]
    InvalidToken,

    #[error("token has expired")]
    ExpiredToken,

    #[error("failed to encode token: {0}")]
    Encode(String),
}

/// Process-wide symmetric key.
#[derive(Clone, PartialEq, Eq)]
pub struct SymmetricKey([u8; KEY_SIZE]);

impl SymmetricKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let key: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| KeyError::InvalidSize {
            expected: KEY_SIZE,
            actual: bytes.len(),
        })?;
        Ok(Self(key))
    }

    fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl TryFrom<&str> for SymmetricKey {
    type Error = KeyError;

    /// The configured key string is used as raw bytes, so it must be exactly
    /// [`KEY_SIZE`] bytes long.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::from_bytes(value.as_bytes())
    }
}

impl core::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SymmetricKey(<redacted>)")
    }
}

/// Issues and verifies access tokens.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    key: SymmetricKey,
    app_name: String,
}

impl TokenCodec {
    pub fn new(key: SymmetricKey, app_name: impl Into<String>) -> Self {
        Self {
            key,
            app_name: app_name.into(),
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn generate(&self, account: &Account, ttl: Duration) -> Result<String, TokenError> {
        self.generate_at(account, ttl, Utc::now())
    }

    pub fn generate_at(
        &self,
        account: &Account,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims::new(&self.app_name, account, now, ttl)?;
        let payload = serde_json::to_vec(&claims).map_err(|e| TokenError::Encode(e.to_string()))?;

        let mut nonce = [0u8; NONCE_SIZE];
        getrandom::getrandom(&mut nonce).map_err(|e| TokenError::Encode(e.to_string()))?;

        let aad = pae(&[HEADER.as_bytes(), &nonce, b""]);
        let ciphertext = self
            .cipher()
            .encrypt(
                XNonce::from_slice(&nonce),
                Payload {
                    msg: &payload,
                    aad: &aad,
                },
            )
            .map_err(|_| TokenError::Encode("encryption failed".to_string()))?;

        let mut body = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        body.extend_from_slice(&nonce);
        body.extend_from_slice(&ciphertext);

        Ok(format!("{HEADER}{}", URL_SAFE_NO_PAD.encode(body)))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let encoded = token.strip_prefix(HEADER).ok_or(TokenError::InvalidToken)?;
        // Footers are never issued.
        if encoded.contains('.') {
            return Err(TokenError::InvalidToken);
        }

        let body = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|_| TokenError::InvalidToken)?;
        if body.len() < NONCE_SIZE + TAG_SIZE {
            return Err(TokenError::InvalidToken);
        }

        let (nonce, ciphertext) = body.split_at(NONCE_SIZE);
        let aad = pae(&[HEADER.as_bytes(), nonce, b""]);
        let payload = self
            .cipher()
            .decrypt(
                XNonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad: &aad,
                },
            )
            .map_err(|_| TokenError::InvalidToken)?;

        let claims: Claims =
            serde_json::from_slice(&payload).map_err(|_| TokenError::InvalidToken)?;
        validate_claims(&claims, now)?;
        Ok(claims)
    }

    fn cipher(&self) -> XChaCha20Poly1305 {
        XChaCha20Poly1305::new(Key::from_slice(self.key.as_bytes()))
    }
}

/// Pre-authentication encoding: little-endian 64-bit piece count, then each
/// piece prefixed by its little-endian 64-bit length (top bit clear).
fn pae(pieces: &[&[u8]]) -> Vec<u8> {
    fn le64(n: usize) -> [u8; 8] {
        ((n as u64) & (u64::MAX >> 1)).to_le_bytes()
    }

    let mut out = Vec::with_capacity(8 + pieces.iter().map(|p| 8 + p.len()).sum::<usize>());
    out.extend_from_slice(&le64(pieces.len()));
    for piece in pieces {
        out.extend_from_slice(&le64(piece.len()));
        out.extend_from_slice(piece);
    }
    out
}

/// Format a token as an `authorization` header value.
pub fn bearer(token: &str) -> String {
    format!("bearer {token}")
}
