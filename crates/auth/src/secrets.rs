//! Secret/config provider boundary.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SecretError {
    #[error("secret '{0}' not found")]
    NotFound(String),

    #[error("secret provider error: {0}")]
    Backend(String),
}

/// Source of secret values (vault-like KV, environment, ...).
///
/// Read at startup only; `get` may block on I/O.
#[async_trait]
pub trait SecretProvider: Send + Sync {
    async fn get(&self, key: &str) -> Result<String, SecretError>;
}
