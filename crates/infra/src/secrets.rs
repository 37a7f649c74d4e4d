//! Secret provider implementations.

use std::collections::HashMap;
use std::env::{self, VarError};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use bridge_auth::{SecretError, SecretProvider};

/// Reads secrets from process environment variables.
#[derive(Debug, Clone, Default)]
pub struct EnvSecretProvider;

#[async_trait]
impl SecretProvider for EnvSecretProvider {
    async fn get(&self, key: &str) -> Result<String, SecretError> {
        match env::var(key) {
            Ok(value) => Ok(value),
            Err(VarError::NotPresent) => Err(SecretError::NotFound(key.to_string())),
            Err(VarError::NotUnicode(_)) => Err(SecretError::Backend(format!(
                "secret '{key}' is not valid unicode"
            ))),
        }
    }
}

/// Fixed key/value secrets. Useful for tests and local runs.
#[derive(Debug, Clone, Default)]
pub struct StaticSecretProvider {
    values: HashMap<String, String>,
}

impl StaticSecretProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

#[async_trait]
impl SecretProvider for StaticSecretProvider {
    async fn get(&self, key: &str) -> Result<String, SecretError> {
        self.values
            .get(key)
            .cloned()
            .ok_or_else(|| SecretError::NotFound(key.to_string()))
    }
}

/// Read-through cache in front of another provider.
///
/// Only successful lookups are cached, so a missing secret is retried on the
/// next call.
#[derive(Debug, Default)]
pub struct CachedSecretProvider<P> {
    inner: P,
    cache: RwLock<HashMap<String, String>>,
}

impl<P> CachedSecretProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl<P: SecretProvider> SecretProvider for CachedSecretProvider<P> {
    async fn get(&self, key: &str) -> Result<String, SecretError> {
        if let Some(value) = self.cache.read().get(key) {
            return Ok(value.clone());
        }

        let value = self.inner.get(key).await?;
        debug!(key, "secret cached");
        self.cache.write().insert(key.to_string(), value.clone());
        Ok(value)
    }
}
