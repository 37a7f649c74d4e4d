//! Startup configuration for the auth core.

use chrono::Duration;
use thiserror::Error;

use crate::secrets::{SecretError, SecretProvider};
use crate::token::{KeyError, SymmetricKey, TokenCodec};

/// Secret key holding the token encryption key.
pub const TOKEN_KEY_SECRET: &str = "JWT_SYMMETRIC_KEY";

pub const DEFAULT_APP_NAME: &str = "bridge";

/// Lifetime of tokens issued by login and registration.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read secret: {0}")]
    Secret(#[from] SecretError),

    #[error("invalid token key: {0}")]
    Key(#[from] KeyError),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

/// Process-wide auth settings, built once at startup and handed to the
/// components that need them.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub app_name: String,
    pub token_key: SymmetricKey,
    pub token_ttl: Duration,
}

impl AuthConfig {
    pub fn new(app_name: impl Into<String>, token_key: SymmetricKey) -> Self {
        Self {
            app_name: app_name.into(),
            token_key,
            token_ttl: Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES),
        }
    }

    /// Fetch the token key from the provider.
    ///
    /// A key of the wrong size is a fatal configuration error.
    pub async fn load(
        app_name: impl Into<String>,
        provider: &dyn SecretProvider,
    ) -> Result<Self, ConfigError> {
        let raw = provider.get(TOKEN_KEY_SECRET).await?;
        let key = SymmetricKey::try_from(raw.as_str())?;
        Ok(Self::new(app_name, key))
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    pub fn token_codec(&self) -> TokenCodec {
        TokenCodec::new(self.token_key.clone(), self.app_name.clone())
    }
}
