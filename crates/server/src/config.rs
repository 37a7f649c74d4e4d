use std::net::SocketAddr;

use chrono::{Duration, Utc};

use bridge_auth::config::{DEFAULT_APP_NAME, DEFAULT_TOKEN_TTL_MINUTES};
use bridge_auth::{AuthConfig, ConfigError, SecretProvider};

pub const DEFAULT_GRPC_ADDR: &str = "0.0.0.0:8000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub app_name: String,
    pub grpc_addr: SocketAddr,
    /// Without one, accounts live in memory for the life of the process.
    pub database_url: Option<String>,
    pub token_ttl: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let app_name = non_empty("APP_NAME").unwrap_or_else(|| DEFAULT_APP_NAME.to_string());

        let grpc_addr = non_empty("GRPC_ADDR").unwrap_or_else(|| DEFAULT_GRPC_ADDR.to_string());
        let grpc_addr = grpc_addr.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
            key: "GRPC_ADDR".to_string(),
            reason: format!("{e}"),
        })?;

        let token_ttl = match non_empty("TOKEN_TTL_MINUTES") {
            Some(raw) => parse_ttl(&raw)?,
            None => Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES),
        };

        Ok(Self {
            app_name,
            grpc_addr,
            database_url: non_empty("DATABASE_URL"),
            token_ttl,
        })
    }

    /// Fetch the token key and build the auth settings.
    pub async fn auth_config(&self, provider: &dyn SecretProvider) -> Result<AuthConfig, ConfigError> {
        Ok(AuthConfig::load(self.app_name.clone(), provider)
            .await?
            .with_token_ttl(self.token_ttl))
    }
}

/// A positive number of minutes whose expiry, counted from now, is still a
/// representable timestamp.
fn parse_ttl(raw: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        key: "TOKEN_TTL_MINUTES".to_string(),
        reason,
    };

    let minutes = match raw.trim().parse::<i64>() {
        Ok(minutes) if minutes > 0 => minutes,
        _ => {
            return Err(invalid(format!(
                "expected a positive number of minutes, got '{raw}'"
            )));
        }
    };

    Duration::try_minutes(minutes)
        .filter(|ttl| Utc::now().checked_add_signed(*ttl).is_some())
        .ok_or_else(|| invalid(format!("{minutes} minutes is too long a token lifetime")))
}
