//! Per-request authentication chain.
//!
//! Runs once per inbound RPC on a service that requires authentication:
//! metadata → single `authorization` value → `<scheme> <token>` → bearer
//! scheme → token verification → account lookup → status check → admit.
//! Every failure is terminal for the call.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, warn};

use bridge_core::{AuthError, AuthResult};

use crate::context::AuthContext;
use crate::metadata::RequestMetadata;
use crate::policy::ServicePolicy;
use crate::store::{AccountStore, StoreError};
use crate::token::{TokenCodec, TokenError};

pub const AUTHORIZATION_HEADER: &str = "authorization";

const BEARER_SCHEME: &str = "bearer";

#[derive(Clone)]
pub struct AuthProcessor {
    codec: Arc<TokenCodec>,
    store: Arc<dyn AccountStore>,
}

impl AuthProcessor {
    pub fn new(codec: Arc<TokenCodec>, store: Arc<dyn AccountStore>) -> Self {
        Self { codec, store }
    }

    /// Apply a service's policy to one inbound request.
    ///
    /// Public services pass through with no identity attached.
    pub async fn admit(
        &self,
        policy: ServicePolicy,
        metadata: Option<&RequestMetadata>,
    ) -> AuthResult<Option<AuthContext>> {
        match policy {
            ServicePolicy::Public => Ok(None),
            ServicePolicy::RequiresAuth => self.authenticate(metadata).await.map(Some),
        }
    }

    pub async fn authenticate(&self, metadata: Option<&RequestMetadata>) -> AuthResult<AuthContext> {
        self.authenticate_at(metadata, Utc::now()).await
    }

    pub async fn authenticate_at(
        &self,
        metadata: Option<&RequestMetadata>,
        now: DateTime<Utc>,
    ) -> AuthResult<AuthContext> {
        let token = extract_bearer(metadata)?;

        let claims = self.codec.verify_at(token, now).map_err(|e| {
            warn!(error = %e, "failed to verify token");
            match e {
                TokenError::InvalidToken => AuthError::InvalidToken,
                TokenError::ExpiredToken => AuthError::ExpiredToken,
                TokenError::Encode(_) => AuthError::Internal,
            }
        })?;

        let account = self.store.find_by_id(claims.sub).await.map_err(|e| match e {
            StoreError::NoRows => {
                warn!(account_id = %claims.sub, "token subject no longer exists");
                AuthError::Unauthenticated
            }
            other => {
                error!(account_id = %claims.sub, error = %other, "failed to load account");
                AuthError::Internal
            }
        })?;

        if account.status.is_inactive() {
            warn!(account_id = %account.id, "inactive account status");
            return Err(AuthError::InactiveAccount);
        }

        Ok(AuthContext::new(account, claims.exp))
    }
}

/// Pull the bearer credential out of request metadata.
pub fn extract_bearer(metadata: Option<&RequestMetadata>) -> AuthResult<&str> {
    let Some(metadata) = metadata else {
        warn!("missing metadata");
        return Err(AuthError::MissingContextMetadata);
    };

    let mut values = metadata.get_all(AUTHORIZATION_HEADER);
    let header = match (values.next(), values.next()) {
        (Some(value), None) => value,
        _ => {
            warn!("missing auth header");
            return Err(AuthError::MissingAuthHeader);
        }
    };

    let Some((scheme, credential)) = header.split_once(' ') else {
        warn!("malformed token");
        return Err(AuthError::MalformedToken);
    };

    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        warn!(authorization_scheme = scheme, "invalid authorization scheme");
        return Err(AuthError::InvalidAuthorizationScheme);
    }

    Ok(credential)
}
