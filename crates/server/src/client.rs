//! Client side of the auth handshake.
//!
//! [`AuthClient`] logs in with fixed credentials; the [`BearerInterceptor`]
//! it hands back attaches the issued token to every call made through a
//! client built with it.

use tonic::metadata::AsciiMetadataValue;
use tonic::service::Interceptor;
use tonic::transport::Channel;
use tonic::{Request, Status};
use tracing::{debug, instrument};

use bridge_auth::{AUTHORIZATION_HEADER, bearer};

use crate::pb;
use crate::pb::auth_service_client::AuthServiceClient;

/// Inserts `authorization: bearer <token>` into outgoing request metadata.
#[derive(Clone)]
pub struct BearerInterceptor {
    value: AsciiMetadataValue,
}

impl BearerInterceptor {
    pub fn new(token: &str) -> Result<Self, Status> {
        let value = bearer(token)
            .parse::<AsciiMetadataValue>()
            .map_err(|_| Status::internal("access token is not valid header text"))?;
        Ok(Self { value })
    }
}

impl core::fmt::Debug for BearerInterceptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("BearerInterceptor(<redacted>)")
    }
}

impl Interceptor for BearerInterceptor {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        request
            .metadata_mut()
            .insert(AUTHORIZATION_HEADER, self.value.clone());
        Ok(request)
    }
}

/// Logs in to `bridge.v1.AuthService` as one configured account.
#[derive(Clone)]
pub struct AuthClient {
    svc: AuthServiceClient<Channel>,
    email: String,
    password: String,
}

impl AuthClient {
    pub fn new(channel: Channel, email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            svc: AuthServiceClient::new(channel),
            email: email.into(),
            password: password.into(),
        }
    }

    #[instrument(skip(self), fields(email = %self.email))]
    pub async fn login(&mut self) -> Result<pb::LoginResponse, Status> {
        let request = pb::LoginRequest {
            email: self.email.clone(),
            password: self.password.clone(),
        };
        let response = self.svc.login(request).await?.into_inner();
        debug!("logged in");
        Ok(response)
    }

    /// Log in and return an interceptor carrying the fresh token.
    pub async fn interceptor(&mut self) -> Result<BearerInterceptor, Status> {
        let response = self.login().await?;
        BearerInterceptor::new(&response.access_token)
    }
}

impl core::fmt::Debug for AuthClient {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthClient")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}
