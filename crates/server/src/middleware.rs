//! Tower layer running the auth chain in front of every RPC.
//!
//! The service name is taken from the request path and looked up in the
//! [`PolicyTable`]. Admitted requests carry an [`AuthContext`] in their
//! extensions; rejected ones are answered with a gRPC status and never reach
//! the inner service.

use std::sync::Arc;
use std::task::{Context, Poll};

use http::{HeaderMap, HeaderName, HeaderValue, Request, Response};
use tonic::Status;
use tonic::codegen::BoxFuture;
use tower::{Layer, Service};
use tracing::debug;

use bridge_auth::{AuthContext, AuthProcessor, PolicyTable, RequestMetadata};

use crate::errors::status_from;

#[derive(Clone)]
pub struct AuthLayer {
    processor: Arc<AuthProcessor>,
    policies: Arc<PolicyTable>,
}

impl AuthLayer {
    pub fn new(processor: Arc<AuthProcessor>, policies: Arc<PolicyTable>) -> Self {
        Self {
            processor,
            policies,
        }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            processor: self.processor.clone(),
            policies: self.policies.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    processor: Arc<AuthProcessor>,
    policies: Arc<PolicyTable>,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for AuthMiddleware<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
    ResBody: Default + Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        // The readied service goes into the future; a fresh clone stays behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let processor = self.processor.clone();
        let policies = self.policies.clone();

        Box::pin(async move {
            let path = req.uri().path().to_string();
            let policy = policies.policy_for_path(&path);
            let metadata = metadata_from_headers(req.headers());

            match processor.admit(policy, Some(&metadata)).await {
                Ok(Some(ctx)) => {
                    debug!(
                        rpc = %path,
                        account_id = %ctx.account_id(),
                        token_expires_at = %ctx.token_expires_at(),
                        "request authenticated"
                    );
                    req.extensions_mut().insert(ctx);
                    inner.call(req).await
                }
                Ok(None) => inner.call(req).await,
                Err(err) => {
                    debug!(rpc = %path, error = %err, "request rejected");
                    Ok(status_response(&status_from(&err)))
                }
            }
        })
    }
}

/// Copy ASCII header values into transport-neutral request metadata.
///
/// Binary (`-bin`) entries and values that are not visible ASCII are skipped.
pub fn metadata_from_headers(headers: &HeaderMap) -> RequestMetadata {
    headers
        .iter()
        .filter(|(name, _)| !name.as_str().ends_with("-bin"))
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}

/// A trailers-only gRPC response carrying `status`.
pub fn status_response<B: Default>(status: &Status) -> Response<B> {
    let mut response = Response::new(B::default());
    let headers = response.headers_mut();
    if status.add_header(headers).is_err() {
        headers.insert(
            HeaderName::from_static("grpc-status"),
            HeaderValue::from(status.code() as i32),
        );
    }
    headers.insert(
        http::header::CONTENT_TYPE,
        HeaderValue::from_static("application/grpc"),
    );
    response
}

/// Pull the identity the auth layer attached to a request.
pub fn auth_context<T>(request: &tonic::Request<T>) -> Result<&AuthContext, Status> {
    request
        .extensions()
        .get::<AuthContext>()
        .ok_or_else(|| status_from(&bridge_core::AuthError::Unauthenticated))
}
