//! RPC handlers: validate, call into the auth core, map the result.

use tonic::{Request, Response, Status};

use bridge_auth::{AuthService, ProfileService, ProfileUpdate, Registration, Session};

use crate::errors::status_from;
use crate::mapping::{meta_from_pb, user_from_account};
use crate::middleware::auth_context;
use crate::pb;
use crate::pb::account_service_server::AccountService as AccountRpc;
use crate::pb::auth_service_server::AuthService as AuthRpc;
use crate::validate::Validate;

#[derive(Clone)]
pub struct AuthHandler {
    service: AuthService,
}

impl AuthHandler {
    pub fn new(service: AuthService) -> Self {
        Self { service }
    }
}

fn session_parts(session: Session) -> (Option<pb::User>, String) {
    (Some(user_from_account(&session.account)), session.token)
}

#[tonic::async_trait]
impl AuthRpc for AuthHandler {
    async fn login(
        &self,
        request: Request<pb::LoginRequest>,
    ) -> Result<Response<pb::LoginResponse>, Status> {
        let req = request.into_inner();
        req.validate().map_err(|e| status_from(&e))?;

        let session = self
            .service
            .login(&req.email, &req.password)
            .await
            .map_err(|e| status_from(&e))?;

        let (user, access_token) = session_parts(session);
        Ok(Response::new(pb::LoginResponse { user, access_token }))
    }

    async fn register(
        &self,
        request: Request<pb::RegisterRequest>,
    ) -> Result<Response<pb::RegisterResponse>, Status> {
        let req = request.into_inner();
        req.validate().map_err(|e| status_from(&e))?;

        let session = self
            .service
            .register(Registration {
                name: req.name,
                email: req.email,
                phone_number: req.phone_number,
                password: req.password,
                confirm_password: req.confirm_password,
            })
            .await
            .map_err(|e| status_from(&e))?;

        let (user, access_token) = session_parts(session);
        Ok(Response::new(pb::RegisterResponse { user, access_token }))
    }
}

#[derive(Clone)]
pub struct AccountHandler {
    profiles: ProfileService,
}

impl AccountHandler {
    pub fn new(profiles: ProfileService) -> Self {
        Self { profiles }
    }
}

#[tonic::async_trait]
impl AccountRpc for AccountHandler {
    async fn get_profile(
        &self,
        request: Request<pb::GetProfileRequest>,
    ) -> Result<Response<pb::GetProfileResponse>, Status> {
        let ctx = auth_context(&request)?;
        let account = self.profiles.get_profile(ctx);
        Ok(Response::new(pb::GetProfileResponse {
            user: Some(user_from_account(&account)),
        }))
    }

    async fn update_profile(
        &self,
        request: Request<pb::UpdateProfileRequest>,
    ) -> Result<Response<pb::UpdateProfileResponse>, Status> {
        let ctx = auth_context(&request)?.clone();
        let req = request.into_inner();
        req.validate().map_err(|e| status_from(&e))?;

        let meta = req
            .meta
            .map(meta_from_pb)
            .transpose()
            .map_err(|e| status_from(&e))?;

        let account = self
            .profiles
            .update_profile(
                &ctx,
                ProfileUpdate {
                    name: req.name,
                    phone_number: req.phone_number,
                    meta,
                },
            )
            .await
            .map_err(|e| status_from(&e))?;

        Ok(Response::new(pb::UpdateProfileResponse {
            user: Some(user_from_account(&account)),
        }))
    }
}
