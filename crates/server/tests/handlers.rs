use std::sync::Arc;

use chrono::Utc;
use tonic::{Code, Request};

use bridge_auth::{AccountStore, AuthConfig, AuthContext, SymmetricKey};
use bridge_infra::InMemoryAccountStore;
use bridge_server::app::{App, build_app};
use bridge_server::pb;
use bridge_server::pb::account_service_server::AccountService;
use bridge_server::pb::auth_service_server::AuthService;

const KEY: &str = "0123456789abcdef0123456789abcdef";

fn app() -> (App, Arc<InMemoryAccountStore>, AuthConfig) {
    let config = AuthConfig::new("bridge", SymmetricKey::try_from(KEY).unwrap());
    let store = Arc::new(InMemoryAccountStore::new());
    (build_app(&config, store.clone()), store, config)
}

fn register_request(email: &str, phone: &str) -> pb::RegisterRequest {
    pb::RegisterRequest {
        name: "Ada Lovelace".to_string(),
        email: email.to_string(),
        phone_number: phone.to_string(),
        password: "correct horse".to_string(),
        confirm_password: "correct horse".to_string(),
    }
}

fn login_request(email: &str, password: &str) -> pb::LoginRequest {
    pb::LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}

async fn context_for(store: &InMemoryAccountStore, email: &str) -> AuthContext {
    let account = store.find_by_email(email).await.unwrap();
    AuthContext::new(account, Utc::now())
}

fn with_context<T>(message: T, ctx: AuthContext) -> Request<T> {
    let mut request = Request::new(message);
    request.extensions_mut().insert(ctx);
    request
}

#[tokio::test]
async fn register_then_login() {
    let (app, _, config) = app();

    let registered = app
        .auth
        .register(Request::new(register_request("ada@example.com", "+2348000000001")))
        .await
        .unwrap()
        .into_inner();
    let user = registered.user.unwrap();
    assert_eq!(user.email, "ada@example.com");
    assert_eq!(user.status(), pb::AccountStatus::PendingActive);
    assert!(!registered.access_token.is_empty());

    let logged_in = app
        .auth
        .login(Request::new(login_request("ada@example.com", "correct horse")))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(logged_in.user.unwrap().id, user.id);

    let claims = config
        .token_codec()
        .verify(&logged_in.access_token)
        .unwrap();
    assert_eq!(claims.sub.to_string(), user.id);
    assert_eq!(claims.iss, "bridge");
}

#[tokio::test]
async fn short_password_registers_and_logs_in() {
    let (app, _, _) = app();
    let mut req = register_request("a@x.com", "+2348000000001");
    req.password = "secret".to_string();
    req.confirm_password = "secret".to_string();

    app.auth.register(Request::new(req)).await.unwrap();
    let session = app
        .auth
        .login(Request::new(login_request("a@x.com", "secret")))
        .await
        .unwrap()
        .into_inner();
    assert!(!session.access_token.is_empty());
}

#[tokio::test]
async fn wrong_password_and_unknown_email_look_the_same() {
    let (app, _, _) = app();
    app.auth
        .register(Request::new(register_request("ada@example.com", "+2348000000001")))
        .await
        .unwrap();

    let wrong = app
        .auth
        .login(Request::new(login_request("ada@example.com", "wrong password")))
        .await
        .unwrap_err();
    let unknown = app
        .auth
        .login(Request::new(login_request("nobody@example.com", "correct horse")))
        .await
        .unwrap_err();

    assert_eq!(wrong.code(), Code::Unauthenticated);
    assert_eq!(wrong.code(), unknown.code());
    assert_eq!(wrong.message(), unknown.message());
}

#[tokio::test]
async fn validation_failures_are_invalid_argument_and_store_untouched() {
    let (app, store, _) = app();
    let mut req = register_request("ada@example.com", "+2348000000001");
    req.name = "Al".to_string();

    let status = app.auth.register(Request::new(req)).await.unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
    assert_eq!(status.message(), "name must be at least 3 characters");
    assert!(store.is_empty());
}

#[tokio::test]
async fn confirmation_mismatch_is_invalid_argument() {
    let (app, store, _) = app();
    let mut req = register_request("ada@example.com", "+2348000000001");
    req.confirm_password = "something different".to_string();

    let status = app.auth.register(Request::new(req)).await.unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
    assert_eq!(status.message(), "The password confirmation does not match.");
    assert!(store.is_empty());
}

#[tokio::test]
async fn duplicate_registration_is_already_exists() {
    let (app, _, _) = app();
    app.auth
        .register(Request::new(register_request("ada@example.com", "+2348000000001")))
        .await
        .unwrap();

    let email = app
        .auth
        .register(Request::new(register_request("ada@example.com", "+2348000000002")))
        .await
        .unwrap_err();
    assert_eq!(email.code(), Code::AlreadyExists);
    assert_eq!(email.message(), "Email is already in use.");

    let phone = app
        .auth
        .register(Request::new(register_request("bob@example.com", "+2348000000001")))
        .await
        .unwrap_err();
    assert_eq!(phone.code(), Code::AlreadyExists);
    assert_eq!(phone.message(), "Phone number is already in use.");
}

#[tokio::test]
async fn get_profile_without_context_is_unauthenticated() {
    let (app, _, _) = app();
    let status = app
        .accounts
        .get_profile(Request::new(pb::GetProfileRequest {}))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unauthenticated);
}

#[tokio::test]
async fn get_profile_returns_the_context_account() {
    let (app, store, _) = app();
    app.auth
        .register(Request::new(register_request("ada@example.com", "+2348000000001")))
        .await
        .unwrap();
    let ctx = context_for(&store, "ada@example.com").await;

    let user = app
        .accounts
        .get_profile(with_context(pb::GetProfileRequest {}, ctx.clone()))
        .await
        .unwrap()
        .into_inner()
        .user
        .unwrap();
    assert_eq!(user.id, ctx.account_id().to_string());
    assert_eq!(user.phone_number, "+2348000000001");
}

#[tokio::test]
async fn update_profile_persists_changes() {
    let (app, store, _) = app();
    app.auth
        .register(Request::new(register_request("ada@example.com", "+2348000000001")))
        .await
        .unwrap();
    let ctx = context_for(&store, "ada@example.com").await;

    let request = pb::UpdateProfileRequest {
        name: Some("Augusta Ada King".to_string()),
        phone_number: None,
        meta: Some(pb::UserMeta {
            kyc: Some(pb::Kyc {
                document_type: "passport".to_string(),
                document_number: "A1234567".to_string(),
                date_of_birth: "1815-12-10".to_string(),
                ..Default::default()
            }),
        }),
    };
    let user = app
        .accounts
        .update_profile(with_context(request, ctx.clone()))
        .await
        .unwrap()
        .into_inner()
        .user
        .unwrap();
    assert_eq!(user.name, "Augusta Ada King");
    assert_eq!(user.phone_number, "+2348000000001");

    let stored = store.find_by_id(ctx.account_id()).await.unwrap();
    assert_eq!(stored.name, "Augusta Ada King");
    let kyc = stored.meta.kyc.unwrap();
    assert_eq!(kyc.document_number, "A1234567");
    assert_eq!(kyc.date_of_birth.unwrap().to_string(), "1815-12-10");
}

#[tokio::test]
async fn update_profile_to_taken_phone_is_already_exists() {
    let (app, store, _) = app();
    for (email, phone) in [
        ("ada@example.com", "+2348000000001"),
        ("bob@example.com", "+2348000000002"),
    ] {
        app.auth
            .register(Request::new(register_request(email, phone)))
            .await
            .unwrap();
    }
    let ctx = context_for(&store, "ada@example.com").await;

    let status = app
        .accounts
        .update_profile(with_context(
            pb::UpdateProfileRequest {
                phone_number: Some("+2348000000002".to_string()),
                ..Default::default()
            },
            ctx,
        ))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::AlreadyExists);
    assert_eq!(status.message(), "Phone number is already in use.");
}

#[tokio::test]
async fn malformed_kyc_date_is_invalid_argument() {
    let (app, store, _) = app();
    app.auth
        .register(Request::new(register_request("ada@example.com", "+2348000000001")))
        .await
        .unwrap();
    let ctx = context_for(&store, "ada@example.com").await;

    let status = app
        .accounts
        .update_profile(with_context(
            pb::UpdateProfileRequest {
                meta: Some(pb::UserMeta {
                    kyc: Some(pb::Kyc {
                        date_of_birth: "10/12/1815".to_string(),
                        ..Default::default()
                    }),
                }),
                ..Default::default()
            },
            ctx,
        ))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
}
