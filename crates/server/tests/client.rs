use std::sync::Arc;

use chrono::Utc;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::Code;
use tonic::transport::Channel;

use bridge_auth::{AccountStore, AuthConfig, SymmetricKey, hash_secret};
use bridge_core::{AccountMeta, AccountStatus, NewAccount};
use bridge_infra::InMemoryAccountStore;
use bridge_server::app::{build_app, router};
use bridge_server::client::{AuthClient, BearerInterceptor};
use bridge_server::pb;
use bridge_server::pb::account_service_client::AccountServiceClient;

const KEY: &str = "0123456789abcdef0123456789abcdef";

/// Serve the full stack on a loopback port and return a connected channel.
async fn start_server(store: Arc<InMemoryAccountStore>) -> Channel {
    let config = AuthConfig::new("bridge", SymmetricKey::try_from(KEY).unwrap());
    let app = build_app(&config, store);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{}", listener.local_addr().unwrap());
    let incoming = TcpListenerStream::new(listener);

    tokio::spawn(async move {
        router(app).serve_with_incoming(incoming).await.unwrap();
    });

    Channel::from_shared(endpoint)
        .unwrap()
        .connect()
        .await
        .unwrap()
}

async fn seed_active(store: &InMemoryAccountStore, email: &str, password: &str) -> String {
    let now = Utc::now();
    let account = store
        .create(NewAccount {
            name: "Ada Lovelace".to_string(),
            email: email.to_string(),
            phone_number: "+2348000000001".to_string(),
            password_hash: hash_secret(password).unwrap(),
            status: AccountStatus::Active,
            meta: AccountMeta::default(),
            created_at: now,
            updated_at: now,
        })
        .await
        .unwrap();
    account.id.to_string()
}

#[tokio::test]
async fn logged_in_client_reaches_protected_service() {
    let store = Arc::new(InMemoryAccountStore::new());
    let id = seed_active(&store, "ada@example.com", "secret").await;
    let channel = start_server(store).await;

    let interceptor = AuthClient::new(channel.clone(), "ada@example.com", "secret")
        .interceptor()
        .await
        .unwrap();
    let mut accounts = AccountServiceClient::with_interceptor(channel, interceptor);

    let user = accounts
        .get_profile(pb::GetProfileRequest {})
        .await
        .unwrap()
        .into_inner()
        .user
        .unwrap();
    assert_eq!(user.id, id);
    assert_eq!(user.status(), pb::AccountStatus::Active);
}

#[tokio::test]
async fn client_without_token_is_rejected_by_the_layer() {
    let store = Arc::new(InMemoryAccountStore::new());
    seed_active(&store, "ada@example.com", "secret").await;
    let channel = start_server(store).await;

    let status = AccountServiceClient::new(channel)
        .get_profile(pb::GetProfileRequest {})
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unauthenticated);
    assert_eq!(status.message(), "Missing authorization header.");
}

#[tokio::test]
async fn foreign_token_is_rejected_by_the_layer() {
    let store = Arc::new(InMemoryAccountStore::new());
    seed_active(&store, "ada@example.com", "secret").await;
    let channel = start_server(store).await;

    let interceptor = BearerInterceptor::new("v2.local.not-a-real-token").unwrap();
    let status = AccountServiceClient::with_interceptor(channel, interceptor)
        .get_profile(pb::GetProfileRequest {})
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unauthenticated);
    assert_eq!(status.message(), "Invalid access token provided.");
}

#[tokio::test]
async fn wrong_credentials_fail_to_log_in() {
    let store = Arc::new(InMemoryAccountStore::new());
    seed_active(&store, "ada@example.com", "secret").await;
    let channel = start_server(store).await;

    let status = AuthClient::new(channel, "ada@example.com", "wrong")
        .interceptor()
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unauthenticated);
}
