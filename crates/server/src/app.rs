use std::future::Future;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tonic::transport::Server;
use tonic::transport::server::Router;
use tower::layer::util::{Identity, Stack};
use tracing::{info, warn};

use bridge_auth::{
    AccountStore, AuthConfig, AuthProcessor, AuthService, PolicyTable, ProfileService,
};
use bridge_infra::{InMemoryAccountStore, PostgresAccountStore};

use crate::config::ServerConfig;
use crate::handlers::{AccountHandler, AuthHandler};
use crate::middleware::AuthLayer;
use crate::pb::account_service_server::{self, AccountServiceServer};
use crate::pb::auth_service_server::{self, AuthServiceServer};

const MAX_DB_CONNECTIONS: u32 = 10;

/// Everything the transport needs, built once at startup.
#[derive(Clone)]
pub struct App {
    pub auth: AuthHandler,
    pub accounts: AccountHandler,
    pub layer: AuthLayer,
}

/// Login/Register are reachable without a token; everything else is not.
pub fn policies() -> PolicyTable {
    PolicyTable::new()
        .public(auth_service_server::SERVICE_NAME)
        .requires_auth(account_service_server::SERVICE_NAME)
}

pub fn build_app(config: &AuthConfig, store: Arc<dyn AccountStore>) -> App {
    let codec = Arc::new(config.token_codec());
    let processor = AuthProcessor::new(codec.clone(), store.clone());

    App {
        auth: AuthHandler::new(AuthService::new(codec, store.clone(), config.token_ttl)),
        accounts: AccountHandler::new(ProfileService::new(store)),
        layer: AuthLayer::new(Arc::new(processor), Arc::new(policies())),
    }
}

pub async fn connect_store(config: &ServerConfig) -> anyhow::Result<Arc<dyn AccountStore>> {
    match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(MAX_DB_CONNECTIONS)
                .connect(url)
                .await?;
            let store = PostgresAccountStore::new(pool);
            store.ensure_schema().await?;
            info!("using postgres account store");
            Ok(Arc::new(store))
        }
        None => {
            warn!("DATABASE_URL not set; using in-memory account store");
            Ok(Arc::new(InMemoryAccountStore::new()))
        }
    }
}

/// Both services behind the auth layer, ready to serve.
pub fn router(app: App) -> Router<Stack<AuthLayer, Identity>> {
    Server::builder()
        .layer(app.layer)
        .add_service(AuthServiceServer::new(app.auth))
        .add_service(AccountServiceServer::new(app.accounts))
}

pub async fn serve(
    config: &ServerConfig,
    app: App,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<()> {
    info!(addr = %config.grpc_addr, app_name = %config.app_name, "listening");

    router(app)
        .serve_with_shutdown(config.grpc_addr, shutdown)
        .await?;

    info!("server stopped");
    Ok(())
}
