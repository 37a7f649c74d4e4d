use bridge_infra::{CachedSecretProvider, EnvSecretProvider};
use bridge_server::app::{build_app, connect_store, serve};
use bridge_server::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }
    bridge_observability::init();

    let config = ServerConfig::from_env()?;
    let secrets = CachedSecretProvider::new(EnvSecretProvider);
    let auth = config.auth_config(&secrets).await?;
    let store = connect_store(&config).await?;

    let app = build_app(&auth, store);
    serve(&config, app, async {
        if tokio::signal::ctrl_c().await.is_err() {
            tracing::warn!("failed to listen for shutdown signal");
        }
    })
    .await
}
