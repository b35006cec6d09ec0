#![cfg_attr(test, allow(clippy::disallowed_methods))]
// Forbid unwrap() in production code to prevent panics from bad key material.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
use std::net::SocketAddr;
use std::sync::Arc;

use keyshare_server::admin::{self, AdminState};
use keyshare_server::config::ServerConfig;
use keyshare_server::{ConfigurationProvider, DirectoryStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keyshare_server=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load process configuration from environment variables
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Loaded configuration: resource_directory={}, listen_port={}",
        config.resource_directory.display(),
        config.listen_port
    );

    let store = Arc::new(DirectoryStore::new(config.resource_directory.clone()));
    let provider = Arc::new(ConfigurationProvider::new(store));

    // A missing config.json only falls back to defaults, but unusable signing
    // keys are fatal.
    let configuration = provider.get_instance();
    if let Err(e) = configuration.signing_private_key() {
        tracing::error!("Signing private key unusable: {e}");
        std::process::exit(1);
    }
    if let Err(e) = configuration.signing_public_key() {
        tracing::error!("Signing public key unusable: {e}");
        std::process::exit(1);
    }
    tracing::info!(
        "Serving as {} ({})",
        configuration.settings().human_readable_name(),
        configuration.settings().server_name()
    );

    let app = admin::router(AdminState::new(provider, &config.admin_api_key));

    let addr = SocketAddr::from(([127, 0, 0, 1], config.listen_port));
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to bind: {e}");
            std::process::exit(1);
        });

    axum::serve(listener, app).await.unwrap_or_else(|e| {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    });
}
