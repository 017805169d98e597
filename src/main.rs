//! Catalogue Server - library document catalog browser
//!
//! REST API over the catalog document store.

use std::net::SocketAddr;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use catalogue_server::{
    api,
    config::{AppConfig, StoreBackend},
    repository::{MemoryCatalogStore, PgCatalogStore, Repository},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("catalogue_server={},tower_http=debug", config.logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Catalogue Server v{}", env!("CARGO_PKG_VERSION"));

    // Open the document store
    let repository = match config.store.backend {
        StoreBackend::Postgres => {
            let pool = PgCatalogStore::connect(&config.store)
                .await
                .context("Failed to connect to database")?;
            Repository::postgres(pool)
        }
        StoreBackend::Memory => {
            let store = match config.store.seed_file {
                Some(ref path) => MemoryCatalogStore::from_seed_file(path)
                    .await
                    .context("Failed to load seed file")?,
                None => MemoryCatalogStore::new(Vec::new()),
            };
            tracing::info!("Using in-memory store");
            Repository::new(std::sync::Arc::new(store))
        }
    };

    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid host address")?,
        config.server.port,
    );

    let state = AppState::new(config, repository);
    let app = api::create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
