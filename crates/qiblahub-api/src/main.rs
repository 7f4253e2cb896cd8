//! Qibla Hub API server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use qiblahub_api::config::ServerConfig;
use qiblahub_api::error::AppError;
use qiblahub_api::state::AppState;
use qiblahub_core::clock::SystemClock;
use qiblahub_core::store::DocumentStore;
use qiblahub_store::{MemoryDocumentStore, PgDocumentStore};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Qibla Hub API server");

    let config = ServerConfig::from_env()?;

    let store: Arc<dyn DocumentStore> = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(database_url)
                .await?;
            let store = PgDocumentStore::new(pool);
            store.migrate().await?;
            tracing::info!("Using PostgreSQL document store");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; documents are kept in memory");
            Arc::new(MemoryDocumentStore::new())
        }
    };

    let app_state = AppState::open(store, Arc::new(SystemClock), config.qibla_target).await?;
    let app = qiblahub_api::build_router(app_state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
