//! Server binary for the rug workshop API
//!
//! Loads configuration from the file named by `RUGOPS_CONFIG` (falling back
//! to defaults), picks the storage backend, and serves until Ctrl+C or
//! SIGTERM.

use anyhow::Result;
use rugops::config::AppConfig;
use rugops::server::ServerBuilder;
use rugops::storage::InMemoryOrderStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("rugops=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::load()?;

    #[cfg(feature = "sqlite")]
    if let Some(url) = config.database_url.clone() {
        use rugops::storage::SqliteOrderStore;
        use sqlx::sqlite::SqlitePool;

        tracing::info!(url = %url, "using sqlite storage");
        let pool = SqlitePool::connect(&url).await?;
        rugops::storage::sqlite::ensure_schema(&pool).await?;

        return ServerBuilder::new()
            .with_store(SqliteOrderStore::new(pool))
            .with_config(config)
            .serve()
            .await;
    }

    #[cfg(not(feature = "sqlite"))]
    if config.database_url.is_some() {
        tracing::warn!("database_url is set but the sqlite feature is not compiled in");
    }

    tracing::info!("using in-memory storage");
    ServerBuilder::new()
        .with_store(InMemoryOrderStore::new())
        .with_config(config)
        .serve()
        .await
}
