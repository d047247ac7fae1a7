//! docquery server binary
//!
//! Usage: `docquery [config.yaml]`. Without an argument the path is read from
//! `DOCQUERY_CONFIG`; without either, defaults are used (in-memory store,
//! `courses` collection on port 5000).

use anyhow::Result;
use docquery::config::{AppConfig, CONFIG_ENV_VAR};
use docquery::server::ServerBuilder;
use docquery::storage;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("docquery=info,tower_http=info")),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_ENV_VAR).ok());
    let config = match config_path {
        Some(path) => {
            tracing::info!("Loading configuration from {}", path);
            AppConfig::from_yaml_file(&path)?
        }
        None => AppConfig::default(),
    };
    config.validate()?;

    let addr = config.server.socket_addr()?;
    let store = storage::open(&config.storage).await?;

    tracing::info!(
        collections = ?config.api.collections,
        prefix = %config.api.prefix,
        backend = store.backend_name(),
        "Starting docquery"
    );

    ServerBuilder::new()
        .with_config(config)
        .with_store_arc(store)
        .serve(&addr.to_string())
        .await
}
