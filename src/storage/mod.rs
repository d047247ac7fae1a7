//! Storage implementations for different backends

pub mod in_memory;
#[cfg(feature = "mongodb_backend")]
pub mod mongodb;

pub use in_memory::InMemoryDocumentStore;
#[cfg(feature = "mongodb_backend")]
pub use mongodb::MongoDocumentStore;

use crate::config::StorageConfig;
use crate::core::store::DocumentStore;
use anyhow::Result;
use std::sync::Arc;

/// Open the store described by the configuration
///
/// Selecting `mongodb` in a build without the `mongodb_backend` feature is an
/// error rather than a silent fallback to memory.
pub async fn open(config: &StorageConfig) -> Result<Arc<dyn DocumentStore>> {
    match config {
        StorageConfig::Memory => {
            tracing::info!("using in-memory document store");
            Ok(Arc::new(InMemoryDocumentStore::new()))
        }
        #[cfg(feature = "mongodb_backend")]
        StorageConfig::Mongodb { uri, database } => {
            let store = MongoDocumentStore::connect(uri, database).await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "mongodb_backend"))]
        StorageConfig::Mongodb { .. } => Err(anyhow::anyhow!(
            "storage backend 'mongodb' requires the mongodb_backend feature"
        )),
    }
}
