// lib/src/storage_engine/mod.rs

// Module declarations
pub mod storage_engine;
pub mod sled_storage;
pub mod inmemory_storage;
pub mod record_store;
pub mod seed;

// Re-export key types and traits for external use
pub use storage_engine::{StorageEngine, WriteBatch, WriteOp};
pub use sled_storage::{SledStorage, open_sled_db};
pub use inmemory_storage::InMemoryStorage;
pub use record_store::{Collection, LoadOutcome, RecordStore, StoreTransaction};
pub use seed::{initialize, SeedData, SeedReport};

use anyhow::Result;
use log::info;
use std::sync::Arc;

use crate::config::{StorageConfig, StorageEngineType};

/// Creates a storage engine instance based on the provided configuration.
///
/// Sled is the default; InMemory keeps nothing once the process exits.
pub fn create_storage(config: &StorageConfig) -> Result<Arc<dyn StorageEngine>> {
    match config.engine_type {
        StorageEngineType::Sled => {
            let storage = SledStorage::open(&config.data_path)?;
            info!("Using sled storage at {:?}", config.data_path);
            Ok(Arc::new(storage) as Arc<dyn StorageEngine>)
        }
        StorageEngineType::InMemory => {
            info!("Using in-memory storage; nothing will be persisted");
            Ok(Arc::new(InMemoryStorage::new()) as Arc<dyn StorageEngine>)
        }
    }
}
