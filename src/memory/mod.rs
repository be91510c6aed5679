// src/memory/mod.rs — Session persistence

pub mod kv;
pub mod schema;
pub mod sqlite;
pub mod store;

use std::sync::Arc;

use crate::infra::config::StorageConfig;
use crate::infra::errors::AuditorError;
use kv::{KeyValueStore, MemoryKv};
use sqlite::SqliteKv;

/// Open the key-value backend selected by `[storage]`.
pub fn open_kv(storage: &StorageConfig) -> Result<Arc<dyn KeyValueStore>, AuditorError> {
    if storage.in_memory {
        tracing::info!("Using in-memory session storage");
        return Ok(Arc::new(MemoryKv::new()));
    }
    let kv = SqliteKv::open(&storage.database_path())?;
    Ok(Arc::new(kv))
}
