//! Storage module for recap
//!
//! Object storage used to persist running summaries: a narrow get/put-by-key
//! interface with SQLite and in-memory implementations.

mod database;
mod object_store;

use anyhow::Result;
use std::sync::Arc;

use crate::config::{Settings, StorageBackend};

pub use database::SqliteObjectStore;
pub use object_store::{MemoryObjectStore, ObjectStore, TEXT_PLAIN};

/// Build the configured object store
pub fn build_object_store(settings: &Settings) -> Result<Arc<dyn ObjectStore>> {
    match settings.storage.backend {
        StorageBackend::Sqlite => Ok(Arc::new(SqliteObjectStore::open(settings)?)),
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; summaries are lost on exit");
            Ok(Arc::new(MemoryObjectStore::new()))
        }
    }
}
