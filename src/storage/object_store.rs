//! Key/value object storage abstraction

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Content type used for summary objects
pub const TEXT_PLAIN: &str = "text/plain";

/// Minimal object store: get and put whole objects by key.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch an object's bytes. A missing key is `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write an object, replacing any existing value.
    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<()>;
}

/// A stored object with its metadata
#[derive(Debug, Clone, PartialEq, Eq)]
struct StoredObject {
    body: Vec<u8>,
    content_type: String,
}

/// In-process object store, contents are lost on exit
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content type recorded for a key, if present
    pub async fn content_type(&self, key: &str) -> Option<String> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|o| o.content_type.clone())
    }

    /// Number of stored objects
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.objects.read().await.get(key).map(|o| o.body.clone()))
    }

    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<()> {
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                body,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }
}
