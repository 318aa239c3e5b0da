//! Running summary persistence keyed by audio_id

use std::sync::Arc;

use crate::storage::{ObjectStore, TEXT_PLAIN};
use crate::RecapError;

/// Object key for an audio item's running summary
pub fn summary_key(audio_id: &str) -> String {
    format!("results_{audio_id}.txt")
}

/// Reads and replaces running summaries in an object store
#[derive(Clone)]
pub struct SummaryStore {
    objects: Arc<dyn ObjectStore>,
}

impl SummaryStore {
    pub fn new(objects: Arc<dyn ObjectStore>) -> Self {
        Self { objects }
    }

    /// Current summary, `None` when nothing has been stored yet
    pub async fn get(&self, audio_id: &str) -> Result<Option<String>, RecapError> {
        let key = summary_key(audio_id);
        let body = self
            .objects
            .get(&key)
            .await
            .map_err(|e| RecapError::Storage(format!("Failed to read {key}: {e:#}")))?;

        body.map(|bytes| {
            String::from_utf8(bytes)
                .map_err(|_| RecapError::Storage(format!("Object {key} is not valid UTF-8")))
        })
        .transpose()
    }

    /// Replace the summary unconditionally
    pub async fn put(&self, audio_id: &str, text: &str) -> Result<(), RecapError> {
        let key = summary_key(audio_id);
        self.objects
            .put(&key, text.as_bytes().to_vec(), TEXT_PLAIN)
            .await
            .map_err(|e| RecapError::Storage(format!("Failed to write {key}: {e:#}")))
    }
}
