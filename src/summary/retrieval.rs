//! Reading summaries back, translated on request

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::llm::{TranslationRequest, TranslationService};
use crate::summary::store::SummaryStore;
use crate::RecapError;

const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(60);

/// Serves stored summaries, translating them when the caller asks for
/// another language. Stored summaries are never modified here.
pub struct Retriever {
    store: SummaryStore,
    translator: Arc<dyn TranslationService>,
    call_timeout: Duration,
}

impl Retriever {
    pub fn new(store: SummaryStore, translator: Arc<dyn TranslationService>) -> Self {
        Self {
            store,
            translator,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub async fn retrieve(
        &self,
        audio_id: &str,
        summary_language: &str,
        translation_language: &str,
    ) -> Result<String, RecapError> {
        let text = self
            .store
            .get(audio_id)
            .await?
            .ok_or_else(|| RecapError::SummaryNotFound(audio_id.to_string()))?;

        if summary_language == translation_language {
            debug!(audio_id, "Serving summary without translation");
            return Ok(text);
        }

        let request = TranslationRequest {
            text: &text,
            source_language: summary_language,
            target_language: translation_language,
        };
        let translated =
            match tokio::time::timeout(self.call_timeout, self.translator.translate(request)).await
            {
                Ok(Ok(translated)) => translated,
                Ok(Err(e)) => return Err(RecapError::Translation(format!("{e:#}"))),
                Err(_) => {
                    return Err(RecapError::Translation(format!(
                        "Translation did not complete within {}s",
                        self.call_timeout.as_secs()
                    )))
                }
            };

        info!(
            audio_id,
            source = summary_language,
            target = translation_language,
            "Served translated summary"
        );

        Ok(translated)
    }
}
