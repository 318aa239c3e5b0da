//! Ingestion of new chunks into a running summary

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::llm::{InferenceRequest, InferenceService, ModelCatalog};
use crate::summary::language::{route_chunk, Chunk};
use crate::summary::locks::KeyedLocks;
use crate::summary::model::ModelSelector;
use crate::summary::prompt::compose;
use crate::summary::store::SummaryStore;
use crate::RecapError;

const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 500;
const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(60);

/// Result of a successful ingestion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingested {
    /// Language the stored summary is written in
    pub summary_language: String,
    /// Model that produced the summary
    pub model: String,
    /// Whether a prior summary was merged in
    pub continued: bool,
}

/// Folds new chunks into the stored running summary of an audio item.
pub struct Summarizer {
    store: SummaryStore,
    inference: Arc<dyn InferenceService>,
    catalog: Arc<dyn ModelCatalog>,
    selector: ModelSelector,
    max_output_tokens: u32,
    call_timeout: Duration,
    locks: Option<KeyedLocks>,
}

impl Summarizer {
    /// Ingestion for one audio_id is serialized unless disabled with
    /// [`Summarizer::with_serialization`].
    pub fn new(
        store: SummaryStore,
        inference: Arc<dyn InferenceService>,
        catalog: Arc<dyn ModelCatalog>,
        selector: ModelSelector,
    ) -> Self {
        Self {
            store,
            inference,
            catalog,
            selector,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            locks: Some(KeyedLocks::new()),
        }
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Without serialization, concurrent ingestions for the same audio_id
    /// read the same prior summary and the last write wins.
    pub fn with_serialization(mut self, enabled: bool) -> Self {
        self.locks = enabled.then(KeyedLocks::new);
        self
    }

    pub fn selector(&self) -> &ModelSelector {
        &self.selector
    }

    /// Fold `chunk` into the running summary of `audio_id`.
    ///
    /// Nothing is written unless a new summary was produced.
    pub async fn ingest(
        &self,
        chunk: &Chunk,
        audio_id: &str,
        type_of_audio: &str,
    ) -> Result<Ingested, RecapError> {
        if audio_id.trim().is_empty() {
            return Err(RecapError::InvalidRequest(
                "audio_id must not be empty".to_string(),
            ));
        }

        let route = route_chunk(chunk).inspect_err(|_| {
            warn!(
                audio_id,
                original_language = %chunk.original_language,
                translation_language = %chunk.translation_language,
                "Rejected chunk with unsupported language pair"
            );
        })?;
        let content = route.content(chunk);

        let _guard = match &self.locks {
            Some(locks) => Some(locks.lock(audio_id).await),
            None => None,
        };

        let prior = self.store.get(audio_id).await?;
        let prompt = compose(content, type_of_audio, prior.as_deref())?;
        debug!(
            audio_id,
            continued = prior.is_some(),
            prompt_len = prompt.len(),
            "Composed summary prompt"
        );

        let model = self.selector.select(self.catalog.as_ref()).await?;

        let request = InferenceRequest {
            model: &model,
            prompt: &prompt,
            max_output_tokens: self.max_output_tokens,
        };
        let summary = match tokio::time::timeout(self.call_timeout, self.inference.invoke(request))
            .await
        {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => return Err(RecapError::Inference(format!("{e:#}"))),
            Err(_) => {
                return Err(RecapError::Inference(format!(
                    "Model {} did not respond within {}s",
                    model,
                    self.call_timeout.as_secs()
                )))
            }
        };

        let summary = summary.trim();
        if summary.is_empty() {
            return Err(RecapError::Inference(format!(
                "Model {model} returned an empty summary"
            )));
        }

        self.store.put(audio_id, summary).await?;

        info!(
            audio_id,
            summary_language = %route.summary_language,
            model = %model,
            continued = prior.is_some(),
            "Summary updated"
        );

        Ok(Ingested {
            summary_language: route.summary_language,
            model,
            continued: prior.is_some(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryObjectStore, ObjectStore};
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Records prompts and answers with a fixed reply, or fails.
    struct ScriptedModel {
        reply: Option<&'static str>,
        delay: Duration,
        prompts: Mutex<Vec<(String, String, u32)>>,
    }

    impl ScriptedModel {
        fn replying(reply: &'static str) -> Arc<Self> {
            Arc::new(Self {
                reply: Some(reply),
                delay: Duration::ZERO,
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: None,
                delay: Duration::ZERO,
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn slow(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                reply: Some("late"),
                delay,
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(String, String, u32)> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl InferenceService for ScriptedModel {
        async fn invoke(&self, request: InferenceRequest<'_>) -> anyhow::Result<String> {
            self.prompts.lock().unwrap().push((
                request.model.to_string(),
                request.prompt.to_string(),
                request.max_output_tokens,
            ));
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            match self.reply {
                Some(reply) => Ok(reply.to_string()),
                None => anyhow::bail!("throttled"),
            }
        }
    }

    struct Catalog(Vec<&'static str>);

    #[async_trait]
    impl ModelCatalog for Catalog {
        async fn list_models(&self) -> anyhow::Result<HashSet<String>> {
            Ok(self.0.iter().map(|m| m.to_string()).collect())
        }
    }

    fn chunk(original_language: &str, translation_language: &str, text: &str) -> Chunk {
        Chunk {
            original_language: original_language.to_string(),
            translation_language: translation_language.to_string(),
            original_text: format!("original: {text}"),
            translated_text: format!("translated: {text}"),
        }
    }

    fn summarizer(
        objects: Arc<MemoryObjectStore>,
        model: Arc<ScriptedModel>,
        available: Vec<&'static str>,
    ) -> Summarizer {
        Summarizer::new(
            SummaryStore::new(objects),
            model,
            Arc::new(Catalog(available)),
            ModelSelector::new("pro", "flash"),
        )
    }

    #[tokio::test]
    async fn first_chunk_uses_fresh_prompt_and_stores_summary() {
        let objects = Arc::new(MemoryObjectStore::new());
        let model = ScriptedModel::replying(" Un résumé. ");
        let s = summarizer(objects.clone(), model.clone(), vec!["pro"]);

        let out = s
            .ingest(&chunk("en-GB", "fr", "bonjour"), "a1", "dialogue")
            .await
            .unwrap();

        assert_eq!(out.summary_language, "fr");
        assert_eq!(out.model, "pro");
        assert!(!out.continued);

        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "pro");
        assert!(calls[0].1.starts_with("Summarize a dialogue."));
        assert!(calls[0].1.contains("translated: bonjour"));
        assert_eq!(calls[0].2, 500);

        assert_eq!(
            objects.get("results_a1.txt").await.unwrap(),
            Some(b"Un r\xc3\xa9sum\xc3\xa9.".to_vec())
        );
    }

    #[tokio::test]
    async fn later_chunk_merges_prior_summary() {
        let objects = Arc::new(MemoryObjectStore::new());
        objects
            .put("results_a1.txt", b"Earlier summary".to_vec(), "text/plain")
            .await
            .unwrap();
        let model = ScriptedModel::replying("Merged summary");
        let s = summarizer(objects.clone(), model.clone(), vec![]);

        let out = s
            .ingest(&chunk("de-DE", "xx", "weiter"), "a1", "single_speech")
            .await
            .unwrap();

        assert!(out.continued);
        assert_eq!(out.summary_language, "de-DE");
        assert_eq!(out.model, "flash");

        let prompt = &model.calls()[0].1;
        assert!(prompt.contains("Earlier summary"));
        assert!(prompt.contains("original: weiter"));
        assert!(prompt.contains("whole speech"));

        assert_eq!(
            objects.get("results_a1.txt").await.unwrap(),
            Some(b"Merged summary".to_vec())
        );
    }

    #[tokio::test]
    async fn unsupported_pair_touches_nothing() {
        let objects = Arc::new(MemoryObjectStore::new());
        let model = ScriptedModel::replying("unused");
        let s = summarizer(objects.clone(), model.clone(), vec!["pro"]);

        let err = s
            .ingest(&chunk("xx-XX", "yy", "text"), "a1", "dialogue")
            .await
            .unwrap_err();

        assert!(matches!(err, RecapError::UnsupportedLanguagePair { .. }));
        assert!(model.calls().is_empty());
        assert!(objects.is_empty().await);
    }

    #[tokio::test]
    async fn blank_audio_id_is_rejected() {
        let objects = Arc::new(MemoryObjectStore::new());
        let model = ScriptedModel::replying("unused");
        let s = summarizer(objects.clone(), model.clone(), vec!["pro"]);

        for audio_id in ["", "   "] {
            let err = s
                .ingest(&chunk("en-GB", "en", "text"), audio_id, "dialogue")
                .await
                .unwrap_err();
            assert!(matches!(err, RecapError::InvalidRequest(_)));
        }

        assert!(model.calls().is_empty());
        assert!(objects.is_empty().await);
    }

    #[tokio::test]
    async fn invalid_audio_type_fails_before_inference() {
        let objects = Arc::new(MemoryObjectStore::new());
        let model = ScriptedModel::replying("unused");
        let s = summarizer(objects.clone(), model.clone(), vec!["pro"]);

        let err = s
            .ingest(&chunk("en-GB", "en", "text"), "a1", "interview")
            .await
            .unwrap_err();

        assert!(matches!(err, RecapError::InvalidAudioType(ref t) if t == "interview"));
        assert!(model.calls().is_empty());
        assert!(objects.is_empty().await);
    }

    #[tokio::test]
    async fn inference_failure_keeps_prior_summary() {
        let objects = Arc::new(MemoryObjectStore::new());
        objects
            .put("results_a1.txt", b"Keep me".to_vec(), "text/plain")
            .await
            .unwrap();
        let s = summarizer(objects.clone(), ScriptedModel::failing(), vec!["pro"]);

        let err = s
            .ingest(&chunk("en-GB", "en", "text"), "a1", "dialogue")
            .await
            .unwrap_err();

        assert!(matches!(err, RecapError::Inference(ref m) if m.contains("throttled")));
        assert_eq!(
            objects.get("results_a1.txt").await.unwrap(),
            Some(b"Keep me".to_vec())
        );
    }

    #[tokio::test]
    async fn blank_completion_is_an_inference_error() {
        let objects = Arc::new(MemoryObjectStore::new());
        let s = summarizer(objects.clone(), ScriptedModel::replying("   "), vec!["pro"]);

        let err = s
            .ingest(&chunk("en-GB", "en", "text"), "a1", "dialogue")
            .await
            .unwrap_err();

        assert!(matches!(err, RecapError::Inference(_)));
        assert!(objects.is_empty().await);
    }

    #[tokio::test]
    async fn slow_model_times_out() {
        let objects = Arc::new(MemoryObjectStore::new());
        let s = summarizer(
            objects.clone(),
            ScriptedModel::slow(Duration::from_secs(5)),
            vec!["pro"],
        )
        .with_call_timeout(Duration::from_millis(20));

        let err = s
            .ingest(&chunk("en-GB", "en", "text"), "a1", "dialogue")
            .await
            .unwrap_err();

        assert!(matches!(err, RecapError::Inference(ref m) if m.contains("did not respond")));
        assert!(objects.is_empty().await);
    }

    #[tokio::test]
    async fn max_output_tokens_is_forwarded() {
        let model = ScriptedModel::replying("ok");
        let s = summarizer(Arc::new(MemoryObjectStore::new()), model.clone(), vec![])
            .with_max_output_tokens(128);

        s.ingest(&chunk("en-GB", "en", "t"), "a1", "dialogue")
            .await
            .unwrap();

        assert_eq!(model.calls()[0].2, 128);
    }
}
