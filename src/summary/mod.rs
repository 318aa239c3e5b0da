//! Incremental summarization pipeline
//!
//! New chunks are routed to a language variant, merged with the stored running
//! summary through a prompt, summarized by an available model and written
//! back. Retrieval reads the summary and translates it when asked.

mod language;
mod locks;
mod model;
mod pipeline;
mod prompt;
mod retrieval;
mod store;

use anyhow::Result;

use crate::config::Settings;
use crate::llm::{build_llm, build_translator};
use crate::storage::build_object_store;

pub use language::{
    route, route_chunk, Chunk, ContentSource, Route, ORIGINAL_LANGUAGES, TRANSLATION_LANGUAGES,
};
pub use locks::KeyedLocks;
pub use model::ModelSelector;
pub use pipeline::{Ingested, Summarizer};
pub use prompt::{compose, compose_for, AudioType};
pub use retrieval::Retriever;
pub use store::{summary_key, SummaryStore};

/// Ingestion and retrieval sharing one summary store
pub struct SummaryService {
    pub summarizer: Summarizer,
    pub retriever: Retriever,
}

impl SummaryService {
    /// Construct every client once from settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let store = SummaryStore::new(build_object_store(settings)?);
        let llm = build_llm(settings)?;

        let summarizer = Summarizer::new(
            store.clone(),
            llm.inference,
            llm.catalog,
            ModelSelector::from_settings(&settings.llm),
        )
        .with_max_output_tokens(settings.llm.max_output_tokens)
        .with_call_timeout(settings.call_timeout())
        .with_serialization(settings.pipeline.serialize_ingestion);

        Ok(Self {
            summarizer,
            retriever: retriever_for(settings, store)?,
        })
    }
}

/// Retrieval on its own, without the inference clients.
pub fn build_retriever(settings: &Settings) -> Result<Retriever> {
    retriever_for(settings, SummaryStore::new(build_object_store(settings)?))
}

fn retriever_for(settings: &Settings, store: SummaryStore) -> Result<Retriever> {
    Ok(Retriever::new(store, build_translator(settings)?).with_call_timeout(settings.call_timeout()))
}
