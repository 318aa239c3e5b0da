//! LLM module for recap
//!
//! Language-model inference, model availability and translation clients.

mod client;
mod gemini;
mod libretranslate;
mod prompts;

pub use client::{
    build_llm, build_translator, InferenceRequest, InferenceService, LlmServices, ModelCatalog,
    TranslationRequest, TranslationService, SUMMARY_PRIMER,
};
pub use gemini::GeminiClient;
pub use libretranslate::LibreTranslateClient;
