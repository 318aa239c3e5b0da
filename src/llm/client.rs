use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

use crate::config::Settings;
use crate::llm::gemini::GeminiClient;
use crate::llm::libretranslate::LibreTranslateClient;

/// Text turn that primes the model's reply.
pub const SUMMARY_PRIMER: &str = "The summary is:";

/// Single-completion inference request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InferenceRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub max_output_tokens: u32,
}

/// Translation request payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslationRequest<'a> {
    pub text: &'a str,
    pub source_language: &'a str,
    pub target_language: &'a str,
}

#[async_trait]
pub trait InferenceService: Send + Sync {
    /// Run the prompt against `model` and return the completion text.
    async fn invoke(&self, request: InferenceRequest<'_>) -> Result<String>;
}

#[async_trait]
pub trait ModelCatalog: Send + Sync {
    /// Identifiers of the models currently available.
    async fn list_models(&self) -> Result<HashSet<String>>;
}

#[async_trait]
pub trait TranslationService: Send + Sync {
    async fn translate(&self, request: TranslationRequest<'_>) -> Result<String>;
}

/// Language-model capabilities built from one provider client.
pub struct LlmServices {
    pub inference: Arc<dyn InferenceService>,
    pub catalog: Arc<dyn ModelCatalog>,
}

/// Build the inference and model-catalog clients from runtime settings.
pub fn build_llm(settings: &Settings) -> Result<LlmServices> {
    match settings.llm.provider.to_lowercase().as_str() {
        "gemini" => {
            let client = Arc::new(GeminiClient::from_settings(settings)?);
            Ok(LlmServices {
                inference: client.clone(),
                catalog: client,
            })
        }
        other => anyhow::bail!(
            "Unsupported llm.provider '{}'. Supported providers: gemini",
            other
        ),
    }
}

/// Build the translation client from runtime settings.
pub fn build_translator(settings: &Settings) -> Result<Arc<dyn TranslationService>> {
    match settings.translation.provider.to_lowercase().as_str() {
        "gemini" => Ok(Arc::new(GeminiClient::for_translation(settings)?)),
        "libretranslate" => Ok(Arc::new(LibreTranslateClient::from_settings(settings)?)),
        other => anyhow::bail!(
            "Unsupported translation.provider '{}'. Supported providers: gemini, libretranslate",
            other
        ),
    }
}
