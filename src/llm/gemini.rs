use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

use crate::config::Settings;
use crate::llm::client::{
    InferenceRequest, InferenceService, ModelCatalog, TranslationRequest, TranslationService,
    SUMMARY_PRIMER,
};
use crate::llm::prompts::build_translation_prompt;

const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const MODELS_PAGE_SIZE: &str = "1000";
const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GeminiClient {
    http: Client,
    api_key: String,
    endpoint: String,
    /// Model used for translation requests
    translation_model: String,
    thinking_budget: u32,
}

impl GeminiClient {
    /// Client for summarization and model listing, configured from `[llm]`.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            &settings.llm.api_key,
            &settings.llm.endpoint,
            &settings.llm.fallback_model,
            settings.llm.timeout_secs,
        )
        .map(|client| client.with_thinking_budget(settings.llm.thinking_budget))
    }

    /// Client for translation, configured from `[translation]` with the
    /// `[llm]` API key and endpoint as fallbacks.
    pub fn for_translation(settings: &Settings) -> Result<Self> {
        let api_key = if settings.translation.api_key.trim().is_empty() {
            &settings.llm.api_key
        } else {
            &settings.translation.api_key
        };
        let endpoint = if settings.translation.endpoint.trim().is_empty() {
            &settings.llm.endpoint
        } else {
            &settings.translation.endpoint
        };

        Self::new(
            api_key,
            endpoint,
            &settings.llm.fallback_model,
            settings.translation.timeout_secs,
        )
    }

    fn new(api_key: &str, endpoint: &str, translation_model: &str, timeout_secs: u64) -> Result<Self> {
        let api_key = api_key.trim().to_string();
        if api_key.is_empty() {
            anyhow::bail!(
                "Gemini API key is missing. Set llm.api_key in config or RECAP_GEMINI_API_KEY."
            );
        }

        let endpoint = if endpoint.trim().is_empty() {
            DEFAULT_GEMINI_ENDPOINT.to_string()
        } else {
            endpoint.trim().trim_end_matches('/').to_string()
        };

        Ok(Self {
            http: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .context("Failed to build Gemini HTTP client")?,
            api_key,
            endpoint,
            translation_model: translation_model.trim().to_string(),
            thinking_budget: 0,
        })
    }

    fn with_thinking_budget(mut self, thinking_budget: u32) -> Self {
        self.thinking_budget = thinking_budget;
        self
    }

    // The key goes in a header so that URLs stay safe to log and to report.
    fn generate_request(&self, model: &str) -> RequestBuilder {
        self.http
            .post(format!("{}/models/{}:generateContent", self.endpoint, model))
            .header(API_KEY_HEADER, &self.api_key)
    }

    fn models_request(&self) -> RequestBuilder {
        self.http
            .get(format!("{}/models", self.endpoint))
            .header(API_KEY_HEADER, &self.api_key)
    }

    async fn generate(&self, model: &str, body: &GeminiGenerateContentRequest) -> Result<String> {
        let response = self
            .generate_request(model)
            .json(body)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Gemini request failed")?;

        let response = response
            .error_for_status()
            .map_err(reqwest::Error::without_url)
            .context("Gemini returned an error status")?;

        let payload: GeminiGenerateContentResponse = response
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to parse Gemini response")?;

        first_text(&payload).context("Gemini response did not contain any text")
    }
}

#[async_trait]
impl InferenceService for GeminiClient {
    async fn invoke(&self, request: InferenceRequest<'_>) -> Result<String> {
        let body = summary_request_body(
            request.prompt,
            request.max_output_tokens,
            self.thinking_budget,
        );
        self.generate(request.model, &body).await
    }
}

#[async_trait]
impl ModelCatalog for GeminiClient {
    async fn list_models(&self) -> Result<HashSet<String>> {
        let mut models = HashSet::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("pageSize", MODELS_PAGE_SIZE)];
            if let Some(token) = page_token.as_deref() {
                query.push(("pageToken", token));
            }

            let page: GeminiListModelsResponse = self
                .models_request()
                .query(&query)
                .send()
                .await
                .map_err(reqwest::Error::without_url)
                .context("Gemini model listing failed")?
                .error_for_status()
                .map_err(reqwest::Error::without_url)
                .context("Gemini model listing returned an error status")?
                .json()
                .await
                .map_err(reqwest::Error::without_url)
                .context("Failed to parse Gemini model listing")?;

            models.extend(page.models.iter().map(|m| model_id(&m.name).to_string()));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(models)
    }
}

#[async_trait]
impl TranslationService for GeminiClient {
    async fn translate(&self, request: TranslationRequest<'_>) -> Result<String> {
        let prompt = build_translation_prompt(
            request.text,
            request.source_language,
            request.target_language,
        );
        let body = GeminiGenerateContentRequest {
            contents: vec![GeminiContent::user(prompt)],
            generation_config: None,
        };
        self.generate(&self.translation_model, &body).await
    }
}

/// User turn carrying the prompt, model turn priming the reply.
///
/// Thinking models count reasoning against `maxOutputTokens`, so the budget
/// is capped to leave room for the summary itself. Zero omits the setting.
fn summary_request_body(
    prompt: &str,
    max_output_tokens: u32,
    thinking_budget: u32,
) -> GeminiGenerateContentRequest {
    GeminiGenerateContentRequest {
        contents: vec![
            GeminiContent::user(prompt.to_string()),
            GeminiContent {
                role: "model".to_string(),
                parts: vec![GeminiPart {
                    text: SUMMARY_PRIMER.to_string(),
                }],
            },
        ],
        generation_config: Some(GenerationConfig {
            max_output_tokens,
            thinking_config: (thinking_budget > 0).then_some(ThinkingConfig { thinking_budget }),
        }),
    }
}

fn first_text(payload: &GeminiGenerateContentResponse) -> Option<String> {
    payload
        .candidates
        .iter()
        .flat_map(|c| c.content.parts.iter())
        .filter_map(|p| p.text.as_deref())
        .map(str::trim)
        .find(|t| !t.is_empty())
        .map(str::to_string)
}

/// Listing names look like `models/gemini-2.5-pro`.
fn model_id(name: &str) -> &str {
    name.strip_prefix("models/").unwrap_or(name)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerateContentRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

impl GeminiContent {
    fn user(text: String) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![GeminiPart { text }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiGenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContentResponse,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
struct GeminiPartResponse {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiListModelsResponse {
    #[serde(default)]
    models: Vec<GeminiModel>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiModel {
    name: String,
}
