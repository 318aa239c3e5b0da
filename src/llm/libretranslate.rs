use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::Settings;
use crate::llm::client::{TranslationRequest, TranslationService};

const DEFAULT_LIBRETRANSLATE_ENDPOINT: &str = "http://localhost:5000";

/// Client for a LibreTranslate-compatible `/translate` endpoint
pub struct LibreTranslateClient {
    http: Client,
    api_key: Option<String>,
    endpoint: String,
}

impl LibreTranslateClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let api_key = Some(settings.translation.api_key.trim().to_string()).filter(|k| !k.is_empty());

        let endpoint = if settings.translation.endpoint.trim().is_empty() {
            DEFAULT_LIBRETRANSLATE_ENDPOINT.to_string()
        } else {
            settings
                .translation
                .endpoint
                .trim()
                .trim_end_matches('/')
                .to_string()
        };

        Ok(Self {
            http: Client::builder()
                .timeout(Duration::from_secs(settings.translation.timeout_secs))
                .build()
                .context("Failed to build LibreTranslate HTTP client")?,
            api_key,
            endpoint,
        })
    }

    fn request_url(&self) -> String {
        format!("{}/translate", self.endpoint)
    }
}

#[async_trait]
impl TranslationService for LibreTranslateClient {
    async fn translate(&self, request: TranslationRequest<'_>) -> Result<String> {
        let body = LibreTranslateRequest {
            q: request.text,
            source: request.source_language,
            target: request.target_language,
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let payload: LibreTranslateResponse = self
            .http
            .post(self.request_url())
            .json(&body)
            .send()
            .await
            .context("LibreTranslate request failed")?
            .error_for_status()
            .context("LibreTranslate returned an error status")?
            .json()
            .await
            .context("Failed to parse LibreTranslate response")?;

        Ok(payload.translated_text)
    }
}

#[derive(Debug, Serialize)]
struct LibreTranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LibreTranslateResponse {
    translated_text: String,
}
