use super::state::AppState;
use crate::summary::{AudioType, Chunk};
use crate::RecapError;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::info;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    pub audio_id: String,
    pub original_language: String,
    pub translation_language: String,
    pub original_text: String,
    pub translated_text: String,
    /// "dialogue" or "single_speech"
    pub type_of_audio: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummarizeResponse {
    pub message: String,
    pub summary_language: String,
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub audio_id: String,
    pub summary_language: String,
    pub translation_language: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error_message: String,
}

impl SummarizeRequest {
    /// Boundary checks that need no I/O
    fn validate(&self) -> Result<(), RecapError> {
        if self.audio_id.trim().is_empty() {
            return Err(RecapError::InvalidRequest(
                "audio_id must not be empty".to_string(),
            ));
        }
        self.type_of_audio.parse::<AudioType>()?;
        Ok(())
    }

    fn chunk(self) -> (String, String, Chunk) {
        (
            self.audio_id,
            self.type_of_audio,
            Chunk {
                original_language: self.original_language,
                translation_language: self.translation_language,
                original_text: self.original_text,
                translated_text: self.translated_text,
            },
        )
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /summarize
/// Fold a new transcript chunk into the running summary
pub async fn summarize(
    State(state): State<AppState>,
    payload: Result<Json<SummarizeRequest>, JsonRejection>,
) -> Result<Json<SummarizeResponse>, RecapError> {
    let Json(req) = payload.map_err(|e| RecapError::InvalidRequest(e.body_text()))?;
    req.validate()?;

    let (audio_id, type_of_audio, chunk) = req.chunk();
    info!("Summarizing chunk for audio: {}", audio_id);

    let ingested = state
        .service
        .summarizer
        .ingest(&chunk, &audio_id, &type_of_audio)
        .await?;

    Ok(Json(SummarizeResponse {
        message: "Successfully summarized.".to_string(),
        summary_language: ingested.summary_language,
    }))
}

/// GET /summary
/// Read the running summary, translated when the languages differ
pub async fn get_summary(
    State(state): State<AppState>,
    query: Result<Query<SummaryQuery>, QueryRejection>,
) -> Result<Json<SummaryResponse>, RecapError> {
    let Query(q) = query.map_err(|e| RecapError::InvalidRequest(e.body_text()))?;
    if q.audio_id.trim().is_empty() {
        return Err(RecapError::InvalidRequest(
            "audio_id must not be empty".to_string(),
        ));
    }

    let summary = state
        .service
        .retriever
        .retrieve(&q.audio_id, &q.summary_language, &q.translation_language)
        .await?;

    Ok(Json(SummaryResponse { summary }))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
