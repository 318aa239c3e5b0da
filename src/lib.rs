//! recap - Incremental running summaries for chunked audio transcripts
//!
//! Chunks of transcribed text arrive over time for an audio item; each one is
//! folded into a single stored summary that can be read back, translated on
//! demand.

pub mod cli;
pub mod config;
pub mod http;
pub mod llm;
pub mod storage;
pub mod summary;

use thiserror::Error;

/// Main error type for recap
#[derive(Error, Debug)]
pub enum RecapError {
    #[error("Summary is not supported for this pair of languages (original: {original}, translation: {translation})")]
    UnsupportedLanguagePair {
        original: String,
        translation: String,
    },

    #[error("Invalid type_of_audio '{0}'. It should be 'dialogue' or 'single_speech'")]
    InvalidAudioType(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Model catalog error: {0}")]
    ModelCatalog(String),

    #[error("No summary found for audio_id '{0}'")]
    SummaryNotFound(String),
}

/// Coarse classification used at the entry-point boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller-correctable input
    ClientInput,
    /// A consumed capability failed
    Upstream,
    /// Expected state is missing
    NotFound,
}

impl RecapError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedLanguagePair { .. }
            | Self::InvalidAudioType(_)
            | Self::InvalidRequest(_) => ErrorKind::ClientInput,
            Self::Inference(_)
            | Self::Translation(_)
            | Self::Storage(_)
            | Self::ModelCatalog(_) => ErrorKind::Upstream,
            Self::SummaryNotFound(_) => ErrorKind::NotFound,
        }
    }
}

pub type Result<T> = std::result::Result<T, RecapError>;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "recap";
