//! Choice of which transcript variant gets summarized

use serde::{Deserialize, Serialize};

use crate::RecapError;

/// Languages accepted when carried as the translation.
pub const TRANSLATION_LANGUAGES: &[&str] = &[
    "en", "es", "es-MX", "fr", "fr-CA", "it", "de", "pt", "pt-PT", "nl", "ru", "ar", "zh", "zh-TW",
    "ja", "ko",
];

/// Languages accepted when carried as the original.
pub const ORIGINAL_LANGUAGES: &[&str] = &[
    "en-GB", "es-ES", "fr-FR", "it-IT", "de-DE", "pt-PT", "nl-NL", "ru-RU", "ar-AR", "zh-CN",
    "ja-JP", "ko-KR",
];

/// One incremental piece of transcribed text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub original_language: String,
    pub translation_language: String,
    pub original_text: String,
    pub translated_text: String,
}

/// Which text of a chunk is summarized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSource {
    Translated,
    Original,
}

/// Outcome of routing a language pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub source: ContentSource,
    pub summary_language: String,
}

impl Route {
    /// The chunk text this route selects
    pub fn content<'a>(&self, chunk: &'a Chunk) -> &'a str {
        match self.source {
            ContentSource::Translated => &chunk.translated_text,
            ContentSource::Original => &chunk.original_text,
        }
    }
}

/// Pick the text to summarize and the language the summary is written in.
///
/// A usable translation wins over the original.
pub fn route(original_language: &str, translation_language: &str) -> Result<Route, RecapError> {
    if TRANSLATION_LANGUAGES.contains(&translation_language) {
        Ok(Route {
            source: ContentSource::Translated,
            summary_language: translation_language.to_string(),
        })
    } else if ORIGINAL_LANGUAGES.contains(&original_language) {
        Ok(Route {
            source: ContentSource::Original,
            summary_language: original_language.to_string(),
        })
    } else {
        Err(RecapError::UnsupportedLanguagePair {
            original: original_language.to_string(),
            translation: translation_language.to_string(),
        })
    }
}

/// Route a chunk by its own language pair.
pub fn route_chunk(chunk: &Chunk) -> Result<Route, RecapError> {
    route(&chunk.original_language, &chunk.translation_language)
}
