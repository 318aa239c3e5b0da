//! Model variant selection by regional availability

use crate::config::LlmSettings;
use crate::llm::ModelCatalog;
use crate::RecapError;

/// Picks the preferred model when the catalog lists it, the fallback otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelector {
    preferred: String,
    fallback: String,
}

impl ModelSelector {
    pub fn new(preferred: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self {
            preferred: preferred.into(),
            fallback: fallback.into(),
        }
    }

    pub fn from_settings(settings: &LlmSettings) -> Self {
        Self::new(
            settings.preferred_model.trim(),
            settings.fallback_model.trim(),
        )
    }

    pub fn preferred(&self) -> &str {
        &self.preferred
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Query the catalog and choose a model. Availability is not cached.
    ///
    /// The fallback is not checked against the catalog.
    pub async fn select(&self, catalog: &dyn ModelCatalog) -> Result<String, RecapError> {
        let available = catalog
            .list_models()
            .await
            .map_err(|e| RecapError::ModelCatalog(format!("{e:#}")))?;

        if available.contains(&self.preferred) {
            Ok(self.preferred.clone())
        } else {
            tracing::debug!(
                preferred = %self.preferred,
                fallback = %self.fallback,
                "Preferred model unavailable, using fallback"
            );
            Ok(self.fallback.clone())
        }
    }
}
