//! Application settings management

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// General settings
    #[serde(default)]
    pub general: GeneralSettings,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerSettings,

    /// Summary storage settings
    #[serde(default)]
    pub storage: StorageSettings,

    /// Language model settings
    #[serde(default)]
    pub llm: LlmSettings,

    /// Translation settings used on retrieval
    #[serde(default)]
    pub translation: TranslationSettings,

    /// Ingestion pipeline settings
    #[serde(default)]
    pub pipeline: PipelineSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSettings {
    /// Data directory for the summary database
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Socket address the HTTP API binds to
    #[serde(default = "default_bind")]
    pub bind: String,
}

/// Where running summaries are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// SQLite database under the data directory
    #[default]
    Sqlite,
    /// Process memory, lost on exit
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Storage backend (sqlite, memory)
    #[serde(default)]
    pub backend: StorageBackend,

    /// Bucket name objects are grouped under
    #[serde(default = "default_bucket")]
    pub bucket: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// LLM provider (gemini)
    #[serde(default = "default_llm_provider")]
    pub provider: String,

    /// API key (for cloud providers)
    #[serde(default)]
    pub api_key: String,

    /// API endpoint (empty = provider default)
    #[serde(default)]
    pub endpoint: String,

    /// Model used when the catalog lists it
    #[serde(default = "default_preferred_model")]
    pub preferred_model: String,

    /// Model used otherwise
    #[serde(default = "default_fallback_model")]
    pub fallback_model: String,

    /// Upper bound on generated tokens per summary
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Reasoning tokens allowed inside `max_output_tokens` on thinking models
    #[serde(default = "default_thinking_budget")]
    pub thinking_budget: u32,

    /// HTTP client timeout in seconds
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationSettings {
    /// Translation provider (gemini, libretranslate)
    #[serde(default = "default_translation_provider")]
    pub provider: String,

    /// API key (libretranslate only; gemini reuses llm.api_key)
    #[serde(default)]
    pub api_key: String,

    /// API endpoint (empty = provider default)
    #[serde(default)]
    pub endpoint: String,

    /// HTTP client timeout in seconds
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Serialize concurrent ingestions for the same audio_id
    #[serde(default = "default_true")]
    pub serialize_ingestion: bool,

    /// Deadline for a single inference or translation call, in seconds
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
}

// Default value functions

fn default_data_dir() -> PathBuf {
    ProjectDirs::from("com", "recap", "recap")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.local/share/recap"))
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_bucket() -> String {
    "summaries".to_string()
}

fn default_true() -> bool {
    true
}

fn default_llm_provider() -> String {
    "gemini".to_string()
}

fn default_preferred_model() -> String {
    "gemini-2.5-pro".to_string()
}

fn default_fallback_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_max_output_tokens() -> u32 {
    500
}

fn default_thinking_budget() -> u32 {
    128
}

fn default_http_timeout_secs() -> u64 {
    45
}

fn default_translation_provider() -> String {
    "gemini".to_string()
}

fn default_call_timeout_secs() -> u64 {
    60
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            bucket: default_bucket(),
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            api_key: String::new(),
            endpoint: String::new(),
            preferred_model: default_preferred_model(),
            fallback_model: default_fallback_model(),
            max_output_tokens: default_max_output_tokens(),
            thinking_budget: default_thinking_budget(),
            timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            provider: default_translation_provider(),
            api_key: String::new(),
            endpoint: String::new(),
            timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            serialize_ingestion: true,
            call_timeout_secs: default_call_timeout_secs(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            general: GeneralSettings::default(),
            server: ServerSettings::default(),
            storage: StorageSettings::default(),
            llm: LlmSettings::default(),
            translation: TranslationSettings::default(),
            pipeline: PipelineSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from the configuration file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            tracing::info!("No config file found, using defaults");
            let mut settings = Self::default();
            settings.apply_env_overrides();
            return Ok(settings);
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let mut settings = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        settings.apply_env_overrides();

        Ok(settings)
    }

    /// Parse settings from TOML text, filling omitted fields with defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if self.llm.api_key.trim().is_empty() {
            if let Ok(key) = std::env::var("RECAP_GEMINI_API_KEY") {
                if !key.trim().is_empty() {
                    self.llm.api_key = key;
                }
            }
        }

        if self.translation.api_key.trim().is_empty() {
            if let Ok(key) = std::env::var("RECAP_TRANSLATE_API_KEY") {
                if !key.trim().is_empty() {
                    self.translation.api_key = key;
                }
            }
        }
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("com", "recap", "recap")
            .context("Could not determine config directory")?;

        let config_dir = dirs.config_dir();
        Ok(config_dir.join("config.toml"))
    }

    /// Write default configuration to a file
    pub fn write_default(path: &PathBuf) -> Result<()> {
        let settings = Self::default();
        let content = toml::to_string_pretty(&settings)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the object database path
    pub fn database_path(&self) -> PathBuf {
        self.general.data_dir.join("objects.db")
    }

    /// Deadline applied to each inference and translation call
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.pipeline.call_timeout_secs)
    }
}
