//! CLI command implementations

use anyhow::Result;

use crate::cli::args::ConfigCommand;
use crate::config::Settings;
use crate::llm::build_llm;
use crate::summary::{build_retriever, Chunk, ModelSelector, SummaryService};

/// Run the HTTP API until interrupted
pub async fn serve(settings: &Settings, bind: Option<String>) -> Result<()> {
    let service = SummaryService::from_settings(settings)?;
    let bind = bind.unwrap_or_else(|| settings.server.bind.clone());
    crate::http::serve(service, &bind).await
}

/// Ingest a single chunk from the command line
pub async fn ingest_chunk(
    settings: &Settings,
    audio_id: &str,
    type_of_audio: &str,
    chunk: Chunk,
) -> Result<()> {
    let service = SummaryService::from_settings(settings)?;

    let ingested = service
        .summarizer
        .ingest(&chunk, audio_id, type_of_audio)
        .await?;

    println!(
        "Successfully summarized {} (language: {}, model: {}{})",
        audio_id,
        ingested.summary_language,
        ingested.model,
        if ingested.continued { ", continued" } else { "" }
    );

    Ok(())
}

/// Print a stored summary, translated when the languages differ
pub async fn show_summary(
    settings: &Settings,
    audio_id: &str,
    summary_language: &str,
    translation_language: &str,
) -> Result<()> {
    let summary = build_retriever(settings)?
        .retrieve(audio_id, summary_language, translation_language)
        .await?;

    println!("{}", summary);
    Ok(())
}

/// Report model availability and the resulting selection
pub async fn show_models(settings: &Settings) -> Result<()> {
    let llm = build_llm(settings)?;
    let selector = ModelSelector::from_settings(&settings.llm);

    let available = llm.catalog.list_models().await?;
    let mark = |id: &str| if available.contains(id) { "available" } else { "not listed" };

    println!("preferred: {:<24} {}", selector.preferred(), mark(selector.preferred()));
    println!("fallback:  {:<24} {}", selector.fallback(), mark(selector.fallback()));

    let selected = selector.select(llm.catalog.as_ref()).await?;
    println!();
    println!("selected:  {}", selected);

    Ok(())
}

/// Handle config subcommands
pub fn config_command(settings: &Settings, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            let toml = toml::to_string_pretty(&redacted(settings))?;
            println!("{}", toml);
        }
        ConfigCommand::Path => {
            let path = Settings::config_path()?;
            println!("{}", path.display());
        }
        ConfigCommand::Init { force } => {
            let path = Settings::config_path()?;
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {}. Use --force to overwrite.",
                    path.display()
                );
            }
            Settings::write_default(&path)?;
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

/// Copy of the settings with API keys masked
fn redacted(settings: &Settings) -> Settings {
    let mut settings = settings.clone();
    for key in [&mut settings.llm.api_key, &mut settings.translation.api_key] {
        if !key.is_empty() {
            *key = "********".to_string();
        }
    }
    settings
}
