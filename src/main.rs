//! recap - Incremental running summaries for chunked audio transcripts
//!
//! Entry point for the recap CLI and HTTP API.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use recap::cli::{Cli, Commands};
use recap::config::Settings;
use recap::summary::Chunk;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        recap::cli::completions::print(shell);
        return Ok(());
    }

    // Load configuration only for runtime commands.
    let settings = Settings::load()?;

    // Initialize logging
    let default_level = if cli.verbose {
        "debug"
    } else {
        settings.general.log_level.as_str()
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Execute command
    match cli.command {
        Commands::Serve { bind } => {
            recap::cli::commands::serve(&settings, bind).await?;
        }
        Commands::Ingest {
            audio_id,
            type_of_audio,
            original_language,
            translation_language,
            original_text,
            translated_text,
        } => {
            let chunk = Chunk {
                original_language,
                translation_language,
                original_text,
                translated_text,
            };
            recap::cli::commands::ingest_chunk(&settings, &audio_id, &type_of_audio, chunk)
                .await?;
        }
        Commands::Summary {
            audio_id,
            summary_language,
            translation_language,
        } => {
            recap::cli::commands::show_summary(
                &settings,
                &audio_id,
                &summary_language,
                &translation_language,
            )
            .await?;
        }
        Commands::Models => {
            recap::cli::commands::show_models(&settings).await?;
        }
        Commands::Config(config_cmd) => {
            recap::cli::commands::config_command(&settings, config_cmd)?;
        }
        Commands::Completions { .. } => unreachable!(),
    }

    Ok(())
}
