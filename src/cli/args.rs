//! CLI argument definitions using clap

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// recap - Incremental running summaries for chunked audio transcripts
#[derive(Parser, Debug)]
#[command(name = "recap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to bind (overrides server.bind)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Fold one transcript chunk into an audio item's running summary
    Ingest {
        /// Audio item identifier
        #[arg(long)]
        audio_id: String,

        /// dialogue or single_speech
        #[arg(long, default_value = "dialogue")]
        type_of_audio: String,

        /// Language code of the original transcript (e.g. en-GB)
        #[arg(long)]
        original_language: String,

        /// Language code of the translated transcript (e.g. fr)
        #[arg(long)]
        translation_language: String,

        /// Original transcript text
        #[arg(long, default_value = "")]
        original_text: String,

        /// Translated transcript text
        #[arg(long, default_value = "")]
        translated_text: String,
    },

    /// Print an audio item's running summary
    Summary {
        /// Audio item identifier
        #[arg(long)]
        audio_id: String,

        /// Language the summary was written in
        #[arg(long)]
        summary_language: String,

        /// Language to print it in
        #[arg(long)]
        translation_language: String,
    },

    /// Show which model would be used for summaries
    Models,

    /// Generate shell completion scripts
    Completions {
        /// Target shell
        shell: Shell,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}
