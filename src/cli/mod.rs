use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "vidsum",
    about = "Vidsum - Summarize videos via captions, whisper speech-to-text, and transformer summarization",
    version,
    long_about = "A CLI tool that acquires a transcript for a video through an ordered fallback chain (manual captions, auto-generated captions, speech-to-text) and condenses it into a short natural-language summary."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize a video from a link
    Summarize {
        /// Video link to summarize
        #[arg(value_name = "URL")]
        url: String,

        /// Summarization model: 1 = fast, 2 = news-style; any other value runs both
        #[arg(short, long, default_value = "1")]
        model: u8,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Translate the summary to this language code before output
        #[arg(short, long, value_name = "LANG")]
        translate: Option<String>,

        /// Also synthesize the summary as an audio file
        #[arg(long)]
        speak: bool,
    },

    /// Transcribe a local audio file
    TranscribeAudio {
        /// Path to the audio file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show title, duration, and description for a video
    Info {
        /// Video link to inspect
        #[arg(value_name = "URL")]
        url: String,
    },

    /// Show or edit configuration
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },

    /// List available summarization models
    Models,
}

#[derive(ValueEnum, Clone, Debug)]
pub enum OutputFormat {
    /// Plain text
    Text,
    /// JSON with transcript provenance
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
