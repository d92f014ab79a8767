//! Vidsum - A Rust CLI tool for summarizing videos and audio
//! 
//! This library acquires a transcript for a video through an ordered fallback
//! chain (manual captions, auto-generated captions, whisper speech-to-text)
//! and condenses it with a chunked two-stage summarization pipeline.

pub mod acquire;
pub mod cli;
pub mod config;
pub mod output;
pub mod providers;
pub mod summarize;
pub mod text;
pub mod utils;

pub use acquire::{SourceGrade, Transcript, TranscriptAcquisition};
pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use summarize::{ModelChoice, SummarizationPipeline, SummaryResult};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Terminal, user-facing failure signals.
///
/// Every stage maps its own external faults onto exactly one of these; the
/// display strings are fixed and double as the user-visible output text.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSignal {
    #[error("Video not found, enter a valid video link.")]
    VideoUnavailable,

    #[error("An error occurred with the given link.")]
    LinkInvalid,

    #[error("An error occurred during transcription.")]
    TranscriptionFailed,

    #[error("An error occurred during translation.")]
    TranslationFailed,

    #[error("An error occurred while fetching video data.")]
    DataFetchFailed,

    #[error("An error occurred transcribing the audio file.")]
    AudioTranscriptionFailed,

    #[error("An error occurred while generating the audible summary.")]
    SpeechSynthesisFailed,

    #[error("An error occurred during summarization.")]
    SummarizationFailed,

    #[error("Only English audio is supported for transcription.")]
    UnsupportedLanguage,
}

impl ErrorSignal {
    /// The nine fixed display strings, in declaration order.
    ///
    /// `text::clean` treats any input equal to one of these as a poison value
    /// and returns it unchanged instead of normalizing it.
    pub const MESSAGES: [&'static str; 9] = [
        "Video not found, enter a valid video link.",
        "An error occurred with the given link.",
        "An error occurred during transcription.",
        "An error occurred during translation.",
        "An error occurred while fetching video data.",
        "An error occurred transcribing the audio file.",
        "An error occurred while generating the audible summary.",
        "An error occurred during summarization.",
        "Only English audio is supported for transcription.",
    ];

    /// Whether `text` exactly equals one of the fixed display strings.
    pub fn is_poison(text: &str) -> bool {
        Self::MESSAGES.contains(&text)
    }
}
