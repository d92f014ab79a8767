//! External collaborators consumed by the pipeline.
//!
//! Each collaborator sits behind an object-safe trait so acquisition and
//! summarization can be exercised against mocks. Concrete implementations
//! live in the submodules: yt-dlp for caption lookup and audio download,
//! a whisper CLI for speech-to-text, and HTTP inference endpoints for
//! summarization, translation, and speech synthesis.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod inference;
pub mod whisper;
pub mod youtube;

/// Distinguishable provider-level faults.
///
/// Acquisition maps these onto the fixed `ErrorSignal` taxonomy; nothing
/// below the provider boundary is allowed to escape unclassified.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("video unavailable")]
    VideoUnavailable,

    #[error("captions are disabled for this video")]
    CaptionsDisabled,

    #[error("no caption track available")]
    NoTrack,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A single subtitle track advertised by the caption provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    /// BCP-47 style language code as reported by the provider
    pub language_code: String,

    /// Human-readable track name, if any
    pub name: Option<String>,

    /// Fetch URL for the track payload
    pub url: String,

    /// Whether the track was machine-generated rather than manually authored
    pub generated: bool,
}

/// Caption tracks grouped by authorship
#[derive(Debug, Clone, Default)]
pub struct TrackList {
    pub manual: Vec<Track>,
    pub generated: Vec<Track>,
}

/// One timed caption line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionLine {
    pub text: String,

    /// Start time in seconds
    pub start: f64,

    /// Duration in seconds
    pub duration: f64,
}

/// Video metadata surfaced by the `info` subcommand
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: Option<String>,

    /// Duration in seconds
    pub duration: Option<f64>,

    pub description: Option<String>,
}

/// Caption lookup with cross-language fallback
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CaptionProvider: Send + Sync {
    /// List manual and generated tracks for a video
    async fn list_tracks(&self, video_id: &str) -> Result<TrackList, ProviderError>;

    /// Fetch the timed lines of a track verbatim
    async fn fetch_lines(&self, track: &Track) -> Result<Vec<CaptionLine>, ProviderError>;

    /// Fetch the timed lines of a track machine-translated to `target_lang`
    async fn translate_lines(
        &self,
        track: &Track,
        target_lang: &str,
    ) -> Result<Vec<CaptionLine>, ProviderError>;
}

/// Video reference resolution and audio download
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoResolver: Send + Sync {
    /// Extract a video id from a link, if the link is well-formed
    fn resolve(&self, link: &str) -> Option<String>;

    /// Download a single fixed-quality audio stream to `dest`
    async fn download_audio(&self, link: &str, dest: &Path) -> Result<(), ProviderError>;

    /// Fetch title, duration, and description
    async fn metadata(&self, link: &str) -> Result<VideoMetadata, ProviderError>;
}

/// Speech-recognition engine over a local audio file
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Distribution over language codes, computed from a bounded leading window
    async fn detect_language(&self, audio: &Path) -> Result<Vec<(String, f32)>, ProviderError>;

    /// Best-effort transcript of the full audio, single attempt
    async fn transcribe(&self, audio: &Path) -> Result<String, ProviderError>;
}

/// Sequence-to-sequence summarization model
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SummaryModel: Send + Sync {
    /// Summarize one chunk, aiming for at least `target_len` tokens
    async fn summarize(&self, chunk: &str, target_len: usize) -> Result<String, ProviderError>;

    /// Model label used for logging and the `models` subcommand
    fn name(&self) -> &'static str;
}

/// Text translation service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String, ProviderError>;
}

/// Text-to-speech synthesis
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Render `text` as audio at `dest`
    async fn synthesize(&self, text: &str, language: &str, dest: &Path)
        -> Result<(), ProviderError>;
}

/// Join timed caption lines into one transcript string
pub fn join_lines(lines: &[CaptionLine]) -> String {
    lines
        .iter()
        .map(|line| line.text.replace('\n', " "))
        .collect::<Vec<_>>()
        .join(" ")
}
