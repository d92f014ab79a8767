use std::path::Path;
use std::sync::Arc;

use super::Session;
use crate::providers::{ProviderError, SpeechEngine, VideoResolver};
use crate::ErrorSignal;

/// Transcript text produced by the speech engine
#[derive(Debug, Clone)]
pub struct SpeechText {
    pub text: String,

    /// Dominant detected language code, if detection succeeded
    pub language: String,
}

/// Speech-to-text over downloaded or user-supplied audio.
///
/// Used as the last tier of the acquisition fallback chain and directly by
/// the `transcribe-audio` subcommand.
pub struct SpeechTranscriber {
    resolver: Arc<dyn VideoResolver>,
    engine: Box<dyn SpeechEngine>,
}

impl SpeechTranscriber {
    pub fn new(resolver: Arc<dyn VideoResolver>, engine: Box<dyn SpeechEngine>) -> Self {
        Self { resolver, engine }
    }

    /// Download the audio stream to the session scratch path and transcribe it
    pub async fn transcribe_remote(
        &self,
        link: &str,
        session: &Session,
    ) -> Result<SpeechText, ErrorSignal> {
        let dest = session.scratch_audio_path();

        self.resolver
            .download_audio(link, dest)
            .await
            .map_err(|e| {
                tracing::warn!("Audio download failed: {}", e);
                ErrorSignal::LinkInvalid
            })?;

        self.transcribe_file(dest)
            .await
            .map_err(|e| {
                tracing::warn!("Speech transcription failed: {}", e);
                ErrorSignal::TranscriptionFailed
            })
    }

    /// Transcribe a local audio file, single inference attempt, no retry.
    ///
    /// Language detection runs first over a bounded leading window. The
    /// result currently feeds logging only; transcription always proceeds
    /// on the full audio.
    pub async fn transcribe_file(&self, audio: &Path) -> Result<SpeechText, ProviderError> {
        let language = match self.engine.detect_language(audio).await {
            Ok(distribution) => {
                let dominant = distribution
                    .iter()
                    .max_by(|a, b| a.1.total_cmp(&b.1))
                    .cloned();
                if let Some((code, prob)) = &dominant {
                    tracing::debug!(language = %code, probability = prob, "Detected spoken language");
                }
                dominant.map(|(code, _)| code)
            }
            Err(e) => {
                // Detection is observability only; a failure never blocks transcription
                tracing::debug!("Language detection failed: {}", e);
                None
            }
        };

        let text = self.engine.transcribe(audio).await?;

        Ok(SpeechText {
            text,
            language: language.unwrap_or_else(|| "en".to_string()),
        })
    }
}
