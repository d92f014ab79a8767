//! Transcript acquisition: the ordered caption/speech fallback chain.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

use crate::providers::{
    join_lines, CaptionProvider, ProviderError, SpeechEngine, Track, VideoResolver,
};
use crate::utils::{fold_language_code, is_english};
use crate::{text, ErrorSignal};

pub mod speech;

pub use speech::SpeechTranscriber;

/// Provenance of an acquired transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceGrade {
    /// Sourced from a subtitle track; well-segmented and punctuated
    Caption,
    /// Produced by speech recognition; noisier and unsegmented
    Speech,
}

/// A transcript acquired for one video reference.
///
/// Immutable after construction; owned by the caller that requested it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub raw_text: String,
    pub source_grade: SourceGrade,
    pub language_code: String,
}

/// Per-request scratch context.
///
/// Each acquisition carries its own temp directory and audio path, so
/// concurrent requests in one process cannot race on a shared scratch file.
/// The directory is removed when the session is dropped.
pub struct Session {
    temp_dir: TempDir,
    audio_path: PathBuf,
}

impl Session {
    pub fn new() -> crate::Result<Self> {
        let temp_dir = TempDir::new().context("Failed to create scratch directory")?;
        let filename = format!("audio_{}.mp3", &Uuid::new_v4().to_string()[..8]);
        let audio_path = temp_dir.path().join(filename);

        Ok(Self {
            temp_dir,
            audio_path,
        })
    }

    /// Scratch path for downloaded audio, unique to this session
    pub fn scratch_audio_path(&self) -> &Path {
        &self.audio_path
    }

    pub fn scratch_dir(&self) -> &Path {
        self.temp_dir.path()
    }
}

/// Orchestrates caption lookup and speech fallback into one ordered chain.
///
/// Tier order: manual captions, generated captions, speech-to-text. A tier is
/// only attempted when the prior tier is definitively unavailable. An
/// unresolvable reference fails immediately, and unknown caption faults do
/// not trigger the slow speech fallback.
pub struct TranscriptAcquisition {
    captions: Box<dyn CaptionProvider>,
    resolver: Arc<dyn VideoResolver>,
    transcriber: SpeechTranscriber,
}

impl TranscriptAcquisition {
    pub fn new(
        captions: Box<dyn CaptionProvider>,
        resolver: Arc<dyn VideoResolver>,
        engine: Box<dyn SpeechEngine>,
    ) -> Self {
        let transcriber = SpeechTranscriber::new(resolver.clone(), engine);
        Self {
            captions,
            resolver,
            transcriber,
        }
    }

    /// Acquire a normalized transcript for a video reference
    pub async fn acquire(
        &self,
        link: &str,
        session: &Session,
    ) -> Result<Transcript, ErrorSignal> {
        let Some(video_id) = self.resolver.resolve(link) else {
            return Err(ErrorSignal::VideoUnavailable);
        };

        let tracks = match self.captions.list_tracks(&video_id).await {
            Ok(tracks) => tracks,
            Err(ProviderError::VideoUnavailable) => return Err(ErrorSignal::VideoUnavailable),
            Err(ProviderError::CaptionsDisabled) | Err(ProviderError::NoTrack) => {
                return self.speech_fallback(link, session).await;
            }
            Err(e) => {
                // Unknown caption faults fail fast instead of masking the
                // problem with a slow speech fallback
                tracing::warn!("Caption lookup failed: {}", e);
                return Err(ErrorSignal::TranscriptionFailed);
            }
        };

        if let Some(track) = select_track(&tracks.manual) {
            tracing::info!(language = %track.language_code, "Using manual caption track");
            return self.caption_transcript(track).await;
        }

        if let Some(track) = select_track(&tracks.generated) {
            tracing::info!(language = %track.language_code, "Using generated caption track");
            return self.caption_transcript(track).await;
        }

        self.speech_fallback(link, session).await
    }

    /// Fetch a caption track, translating to English when needed
    async fn caption_transcript(&self, track: &Track) -> Result<Transcript, ErrorSignal> {
        let fetched = if is_english(&track.language_code) {
            self.captions.fetch_lines(track).await
        } else {
            tracing::info!(from = %track.language_code, "Translating caption track to English");
            self.captions.translate_lines(track, "en").await
        };

        let lines = fetched.map_err(|e| {
            tracing::warn!("Caption retrieval failed: {}", e);
            ErrorSignal::TranscriptionFailed
        })?;

        Ok(Transcript {
            raw_text: text::clean(&join_lines(&lines)),
            source_grade: SourceGrade::Caption,
            language_code: "en".to_string(),
        })
    }

    async fn speech_fallback(
        &self,
        link: &str,
        session: &Session,
    ) -> Result<Transcript, ErrorSignal> {
        tracing::info!("No caption track available, falling back to speech-to-text");
        let speech = self.transcriber.transcribe_remote(link, session).await?;

        Ok(Transcript {
            raw_text: text::clean(&speech.text),
            source_grade: SourceGrade::Speech,
            language_code: speech.language,
        })
    }
}

/// Pick one track from a tier.
///
/// English variants win outright; otherwise the lexicographically smallest
/// folded language code is chosen, so selection does not depend on provider
/// enumeration order.
fn select_track(tracks: &[Track]) -> Option<&Track> {
    tracks
        .iter()
        .min_by_key(|track| {
            let folded = fold_language_code(&track.language_code);
            (!is_english(&track.language_code), folded)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{
        CaptionLine, MockCaptionProvider, MockSpeechEngine, MockVideoResolver, TrackList,
    };

    fn track(lang: &str, generated: bool) -> Track {
        Track {
            language_code: lang.to_string(),
            name: None,
            url: format!("https://captions.example/{}", lang),
            generated,
        }
    }

    fn lines(text: &str) -> Vec<CaptionLine> {
        vec![CaptionLine {
            text: text.to_string(),
            start: 0.0,
            duration: 2.0,
        }]
    }

    fn resolver_ok() -> MockVideoResolver {
        let mut resolver = MockVideoResolver::new();
        resolver
            .expect_resolve()
            .returning(|_| Some("abc123def45".to_string()));
        resolver
    }

    fn idle_engine() -> MockSpeechEngine {
        let mut engine = MockSpeechEngine::new();
        engine.expect_detect_language().times(0);
        engine.expect_transcribe().times(0);
        engine
    }

    #[tokio::test]
    async fn test_manual_track_beats_generated() {
        let mut captions = MockCaptionProvider::new();
        captions.expect_list_tracks().returning(|_| {
            Ok(TrackList {
                manual: vec![track("en", false)],
                generated: vec![track("en", true)],
            })
        });
        captions
            .expect_fetch_lines()
            .withf(|track: &Track| !track.generated)
            .returning(|_| Ok(lines("manual caption words.")));
        captions.expect_translate_lines().times(0);

        let acquisition = TranscriptAcquisition::new(
            Box::new(captions),
            Arc::new(resolver_ok()),
            Box::new(idle_engine()),
        );
        let session = Session::new().unwrap();

        let transcript = acquisition
            .acquire("https://youtu.be/abc123def45", &session)
            .await
            .expect("acquisition should succeed");

        assert_eq!(transcript.source_grade, SourceGrade::Caption);
        assert_eq!(transcript.raw_text, "Manual caption words.");
    }

    #[tokio::test]
    async fn test_non_english_manual_track_is_translated() {
        let mut captions = MockCaptionProvider::new();
        captions.expect_list_tracks().returning(|_| {
            Ok(TrackList {
                manual: vec![track("fr", false)],
                generated: vec![],
            })
        });
        captions.expect_fetch_lines().times(0);
        captions
            .expect_translate_lines()
            .withf(|_, lang: &str| lang == "en")
            .returning(|_, _| Ok(lines("the translated english text.")));

        let acquisition = TranscriptAcquisition::new(
            Box::new(captions),
            Arc::new(resolver_ok()),
            Box::new(idle_engine()),
        );
        let session = Session::new().unwrap();

        let transcript = acquisition
            .acquire("https://youtu.be/abc123def45", &session)
            .await
            .expect("acquisition should succeed");

        assert_eq!(
            transcript.raw_text,
            text::clean("the translated english text.")
        );
        assert_eq!(transcript.language_code, "en");
    }

    #[tokio::test]
    async fn test_unresolvable_link_fails_immediately() {
        let mut resolver = MockVideoResolver::new();
        resolver.expect_resolve().returning(|_| None);
        resolver.expect_download_audio().times(0);

        let mut captions = MockCaptionProvider::new();
        captions.expect_list_tracks().times(0);

        let acquisition = TranscriptAcquisition::new(
            Box::new(captions),
            Arc::new(resolver),
            Box::new(idle_engine()),
        );
        let session = Session::new().unwrap();

        let result = acquisition.acquire("garbage", &session).await;
        assert_eq!(result.unwrap_err(), ErrorSignal::VideoUnavailable);
    }

    #[tokio::test]
    async fn test_unknown_caption_fault_skips_speech_fallback() {
        let mut resolver = resolver_ok();
        resolver.expect_download_audio().times(0);

        let mut captions = MockCaptionProvider::new();
        captions
            .expect_list_tracks()
            .returning(|_| Err(ProviderError::Other(anyhow::anyhow!("rate limited"))));

        let acquisition = TranscriptAcquisition::new(
            Box::new(captions),
            Arc::new(resolver),
            Box::new(idle_engine()),
        );
        let session = Session::new().unwrap();

        let result = acquisition
            .acquire("https://youtu.be/abc123def45", &session)
            .await;
        assert_eq!(result.unwrap_err(), ErrorSignal::TranscriptionFailed);
    }

    #[tokio::test]
    async fn test_no_tracks_falls_back_to_speech() {
        let mut resolver = resolver_ok();
        resolver.expect_download_audio().returning(|_, _| Ok(()));

        let mut captions = MockCaptionProvider::new();
        captions
            .expect_list_tracks()
            .returning(|_| Ok(TrackList::default()));

        let mut engine = MockSpeechEngine::new();
        engine
            .expect_detect_language()
            .returning(|_| Ok(vec![("en".to_string(), 0.95)]));
        engine
            .expect_transcribe()
            .times(1)
            .returning(|_| Ok("spoken transcript words.".to_string()));

        let acquisition = TranscriptAcquisition::new(
            Box::new(captions),
            Arc::new(resolver),
            Box::new(engine),
        );
        let session = Session::new().unwrap();

        let transcript = acquisition
            .acquire("https://youtu.be/abc123def45", &session)
            .await
            .expect("speech fallback should succeed");

        assert_eq!(transcript.source_grade, SourceGrade::Speech);
        assert_eq!(transcript.raw_text, "Spoken transcript words.");
    }

    #[tokio::test]
    async fn test_captions_disabled_falls_back_to_speech() {
        let mut resolver = resolver_ok();
        resolver.expect_download_audio().returning(|_, _| Ok(()));

        let mut captions = MockCaptionProvider::new();
        captions
            .expect_list_tracks()
            .returning(|_| Err(ProviderError::CaptionsDisabled));

        let mut engine = MockSpeechEngine::new();
        engine
            .expect_detect_language()
            .returning(|_| Ok(vec![("en".to_string(), 0.95)]));
        engine
            .expect_transcribe()
            .returning(|_| Ok("fallback speech.".to_string()));

        let acquisition = TranscriptAcquisition::new(
            Box::new(captions),
            Arc::new(resolver),
            Box::new(engine),
        );
        let session = Session::new().unwrap();

        let transcript = acquisition
            .acquire("https://youtu.be/abc123def45", &session)
            .await
            .expect("speech fallback should succeed");
        assert_eq!(transcript.source_grade, SourceGrade::Speech);
    }

    #[test]
    fn test_select_track_prefers_english_variants() {
        let tracks = vec![track("fr", false), track("en-GB", false), track("de", false)];
        let selected = select_track(&tracks).unwrap();
        assert_eq!(selected.language_code, "en-GB");
    }

    #[test]
    fn test_select_track_tie_breaks_alphabetically() {
        let tracks = vec![track("fr", false), track("de", false)];
        let selected = select_track(&tracks).unwrap();
        assert_eq!(selected.language_code, "de");
    }

    #[test]
    fn test_select_track_empty() {
        assert!(select_track(&[]).is_none());
    }

    #[test]
    fn test_sessions_use_distinct_scratch_paths() {
        let a = Session::new().unwrap();
        let b = Session::new().unwrap();
        assert_ne!(a.scratch_audio_path(), b.scratch_audio_path());
        assert!(a.scratch_audio_path().starts_with(a.scratch_dir()));
    }
}
