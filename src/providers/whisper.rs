use anyhow::anyhow;
use async_trait::async_trait;
use regex::Regex;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use super::{ProviderError, SpeechEngine};

/// Leading window fed to language detection, in milliseconds.
///
/// Mirrors the fixed input width of the detection model: longer audio is
/// truncated, shorter audio is padded by the engine itself.
const DETECT_WINDOW_MS: u32 = 30_000;

/// Speech-recognition engine backed by a whisper.cpp style CLI
pub struct WhisperCli {
    binary: String,
    model_path: String,
}

impl WhisperCli {
    pub fn new(binary: &str, model_path: &str) -> Self {
        Self {
            binary: binary.to_string(),
            model_path: model_path.to_string(),
        }
    }

    /// Check if the whisper binary is available
    pub async fn check_availability(&self) -> bool {
        Command::new(&self.binary)
            .arg("--help")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    async fn run(&self, args: &[&str]) -> Result<std::process::Output, ProviderError> {
        let output = Command::new(&self.binary)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ProviderError::Other(e.into()))?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("whisper failed: {}", error).into());
        }

        Ok(output)
    }

    /// Parse "auto-detected language: en (p = 0.973215)" lines
    fn parse_detection(output: &str) -> Vec<(String, f32)> {
        let Ok(re) = Regex::new(r"language:\s*([a-z]{2,3})\s*\(p\s*=\s*([0-9.]+)\)") else {
            return Vec::new();
        };

        re.captures_iter(output)
            .filter_map(|captures| {
                let code = captures.get(1)?.as_str().to_string();
                let prob = captures.get(2)?.as_str().parse().ok()?;
                Some((code, prob))
            })
            .collect()
    }
}

#[async_trait]
impl SpeechEngine for WhisperCli {
    async fn detect_language(&self, audio: &Path) -> Result<Vec<(String, f32)>, ProviderError> {
        let duration = DETECT_WINDOW_MS.to_string();
        let audio = audio.to_string_lossy();

        let output = self
            .run(&[
                "-m", &self.model_path,
                "-f", &audio,
                "--detect-language",
                "-d", &duration,
            ])
            .await?;

        let combined = format!(
            "{}{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );

        Ok(Self::parse_detection(&combined))
    }

    async fn transcribe(&self, audio: &Path) -> Result<String, ProviderError> {
        tracing::debug!("Transcribing audio file: {}", audio.display());
        let audio = audio.to_string_lossy();

        let output = self
            .run(&[
                "-m", &self.model_path,
                "-f", &audio,
                "--no-timestamps",
                "--no-prints",
            ])
            .await?;

        let transcript = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if transcript.is_empty() {
            return Err(anyhow!("whisper produced an empty transcript").into());
        }

        Ok(transcript)
    }
}
