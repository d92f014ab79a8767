use anyhow::{anyhow, Context};
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use serde_json::Value;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use super::{CaptionLine, CaptionProvider, ProviderError, Track, TrackList, VideoMetadata, VideoResolver};

/// Caption and audio provider backed by yt-dlp
pub struct YtDlpClient {
    yt_dlp_path: String,
    client: reqwest::Client,
}

impl YtDlpClient {
    pub fn new() -> Self {
        Self::with_path("yt-dlp")
    }

    pub fn with_path(path: &str) -> Self {
        Self {
            yt_dlp_path: path.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Check if yt-dlp is available
    pub async fn check_availability(&self) -> bool {
        Command::new(&self.yt_dlp_path)
            .arg("--version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// Get video information using yt-dlp
    async fn video_info(&self, reference: &str) -> Result<Value, ProviderError> {
        tracing::debug!("Extracting video info for: {}", reference);

        let output = Command::new(&self.yt_dlp_path)
            .args(["--dump-json", "--no-playlist", reference])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ProviderError::Other(e.into()))?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            if error.contains("Video unavailable") || error.contains("not a valid URL") {
                return Err(ProviderError::VideoUnavailable);
            }
            return Err(anyhow!("yt-dlp failed: {}", error).into());
        }

        let json_str = String::from_utf8(output.stdout).map_err(anyhow::Error::from)?;
        let info: Value = serde_json::from_str(&json_str).map_err(anyhow::Error::from)?;

        Ok(info)
    }

    /// Collect tracks from a yt-dlp subtitle map, one per language code
    fn collect_tracks(map: Option<&Value>, generated: bool) -> Vec<Track> {
        let Some(entries) = map.and_then(|v| v.as_object()) else {
            return Vec::new();
        };

        let mut tracks = Vec::new();
        for (language_code, formats) in entries {
            // Prefer the json3 rendition, fall back to the first listed
            let format = formats
                .as_array()
                .and_then(|list| {
                    list.iter()
                        .find(|f| f["ext"].as_str() == Some("json3"))
                        .or_else(|| list.first())
                });

            if let Some(url) = format.and_then(|f| f["url"].as_str()) {
                tracks.push(Track {
                    language_code: language_code.clone(),
                    name: format.and_then(|f| f["name"].as_str()).map(String::from),
                    url: url.to_string(),
                    generated,
                });
            }
        }

        tracks
    }

    /// Fetch a timed-text payload and flatten it into caption lines
    async fn fetch_timed_text(&self, url: &str) -> Result<Vec<CaptionLine>, ProviderError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to fetch caption track")?;

        if !response.status().is_success() {
            return Err(anyhow!("Caption fetch failed: HTTP {}", response.status()).into());
        }

        let payload: Value = response
            .json()
            .await
            .context("Failed to parse caption payload")?;

        let mut lines = Vec::new();
        for event in payload["events"].as_array().into_iter().flatten() {
            let text: String = event["segs"]
                .as_array()
                .into_iter()
                .flatten()
                .filter_map(|seg| seg["utf8"].as_str())
                .collect();

            if text.trim().is_empty() {
                continue;
            }

            lines.push(CaptionLine {
                text,
                start: event["tStartMs"].as_f64().unwrap_or(0.0) / 1000.0,
                duration: event["dDurationMs"].as_f64().unwrap_or(0.0) / 1000.0,
            });
        }

        Ok(lines)
    }
}

#[async_trait]
impl CaptionProvider for YtDlpClient {
    async fn list_tracks(&self, video_id: &str) -> Result<TrackList, ProviderError> {
        let info = self.video_info(video_id).await?;

        Ok(TrackList {
            manual: Self::collect_tracks(info.get("subtitles"), false),
            generated: Self::collect_tracks(info.get("automatic_captions"), true),
        })
    }

    async fn fetch_lines(&self, track: &Track) -> Result<Vec<CaptionLine>, ProviderError> {
        self.fetch_timed_text(&track.url).await
    }

    async fn translate_lines(
        &self,
        track: &Track,
        target_lang: &str,
    ) -> Result<Vec<CaptionLine>, ProviderError> {
        // The timed-text endpoint translates server-side via the tlang parameter
        let separator = if track.url.contains('?') { '&' } else { '?' };
        let url = format!("{}{}tlang={}", track.url, separator, target_lang);
        self.fetch_timed_text(&url).await
    }
}

#[async_trait]
impl VideoResolver for YtDlpClient {
    fn resolve(&self, link: &str) -> Option<String> {
        let re = Regex::new(r"(?:v=|youtu\.be/|embed/|shorts/|/v/)([0-9A-Za-z_-]{11})").ok()?;
        re.captures(link)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().to_string())
    }

    async fn download_audio(&self, link: &str, dest: &Path) -> Result<(), ProviderError> {
        tracing::debug!("Downloading audio for: {}", link);

        let progress = ProgressBar::new_spinner();
        progress.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap(),
        );
        progress.set_message("Downloading audio with yt-dlp...");

        let output = Command::new(&self.yt_dlp_path)
            .args([
                // Output to the session scratch path
                "--output", &dest.to_string_lossy(),
                // Extract audio in the most efficient format for transcription
                "--extract-audio",
                "--audio-format", "mp3",
                "--audio-quality", "9",
                // Prioritize smaller/faster formats
                "--format", "worstaudio[acodec^=mp4a]/worstaudio[ext=m4a]/worstaudio[ext=mp3]/worstaudio",
                "--no-playlist",
                "--concurrent-fragments", "4",
                "--newline",
                link,
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ProviderError::Other(e.into()))?;

        if !output.status.success() {
            progress.finish_and_clear();
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("Failed to download audio: {}", error).into());
        }

        progress.finish_with_message("Download complete");

        Ok(())
    }

    async fn metadata(&self, link: &str) -> Result<VideoMetadata, ProviderError> {
        let info = self.video_info(link).await?;

        Ok(VideoMetadata {
            title: info["title"].as_str().map(String::from),
            duration: info["duration"].as_f64(),
            description: info["description"].as_str().map(String::from),
        })
    }
}

impl Default for YtDlpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_watch_url() {
        let client = YtDlpClient::new();
        assert_eq!(
            client.resolve("https://www.youtube.com/watch?v=MrF0mWZQO6o"),
            Some("MrF0mWZQO6o".to_string())
        );
    }

    #[test]
    fn test_resolve_short_url() {
        let client = YtDlpClient::new();
        assert_eq!(
            client.resolve("https://youtu.be/tR1ECf4sEpw"),
            Some("tR1ECf4sEpw".to_string())
        );
    }

    #[test]
    fn test_resolve_rejects_garbage() {
        let client = YtDlpClient::new();
        assert_eq!(client.resolve("not a link at all"), None);
    }

    #[test]
    fn test_collect_tracks_prefers_json3() {
        let map = serde_json::json!({
            "en": [
                {"ext": "vtt", "url": "https://example.com/vtt"},
                {"ext": "json3", "url": "https://example.com/json3"},
            ],
        });
        let tracks = YtDlpClient::collect_tracks(Some(&map), false);
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].url, "https://example.com/json3");
        assert!(!tracks[0].generated);
    }

    #[test]
    fn test_collect_tracks_empty_map() {
        assert!(YtDlpClient::collect_tracks(None, true).is_empty());
    }
}
