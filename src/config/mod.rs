use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Inference endpoint configuration
    pub inference: InferenceConfig,

    /// External tool paths
    pub tools: ToolsConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Endpoint for the fast, shorter-focus summarization model
    pub fast_model_endpoint: String,

    /// Endpoint for the news-style, longer-context summarization model
    pub news_model_endpoint: String,

    /// Endpoint for summary translation
    pub translation_endpoint: String,

    /// Endpoint for text-to-speech synthesis
    pub tts_endpoint: String,

    /// Optional bearer token sent to all inference endpoints
    pub api_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to the yt-dlp binary
    pub yt_dlp_path: String,

    /// Path to the whisper CLI binary
    pub whisper_path: String,

    /// Path to the whisper model file
    pub whisper_model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Keep downloaded audio after transcription
    pub keep_audio: bool,

    /// Default output format
    pub default_output_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inference: InferenceConfig {
                fast_model_endpoint:
                    "https://api-inference.huggingface.co/models/t5-base".to_string(),
                news_model_endpoint:
                    "https://api-inference.huggingface.co/models/sshleifer/distilbart-cnn-12-6"
                        .to_string(),
                translation_endpoint:
                    "https://api-inference.huggingface.co/models/facebook/nllb-200-distilled-600M"
                        .to_string(),
                tts_endpoint:
                    "https://api-inference.huggingface.co/models/espnet/kan-bayashi_ljspeech_vits"
                        .to_string(),
                api_token: None,
            },
            tools: ToolsConfig {
                yt_dlp_path: "yt-dlp".to_string(),
                whisper_path: "whisper-cli".to_string(),
                whisper_model: "models/ggml-base.bin".to_string(),
            },
            app: AppConfig {
                keep_audio: false,
                default_output_format: "text".to_string(),
            },
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = fs_err::read_to_string(&config_path)
                .context("Failed to read config file")?;

            let config: Config = serde_yaml::from_str(&content)
                .context("Failed to parse config file")?;

            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save().await?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(&config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("vidsum").join("config.yaml"))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        for (name, endpoint) in [
            ("fast model", &self.inference.fast_model_endpoint),
            ("news model", &self.inference.news_model_endpoint),
            ("translation", &self.inference.translation_endpoint),
            ("text-to-speech", &self.inference.tts_endpoint),
        ] {
            Url::parse(endpoint)
                .with_context(|| format!("Invalid {} endpoint: {}", name, endpoint))?;
        }

        if self.tools.yt_dlp_path.is_empty() || self.tools.whisper_path.is_empty() {
            anyhow::bail!("Tool paths must not be empty");
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Fast model: {}", self.inference.fast_model_endpoint);
        println!("  News model: {}", self.inference.news_model_endpoint);
        println!("  Translation: {}", self.inference.translation_endpoint);
        println!("  Text-to-speech: {}", self.inference.tts_endpoint);
        println!("  yt-dlp: {}", self.tools.yt_dlp_path);
        println!("  whisper: {} ({})", self.tools.whisper_path, self.tools.whisper_model);
        println!("  Keep Audio: {}", self.app.keep_audio);
        println!("  Default Format: {}", self.app.default_output_format);
    }
}
