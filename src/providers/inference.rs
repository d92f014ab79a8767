use anyhow::{anyhow, Context};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::path::Path;

use super::{ProviderError, SpeechSynthesizer, SummaryModel, Translator};

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    summary_text: String,
}

#[derive(Debug, Deserialize)]
struct TranslationResponse {
    translation_text: String,
}

/// Sequence-to-sequence summarization model behind an HTTP inference endpoint
pub struct HttpSummaryModel {
    client: Client,
    endpoint: String,
    token: Option<String>,
    name: &'static str,
}

impl HttpSummaryModel {
    pub fn new(endpoint: &str, token: Option<&str>, name: &'static str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
            token: token.map(String::from),
            name,
        }
    }
}

fn authorize(request: reqwest::RequestBuilder, token: &Option<String>) -> reqwest::RequestBuilder {
    match token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

#[async_trait]
impl SummaryModel for HttpSummaryModel {
    async fn summarize(&self, chunk: &str, target_len: usize) -> Result<String, ProviderError> {
        tracing::debug!(model = self.name, chunk_len = chunk.len(), "Summarizing chunk");

        let request = self.client.post(&self.endpoint).json(&json!({
            "inputs": chunk,
            "parameters": {
                "min_length": target_len,
                "do_sample": false,
            },
        }));

        let response = authorize(request, &self.token)
            .send()
            .await
            .context("Failed to reach summarization endpoint")?;

        if !response.status().is_success() {
            return Err(anyhow!("Summarization failed: HTTP {}", response.status()).into());
        }

        let summaries: Vec<SummaryResponse> = response
            .json()
            .await
            .context("Failed to parse summarization response")?;

        summaries
            .into_iter()
            .next()
            .map(|s| s.summary_text)
            .ok_or_else(|| anyhow!("Summarization endpoint returned no output").into())
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// Translation service behind an HTTP inference endpoint
pub struct HttpTranslator {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpTranslator {
    pub fn new(endpoint: &str, token: Option<&str>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
            token: token.map(String::from),
        }
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String, ProviderError> {
        let request = self.client.post(&self.endpoint).json(&json!({
            "inputs": text,
            "parameters": { "target_lang": target_lang },
        }));

        let response = authorize(request, &self.token)
            .send()
            .await
            .context("Failed to reach translation endpoint")?;

        if !response.status().is_success() {
            return Err(anyhow!("Translation failed: HTTP {}", response.status()).into());
        }

        let translations: Vec<TranslationResponse> = response
            .json()
            .await
            .context("Failed to parse translation response")?;

        translations
            .into_iter()
            .next()
            .map(|t| t.translation_text)
            .ok_or_else(|| anyhow!("Translation endpoint returned no output").into())
    }
}

/// Text-to-speech synthesis behind an HTTP inference endpoint
pub struct HttpSynthesizer {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpSynthesizer {
    pub fn new(endpoint: &str, token: Option<&str>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
            token: token.map(String::from),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for HttpSynthesizer {
    async fn synthesize(
        &self,
        text: &str,
        language: &str,
        dest: &Path,
    ) -> Result<(), ProviderError> {
        let request = self.client.post(&self.endpoint).json(&json!({
            "inputs": text,
            "parameters": { "language": language },
        }));

        let response = authorize(request, &self.token)
            .send()
            .await
            .context("Failed to reach speech synthesis endpoint")?;

        if !response.status().is_success() {
            return Err(anyhow!("Speech synthesis failed: HTTP {}", response.status()).into());
        }

        use futures_util::StreamExt;
        use std::io::Write;

        let mut file = fs_err::File::create(dest).map_err(anyhow::Error::from)?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.context("Failed to read synthesized audio")?;
            file.write_all(&chunk).map_err(anyhow::Error::from)?;
        }

        Ok(())
    }
}
