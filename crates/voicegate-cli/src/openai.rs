//! Minimal OpenAI HTTP client for the console utility.
//!
//! Covers exactly the two endpoints `voicegate ask` needs: audio
//! transcription (multipart upload) and chat completions.

use anyhow::{bail, Context};
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;
use voicegate_core::SecretString;

/// Default OpenAI API base URL.
const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Transcription model for audio uploads.
const TRANSCRIBE_MODEL: &str = "whisper-1";

/// OpenAI API client.
pub struct OpenAIClient {
    /// HTTP client.
    client: Client,

    /// API key.
    api_key: SecretString,

    /// API base URL.
    api_base: String,
}

#[derive(Deserialize)]
struct Transcription {
    text: String,
}

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl OpenAIClient {
    /// Create a new client with an API key.
    pub fn new(api_key: SecretString) -> anyhow::Result<Self> {
        if api_key.is_empty() {
            bail!("API key is required");
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(300))
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            api_base: DEFAULT_API_BASE.to_string(),
        })
    }

    /// Override the API base URL (for compatible gateways).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into();
        self
    }

    /// Upload an audio file for transcription and return the transcript.
    pub async fn transcribe(&self, path: &Path) -> anyhow::Result<String> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio".to_string());

        let form = reqwest::multipart::Form::new()
            .part("file", reqwest::multipart::Part::bytes(bytes).file_name(file_name))
            .text("model", TRANSCRIBE_MODEL);

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.api_base))
            .bearer_auth(self.api_key.expose_secret())
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("transcription request failed: {}", response.status());
        }

        let transcription: Transcription = response.json().await?;
        Ok(transcription.text)
    }

    /// Send one user message to the chat model and return the answer.
    pub async fn chat(&self, question: &str, model: &str) -> anyhow::Result<String> {
        let body = serde_json::json!({
            "model": model,
            "messages": [{"role": "user", "content": question}],
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("chat request failed: {}", response.status());
        }

        let completion: ChatCompletion = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .context("no choices in response")
    }
}
