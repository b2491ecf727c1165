//! Thin client for the `OpenAI` chat completion and transcription endpoints.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

use crate::error::AiError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const TRANSCRIPTION_MODEL: &str = "whisper-1";
const TRANSCRIPTION_LANGUAGE: &str = "ru";

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

impl OpenAiClient {
    /// # Errors
    ///
    /// Returns [`AiError::Http`] if the underlying `reqwest::Client` cannot be
    /// constructed.
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, AiError> {
        Self::with_base_url(api_key, model, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client against a custom API root (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`AiError::Http`] if the underlying `reqwest::Client` cannot be
    /// constructed.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, AiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .user_agent("cobalt/0.1 (service-discovery)")
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            model: model.to_owned(),
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Runs one JSON-mode chat completion and returns the raw message text.
    ///
    /// # Errors
    ///
    /// - [`AiError::Http`] on network failure.
    /// - [`AiError::Status`] on a non-2xx response.
    /// - [`AiError::Deserialize`] if the envelope does not parse.
    /// - [`AiError::EmptyCompletion`] if no choice carries content.
    pub async fn chat_json(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, AiError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            max_tokens,
            temperature,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        let body = Self::success_body(response).await?;

        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| AiError::Deserialize {
                context: "chat completion".to_string(),
                source: e,
            })?;

        parsed
            .choices
            .into_iter()
            .find_map(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or(AiError::EmptyCompletion)
    }

    /// Transcribes Russian speech with Whisper.
    ///
    /// # Errors
    ///
    /// Same classes as [`OpenAiClient::chat_json`], minus `EmptyCompletion`.
    pub async fn transcribe(&self, audio: Vec<u8>, file_name: &str) -> Result<String, AiError> {
        let form = Form::new()
            .text("model", TRANSCRIPTION_MODEL)
            .text("language", TRANSCRIPTION_LANGUAGE)
            .part("file", Part::bytes(audio).file_name(file_name.to_owned()));

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;
        let body = Self::success_body(response).await?;

        let parsed: TranscriptionResponse =
            serde_json::from_str(&body).map_err(|e| AiError::Deserialize {
                context: "transcription".to_string(),
                source: e,
            })?;
        Ok(parsed.text)
    }

    /// Returns the body text of a 2xx response, or [`AiError::Status`] with the
    /// provider's `error.message` when there is one.
    async fn success_body(response: Response) -> Result<String, AiError> {
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            return Ok(body);
        }
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| {
                v.pointer("/error/message")
                    .and_then(serde_json::Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());
        Err(AiError::Status {
            status: status.as_u16(),
            message,
        })
    }
}
