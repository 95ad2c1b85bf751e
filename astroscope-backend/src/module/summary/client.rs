//! Language model client used for summaries
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint. What the model
//! does with the prompt is opaque to us; we only shape the request and read back text.
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use thiserror::Error;

use super::prompt::Prompt;
use super::types::SummaryKind;
use crate::config::SummarizerConfig;

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("summarizer request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("summarizer returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("summarizer response has no message content")]
    EmptyResponse,

    #[error("malformed {kind} summary: {message}")]
    MalformedOutput { kind: SummaryKind, message: String },
}

/// Turns a rendered prompt into model text
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn complete(&self, prompt: &Prompt) -> Result<String, SummaryError>;
}

pub struct LlmSummarizer {
    http: Client,
    config: SummarizerConfig,
}

impl LlmSummarizer {
    pub fn new(config: SummarizerConfig) -> Result<Self, SummaryError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn request_body(&self, prompt: &Prompt) -> Value {
        json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": prompt.system},
                {"role": "user", "content": prompt.user},
            ],
            "temperature": self.config.temperature,
            "response_format": {"type": "json_object"},
        })
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn complete(&self, prompt: &Prompt) -> Result<String, SummaryError> {
        let url = self.chat_url();
        tracing::debug!(target: "summarizer", kind = %prompt.kind, "POST {}", url);

        let mut req = self.http.post(&url).json(&self.request_body(prompt));
        if let Some(key) = &self.config.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::error!(target: "summarizer", %status, body = %body, "Chat completions error");
            return Err(SummaryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let value: Value = resp.json().await?;
        extract_message_content(&value).ok_or(SummaryError::EmptyResponse)
    }
}

/// `choices[0].message.content`
fn extract_message_content(value: &Value) -> Option<String> {
    value
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
