//! Client for an OpenAI-compatible chat completions endpoint.
//!
//! Every call to the language model goes through [`CompletionClient`], so the
//! handlers can be exercised with a canned client.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("no API key configured")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {kind}")]
    Api { status: u16, kind: String },

    #[error("completion returned empty content")]
    EmptyContent,

    #[error("completion timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Sends one user message and returns the text of the first choice.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;

    fn is_configured(&self) -> bool;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

// Only the error type is kept; provider messages may echo parts of the key.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(rename = "type")]
    kind: Option<String>,
    code: Option<String>,
}

#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiClient {
    pub fn new(config: &Config) -> Result<Self, CompletionError> {
        let client = Client::builder().timeout(config.ai_timeout()).build()?;
        Ok(Self {
            client,
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            api_key: config.openai_api_key.clone(),
            model: config.openai_model.clone(),
        })
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let api_key = self.api_key.as_deref().ok_or(CompletionError::MissingApiKey)?;

        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let kind = serde_json::from_str::<ApiErrorEnvelope>(&text)
                .ok()
                .and_then(|e| e.error.code.or(e.error.kind))
                .unwrap_or_else(|| "unknown".to_string());
            warn!(status = status.as_u16(), kind = %kind, "Completion API returned an error");
            return Err(CompletionError::Api {
                status: status.as_u16(),
                kind,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(CompletionError::EmptyContent)?;

        debug!(model = %self.model, reply_length = content.len(), "Completion call succeeded");
        Ok(content)
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}
