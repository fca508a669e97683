//! Messages-API client for the hosted LLM.
//!
//! One synchronous call shape for both call sites (extraction and chat):
//! a single user-role message, deterministic decoding, a per-call output
//! cap, free text back. No streaming, no tool use. The blocking client is
//! run on the blocking thread pool by the handlers that use it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{self, Settings};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("cannot reach the model endpoint at {0}")]
    Connection(String),

    #[error("model endpoint returned status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("malformed model response: {0}")]
    MalformedResponse(String),
}

/// LLM call abstraction (allows mocking).
pub trait LlmClient {
    /// Send `prompt` as the single user message and return the reply text.
    fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, LlmError>;
}

/// HTTP client for an Anthropic-style Messages endpoint.
pub struct AnthropicClient {
    api_url: String,
    api_key: String,
    model: String,
    client: reqwest::blocking::Client,
}

impl AnthropicClient {
    /// Create a client for the given endpoint. `timeout_secs = None`
    /// disables the HTTP client's default request timeout, preserving the
    /// call-blocks-until-done contract.
    pub fn new(api_url: &str, api_key: &str, model: &str, timeout_secs: Option<u64>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout_secs.map(std::time::Duration::from_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            &settings.api_url,
            &settings.api_key,
            &settings.model,
            settings.llm_timeout_secs,
        )
    }
}

/// Request body for the Messages endpoint.
#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<MessageBody<'a>>,
}

#[derive(Serialize)]
struct MessageBody<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response body from the Messages endpoint.
#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

impl LlmClient for AnthropicClient {
    fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, LlmError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens,
            temperature: config::LLM_TEMPERATURE,
            messages: vec![MessageBody {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", config::ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    LlmError::Connection(self.api_url.clone())
                } else if e.is_timeout() {
                    LlmError::HttpClient("request timed out".to_string())
                } else {
                    LlmError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(LlmError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MessagesResponse = response
            .json()
            .map_err(|e| LlmError::MalformedResponse(e.to_string()))?;

        let text: String = parsed
            .content
            .iter()
            .filter(|block| block.kind == "text")
            .map(|block| block.text.as_str())
            .collect();

        if text.is_empty() {
            return Err(LlmError::MalformedResponse(
                "response contained no text content".to_string(),
            ));
        }

        Ok(text)
    }
}

/// Mock LLM client for testing — returns a configurable response or a
/// configurable failure.
pub struct MockLlmClient {
    response: Option<String>,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: Some(response.to_string()),
        }
    }

    /// A client whose every call fails as a connection error.
    pub fn failing() -> Self {
        Self { response: None }
    }
}

impl LlmClient for MockLlmClient {
    fn complete(&self, _prompt: &str, _max_tokens: u32) -> Result<String, LlmError> {
        match &self.response {
            Some(text) => Ok(text.clone()),
            None => Err(LlmError::Connection("mock endpoint".to_string())),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
