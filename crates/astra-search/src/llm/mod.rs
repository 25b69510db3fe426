//! Completion service seam
//!
//! A [`CompletionProvider`] turns one prompt into free text plus the web sources
//! the service reports as grounding. [`GeminiProvider`] talks to the Google
//! Generative Language API.

pub mod gemini;

pub use gemini::GeminiProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::CompletionConfig;
use crate::types::WebSource;

/// One outbound call to the completion service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    /// Sent as a system-level directive; `None` sends nothing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<String>,
    /// Let the service run its own web search tool
    pub web_search: bool,
}

/// Validated reply: the text is always present, citations may be empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Completion {
    pub text: String,
    pub citations: Vec<WebSource>,
}

/// Sampling parameters forwarded with every request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub max_tokens: usize,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: usize,
}

impl From<&CompletionConfig> for GenerationConfig {
    fn from(config: &CompletionConfig) -> Self {
        Self {
            max_tokens: config.max_output_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
            top_k: config.top_k,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub name: String,
    pub model: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("no API key configured (set completion.api_key or the API_KEY environment variable)")]
    MissingApiKey,

    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("completion service error ({status}): {body}")]
    Service { status: u16, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("completion service returned no text")]
    EmptyResponse,
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Invoke the service exactly once
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, CompletionError>;

    fn info(&self) -> ProviderInfo;
}
