//! Generation transport trait and wire-independent request/response types

use crate::config::GenerationSettings;
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

lazy_static! {
    static ref RATE_LIMIT_PHRASE: Regex =
        Regex::new(r"(?i)quota|rate[ _-]?limit|resource[ _]exhausted|too many requests").unwrap();
}

/// Single-turn text generation against a remote endpoint.
///
/// Implementations perform exactly one request with the given API key and
/// never retry; rotation across keys is the caller's concern.
#[async_trait]
pub trait GenerationTransport: Send + Sync {
    async fn generate(
        &self,
        api_key: &str,
        request: &GenerationRequest,
    ) -> std::result::Result<Generation, TransportError>;
}

/// Prompt plus sampling and safety parameters for one request
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
    pub safety_threshold: String,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, settings: &GenerationSettings) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: settings.temperature,
            top_k: settings.top_k,
            top_p: settings.top_p,
            max_output_tokens: settings.max_output_tokens,
            safety_threshold: settings.safety_threshold.clone(),
        }
    }
}

/// Successful generation payload
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub text: String,
    pub usage: Option<Usage>,
}

/// Token accounting reported by the endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Failure of a single request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl TransportError {
    /// HTTP 429, or an HTTP error whose message mentions quota or rate exhaustion
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Self::Http { status, message } => {
                *status == 429 || RATE_LIMIT_PHRASE.is_match(message)
            }
            _ => false,
        }
    }
}
