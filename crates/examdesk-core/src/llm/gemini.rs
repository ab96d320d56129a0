//! HTTP transport for the Gemini `generateContent` API

use super::{Generation, GenerationRequest, GenerationTransport, TransportError, Usage};
use crate::config::GenerationSettings;
use crate::error::{ExamDeskError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// reqwest-backed transport; one POST per call, key sent as a header
pub struct GeminiTransport {
    http_client: reqwest::Client,
    url: String,
}

impl GeminiTransport {
    /// Create transport from generation settings
    pub fn new(settings: &GenerationSettings) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(ExamDeskError::Http)?;

        let url = format!(
            "{}/models/{}:generateContent",
            settings.endpoint.trim_end_matches('/'),
            settings.model
        );

        Ok(Self { http_client, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Serialize)]
struct SafetySetting<'a> {
    category: &'a str,
    threshold: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn request_body(request: &GenerationRequest) -> GenerateRequest<'_> {
    GenerateRequest {
        contents: vec![Content {
            parts: vec![TextPart {
                text: &request.prompt,
            }],
        }],
        generation_config: GenerationConfig {
            temperature: request.temperature,
            top_k: request.top_k,
            top_p: request.top_p,
            max_output_tokens: request.max_output_tokens,
        },
        safety_settings: HARM_CATEGORIES
            .iter()
            .map(|category| SafetySetting {
                category,
                threshold: &request.safety_threshold,
            })
            .collect(),
    }
}

/// Extract generated text and usage from a success body
fn parse_generate_response(body: &str) -> std::result::Result<Generation, TransportError> {
    let response: GenerateResponse =
        serde_json::from_str(body).map_err(|e| TransportError::Malformed(e.to_string()))?;

    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(TransportError::Malformed(
            "No generated text in response".to_string(),
        ));
    }

    let usage = response.usage_metadata.map(|u| Usage {
        prompt_tokens: u.prompt_token_count,
        completion_tokens: u.candidates_token_count,
        total_tokens: u.total_token_count,
    });

    Ok(Generation { text, usage })
}

/// Build an HTTP error from a non-success status and its body
fn parse_error_body(status: u16, body: &str) -> TransportError {
    let message = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => match (envelope.error.message, envelope.error.status) {
            (Some(message), Some(status)) => format!("{} ({})", message, status),
            (Some(message), None) => message,
            (None, Some(status)) => status,
            (None, None) => body.to_string(),
        },
        Err(_) => body.to_string(),
    };
    TransportError::Http { status, message }
}

#[async_trait]
impl GenerationTransport for GeminiTransport {
    async fn generate(
        &self,
        api_key: &str,
        request: &GenerationRequest,
    ) -> std::result::Result<Generation, TransportError> {
        let response = self
            .http_client
            .post(&self.url)
            .header("x-goog-api-key", api_key)
            .json(&request_body(request))
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(parse_error_body(status.as_u16(), &body));
        }

        parse_generate_response(&body)
    }
}
