//! Gemini `generateContent` client
//!
//! One user turn in, the first candidate's text out. The API key travels in
//! the `x-goog-api-key` header.

use async_trait::async_trait;
use pagelle_common::generation::TextGenerator;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use super::truncate_body;

/// Generation client errors
#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Rate limit or quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Model returned no text")]
    EmptyReply,
}

impl From<GeminiError> for pagelle_common::Error {
    fn from(err: GeminiError) -> Self {
        pagelle_common::Error::Generation(err.to_string())
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text parts of the first candidate, joined
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

/// Hosted model client
pub struct GeminiClient {
    http_client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, GeminiError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GeminiError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: format!(
                "{}/v1beta/models/{}:generateContent",
                base_url.trim_end_matches('/'),
                model
            ),
            model: model.to_string(),
            api_key,
        })
    }

    /// Send one prompt and return the reply text
    pub async fn generate_content(&self, prompt: &str) -> Result<String, GeminiError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        tracing::debug!(model = %self.model, prompt_chars = prompt.chars().count(), "Calling generation API");

        let response = self
            .http_client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GeminiError::NetworkError(e.without_url().to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = truncate_body(response.text().await.unwrap_or_default());
            if status.as_u16() == 429 {
                return Err(GeminiError::QuotaExceeded(error_text));
            }
            return Err(GeminiError::ApiError(status.as_u16(), error_text));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GeminiError::ParseError(e.without_url().to_string()))?;

        parsed.into_text().ok_or(GeminiError::EmptyReply)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> pagelle_common::Result<String> {
        Ok(self.generate_content(prompt).await?)
    }
}
