// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Gemini `generateContent` provider
//!
//! Calls the Gemini REST API directly: one POST per candidate model to
//! `{base}/models/{model}:generateContent` with the key in the
//! `x-goog-api-key` header.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::provider::GenerativeProvider;
use super::types::EnrichmentError;

/// Gemini API provider
pub struct GeminiProvider {
    api_key: String,
    api_base: String,
    client: Client,
    timeout: Duration,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl GeminiProvider {
    /// Create a new Gemini provider
    ///
    /// # Arguments
    /// * `api_key` - Gemini API key
    /// * `api_base` - REST base URL, e.g. `https://generativelanguage.googleapis.com/v1beta`
    /// * `timeout` - Per-request HTTP timeout
    pub fn new(
        api_key: impl Into<String>,
        api_base: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            api_key: api_key.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            client,
            timeout,
        })
    }

    /// Full `generateContent` URL for a model
    ///
    /// Accepts both `gemini-2.0-flash` and `models/gemini-2.0-flash`.
    pub fn endpoint_for_model(&self, model: &str) -> String {
        let model = model.trim();
        let model = model.strip_prefix("models/").unwrap_or(model);
        format!("{}/models/{}:generateContent", self.api_base, model)
    }

    fn map_send_error(&self, model: &str, e: reqwest::Error) -> EnrichmentError {
        if e.is_timeout() {
            EnrichmentError::Timeout {
                model: model.to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            EnrichmentError::Transport {
                model: model.to_string(),
                message: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl GenerativeProvider for GeminiProvider {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, EnrichmentError> {
        let url = self.endpoint_for_model(model);
        debug!("POST {}", url);

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(model, e))?;

        let status = response.status();

        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!("Failed to read {} error body from {}: {}", status, model, e);
                    format!("failed to read error body: {}", e)
                }
            };
            return Err(status_error(model, status, &body));
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.map_send_error(model, e))?;

        parse_generate_response(model, &body)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

/// Map a non-success status and body to an error
fn status_error(model: &str, status: StatusCode, body: &str) -> EnrichmentError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string());
    let message = if message.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("no error message")
            .to_string()
    } else {
        message
    };

    if status == StatusCode::TOO_MANY_REQUESTS {
        EnrichmentError::RateLimited {
            model: model.to_string(),
            message,
        }
    } else {
        EnrichmentError::Api {
            model: model.to_string(),
            status: status.as_u16(),
            message,
        }
    }
}

/// Extract the text of the first candidate
fn parse_generate_response(model: &str, body: &str) -> Result<String, EnrichmentError> {
    let data: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| EnrichmentError::InvalidResponse {
            model: model.to_string(),
            message: format!("JSON parse error: {}", e),
        })?;

    let text: String = data
        .candidates
        .iter()
        .flat_map(|c| c.content.iter())
        .take(1)
        .flat_map(|content| content.parts.iter())
        .filter_map(|part| part.text.as_deref())
        .collect();

    if text.trim().is_empty() {
        let reason = data
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .or_else(|| {
                data.candidates
                    .into_iter()
                    .next()
                    .and_then(|c| c.finish_reason)
            });
        return Err(EnrichmentError::EmptyResponse {
            model: model.to_string(),
            reason,
        });
    }

    Ok(text)
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}
