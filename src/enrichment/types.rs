// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Core types for herbal description enrichment

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when no generative API key is configured
pub const NOT_CONFIGURED_MESSAGE: &str =
    "Gemini API key is not configured. Herbal usage information cannot be loaded.";

/// Prefix of the description used when every candidate failed
pub const EXHAUSTED_MESSAGE: &str =
    "Sorry, herbal usage information could not be loaded. All models are busy or rate limited.";

/// Failure of a single enrichment candidate
///
/// Every variant carries the candidate model name so the aggregated
/// failure message identifies which candidate failed last.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EnrichmentError {
    /// Quota exhausted or rate limited by the provider
    #[error("{model}: quota exceeded or rate limited: {message}")]
    RateLimited { model: String, message: String },

    /// Non-success HTTP status from the provider
    #[error("{model}: API error {status}: {message}")]
    Api {
        model: String,
        status: u16,
        message: String,
    },

    /// Candidate did not answer within the per-call bound
    #[error("{model}: request timed out after {timeout_ms}ms")]
    Timeout { model: String, timeout_ms: u64 },

    /// Connection-level failure
    #[error("{model}: transport error: {message}")]
    Transport { model: String, message: String },

    /// Response parsed but contained no text
    #[error(
        "{model}: response contained no text{}",
        reason.as_ref().map(|r| format!(" ({})", r)).unwrap_or_default()
    )]
    EmptyResponse {
        model: String,
        reason: Option<String>,
    },

    /// Response body could not be parsed
    #[error("{model}: invalid response: {message}")]
    InvalidResponse { model: String, message: String },
}

impl EnrichmentError {
    /// Name of the candidate that produced this error
    pub fn model(&self) -> &str {
        match self {
            EnrichmentError::RateLimited { model, .. }
            | EnrichmentError::Api { model, .. }
            | EnrichmentError::Timeout { model, .. }
            | EnrichmentError::Transport { model, .. }
            | EnrichmentError::EmptyResponse { model, .. }
            | EnrichmentError::InvalidResponse { model, .. } => model,
        }
    }
}

/// Outcome of one enrichment chain run
#[derive(Debug, Clone, PartialEq)]
pub enum EnrichmentOutcome {
    /// Descriptive text. `model` is `None` for the degraded
    /// not-configured response.
    Text { body: String, model: Option<String> },

    /// Every candidate failed; only the last error is kept
    Failed {
        last_error: EnrichmentError,
        attempts: usize,
    },
}

/// Coarse outcome classification reported to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentStatus {
    Generated,
    NotConfigured,
    Failed,
}

impl EnrichmentOutcome {
    /// Degraded response used when no credential is configured
    pub fn not_configured() -> Self {
        EnrichmentOutcome::Text {
            body: NOT_CONFIGURED_MESSAGE.to_string(),
            model: None,
        }
    }

    pub fn status(&self) -> EnrichmentStatus {
        match self {
            EnrichmentOutcome::Text { model: Some(_), .. } => EnrichmentStatus::Generated,
            EnrichmentOutcome::Text { model: None, .. } => EnrichmentStatus::NotConfigured,
            EnrichmentOutcome::Failed { .. } => EnrichmentStatus::Failed,
        }
    }

    /// Model that produced the text, if any
    pub fn model(&self) -> Option<&str> {
        match self {
            EnrichmentOutcome::Text { model, .. } => model.as_deref(),
            EnrichmentOutcome::Failed { .. } => None,
        }
    }

    /// Text shown to the user, including the failure explanation
    pub fn description(&self) -> String {
        match self {
            EnrichmentOutcome::Text { body, .. } => body.clone(),
            EnrichmentOutcome::Failed { last_error, .. } => {
                format!("{} Last error: {}", EXHAUSTED_MESSAGE, last_error)
            }
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, EnrichmentOutcome::Failed { .. })
    }
}
