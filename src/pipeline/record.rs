// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Externally visible inference results

use serde::{Deserialize, Serialize};

use crate::classifier::{HerbalSpecies, PredictionResult};
use crate::enrichment::{EnrichmentOutcome, EnrichmentStatus};
use crate::error::InferenceError;

/// How the description field was produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentSummary {
    pub status: EnrichmentStatus,
    /// Candidate model that produced the text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl From<&EnrichmentOutcome> for EnrichmentSummary {
    fn from(outcome: &EnrichmentOutcome) -> Self {
        Self {
            status: outcome.status(),
            model: outcome.model().map(str::to_string),
        }
    }
}

/// Successful pipeline result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceRecord {
    /// Internal class identifier, e.g. "lidah_buaya"
    pub predicted_class: HerbalSpecies,
    /// Display label, e.g. "Lidah Buaya"
    pub label: String,
    /// Confidence percentage in [0, 100]
    pub confidence: f32,
    /// Confidence with one decimal place
    pub confidence_display: String,
    /// Markdown description, or the enrichment failure explanation
    pub description: String,
    pub enrichment: EnrichmentSummary,
    /// Name the source image was submitted or stored under
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_image_ref: Option<String>,
}

impl InferenceRecord {
    pub fn new(
        prediction: &PredictionResult,
        outcome: &EnrichmentOutcome,
        source_image_ref: Option<String>,
    ) -> Self {
        Self {
            predicted_class: prediction.label,
            label: prediction.label.display_name(),
            confidence: prediction.confidence,
            confidence_display: prediction.confidence_display(),
            description: outcome.description(),
            enrichment: EnrichmentSummary::from(outcome),
            source_image_ref,
        }
    }
}

/// Pipeline failure payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    pub error: String,
    pub error_type: String,
}

impl From<&InferenceError> for ErrorRecord {
    fn from(err: &InferenceError) -> Self {
        Self {
            error: err.to_string(),
            error_type: err.error_type().to_string(),
        }
    }
}
