// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Predict response types

use serde::{Deserialize, Serialize};

use crate::pipeline::{EnrichmentSummary, InferenceRecord};

/// Response from POST /predict
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictResponse {
    /// Internal class identifier
    pub predicted_class: String,
    /// Display name of the class
    pub name: String,
    /// Confidence percentage in [0, 100]
    pub confidence: f32,
    /// Confidence with one decimal place
    pub confidence_display: String,
    /// Markdown herbal usage description
    pub description: String,
    pub enrichment: EnrichmentSummary,
    /// URL the uploaded image is served from
    pub image_path: String,
}

impl PredictResponse {
    pub fn from_record(record: InferenceRecord, stored_name: &str) -> Self {
        Self {
            predicted_class: record.predicted_class.id().to_string(),
            name: record.label,
            confidence: record.confidence,
            confidence_display: record.confidence_display,
            description: record.description,
            enrichment: record.enrichment,
            image_path: format!("/uploads/{}", stored_name),
        }
    }
}
