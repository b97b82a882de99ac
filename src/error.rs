// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Errors that end an inference request

use thiserror::Error;

use crate::vision::ImageError;

/// Fatal per-request failures of the classification pipeline
///
/// Enrichment failures never appear here; they are folded into the
/// description text of an otherwise successful record.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InferenceError {
    /// Upload could not be parsed as a raster image
    #[error("Invalid image: {0}")]
    ImageDecode(String),

    /// The classifier failed to load at startup (process-wide condition)
    #[error("Classification model is not available: {0}")]
    ModelUnavailable(String),

    /// The loaded classifier failed while running
    #[error("Classification failed: {0}")]
    Classification(String),
}

impl InferenceError {
    /// Stable identifier used in API error payloads
    pub fn error_type(&self) -> &'static str {
        match self {
            InferenceError::ImageDecode(_) => "image_decode_error",
            InferenceError::ModelUnavailable(_) => "model_unavailable",
            InferenceError::Classification(_) => "classification_error",
        }
    }
}

impl From<ImageError> for InferenceError {
    fn from(err: ImageError) -> Self {
        InferenceError::ImageDecode(err.to_string())
    }
}
