// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::InferenceError;
use crate::storage::UploadError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub error_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    NotFound(String),
    InvalidRequest(String),
    ValidationError { field: String, message: String },
    PayloadTooLarge { limit: usize },
    ServiceUnavailable(String),
    InternalError(String),
    Inference(InferenceError),
}

impl ApiError {
    pub fn to_response(&self) -> ErrorResponse {
        let (error_type, error, details) = match self {
            ApiError::NotFound(msg) => ("not_found", msg.clone(), None),
            ApiError::InvalidRequest(msg) => ("invalid_request", msg.clone(), None),
            ApiError::ValidationError { field, message } => {
                let mut details = HashMap::new();
                details.insert(
                    "field".to_string(),
                    serde_json::Value::String(field.clone()),
                );
                ("validation_error", message.clone(), Some(details))
            }
            ApiError::PayloadTooLarge { limit } => {
                let mut details = HashMap::new();
                details.insert(
                    "limit".to_string(),
                    serde_json::Value::Number((*limit as u64).into()),
                );
                (
                    "payload_too_large",
                    format!("Upload exceeds maximum size of {} bytes", limit),
                    Some(details),
                )
            }
            ApiError::ServiceUnavailable(msg) => ("service_unavailable", msg.clone(), None),
            ApiError::InternalError(msg) => ("internal_error", msg.clone(), None),
            ApiError::Inference(err) => (err.error_type(), err.to_string(), None),
        };

        ErrorResponse {
            error,
            error_type: error_type.to_string(),
            details,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::NotFound(_) => 404,
            ApiError::InvalidRequest(_) | ApiError::ValidationError { .. } => 400,
            ApiError::PayloadTooLarge { .. } => 413,
            ApiError::ServiceUnavailable(_) => 503,
            ApiError::InternalError(_) => 500,
            ApiError::Inference(InferenceError::ImageDecode(_)) => 400,
            ApiError::Inference(InferenceError::ModelUnavailable(_)) => 503,
            ApiError::Inference(InferenceError::Classification(_)) => 500,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::ValidationError { field, message } => {
                write!(f, "Validation error for {}: {}", field, message)
            }
            ApiError::PayloadTooLarge { limit } => {
                write!(f, "Upload exceeds maximum size of {} bytes", limit)
            }
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::Inference(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<InferenceError> for ApiError {
    fn from(err: InferenceError) -> Self {
        ApiError::Inference(err)
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::InvalidFilename(name) => ApiError::ValidationError {
                field: "file".to_string(),
                message: format!("Invalid filename '{}'", name),
            },
            UploadError::NotFound(name) => {
                ApiError::NotFound(format!("Upload '{}' not found", name))
            }
            UploadError::Io(e) => ApiError::InternalError(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_response())).into_response()
    }
}
