// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Predict request extraction and validation

use axum::http::StatusCode;
use axum_extra::extract::multipart::MultipartError;
use axum_extra::extract::Multipart;

use crate::api::errors::ApiError;
use crate::storage::secure_filename;
use crate::vision::allowed_file;

/// Multipart field carrying the image
pub const FILE_FIELD: &str = "file";

/// An image upload taken from a multipart form
#[derive(Debug, Clone)]
pub struct PredictUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl PredictUpload {
    /// Read the `file` field from a multipart form
    ///
    /// Other fields are skipped. A missing `file` field is a validation error.
    pub async fn from_multipart(
        mut multipart: Multipart,
        max_bytes: usize,
    ) -> Result<Self, ApiError> {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error(e, max_bytes))?
        {
            if field.name() != Some(FILE_FIELD) {
                continue;
            }

            let filename = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| multipart_error(e, max_bytes))?;

            let upload = Self {
                filename,
                bytes: bytes.to_vec(),
            };
            upload.validate(max_bytes)?;
            return Ok(upload);
        }

        Err(ApiError::ValidationError {
            field: FILE_FIELD.to_string(),
            message: "No file part in the request".to_string(),
        })
    }

    /// Validate the filename, its sanitized form, and the size
    pub fn validate(&self, max_bytes: usize) -> Result<(), ApiError> {
        if self.filename.trim().is_empty() {
            return Err(ApiError::ValidationError {
                field: FILE_FIELD.to_string(),
                message: "No file selected".to_string(),
            });
        }

        if !allowed_file(&self.filename) {
            return Err(ApiError::ValidationError {
                field: FILE_FIELD.to_string(),
                message: "Invalid file type. Allowed types: png, jpg, jpeg".to_string(),
            });
        }

        // The stored name must still carry an accepted extension
        match secure_filename(&self.filename) {
            Some(clean) if allowed_file(&clean) => {}
            _ => {
                return Err(ApiError::ValidationError {
                    field: FILE_FIELD.to_string(),
                    message: format!("Invalid filename '{}'", self.filename),
                });
            }
        }

        if self.bytes.len() > max_bytes {
            return Err(ApiError::PayloadTooLarge { limit: max_bytes });
        }

        Ok(())
    }
}

fn multipart_error(err: MultipartError, max_bytes: usize) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge { limit: max_bytes }
    } else {
        ApiError::InvalidRequest(err.body_text())
    }
}
