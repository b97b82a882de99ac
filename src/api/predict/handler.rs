// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Predict endpoint handler

use axum::{extract::State, Json};
use axum_extra::extract::Multipart;
use tracing::{info, warn};

use super::request::PredictUpload;
use super::response::PredictResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::vision::RawImage;

/// POST /predict - Classify an uploaded leaf image
///
/// Stores the upload, runs the inference pipeline and returns the label,
/// confidence and herbal description. The stored file is removed again
/// when the pipeline fails.
pub async fn predict_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<PredictResponse>, ApiError> {
    let upload = PredictUpload::from_multipart(multipart, state.max_upload_bytes).await?;

    info!(
        "Predict request: {} ({} bytes)",
        upload.filename,
        upload.bytes.len()
    );

    let stored = state.uploads.save(&upload.filename, &upload.bytes).await?;
    let image = RawImage::new(upload.bytes, stored.name.clone());

    match state.pipeline.process(image).await {
        Ok(record) => Ok(Json(PredictResponse::from_record(record, &stored.name))),
        Err(e) => {
            if let Err(cleanup) = state.uploads.remove(&stored.name).await {
                warn!("Failed to remove upload {}: {}", stored.name, cleanup);
            }
            Err(ApiError::from(e))
        }
    }
}
