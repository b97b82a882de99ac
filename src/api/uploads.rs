// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Stored upload endpoint

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::vision::image_utils::content_type_for;

/// GET /uploads/:filename - Serve a previously uploaded image
pub async fn upload_handler(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let bytes = state.uploads.open(&filename).await?;

    Ok((
        [(header::CONTENT_TYPE, content_type_for(&filename))],
        bytes,
    )
        .into_response())
}
