// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::predict::predict_handler;
use super::uploads::upload_handler;
use crate::classifier::HerbalSpecies;
use crate::pipeline::InferencePipeline;
use crate::storage::UploadStore;
use crate::version;

/// Multipart framing allowance on top of the file size limit
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<InferencePipeline>,
    pub uploads: UploadStore,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        pipeline: Arc<InferencePipeline>,
        uploads: UploadStore,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            pipeline,
            uploads,
            max_upload_bytes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// "ok" when the classifier is loaded, otherwise "degraded"
    pub status: String,
    pub model_loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_error: Option<String>,
    pub enrichment_configured: bool,
    pub candidates: Vec<String>,
    pub version: String,
    /// Build string, date and feature list
    pub version_info: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassInfo {
    pub index: usize,
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassesResponse {
    pub classes: Vec<ClassInfo>,
}

/// Build the HTTP router
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/health", get(health_handler))
        .route("/v1/classes", get(classes_handler))
        .route("/predict", post(predict_handler))
        .route("/uploads/:filename", get(upload_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn start_server(state: AppState, bind_address: &str) -> anyhow::Result<()> {
    let app = build_router(state);

    let addr = bind_address.parse::<SocketAddr>()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("🌿 API server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let engine = state.pipeline.engine();
    let enrichment = state.pipeline.enrichment();
    let model_loaded = engine.is_available();

    Json(HealthResponse {
        status: if model_loaded { "ok" } else { "degraded" }.to_string(),
        model_loaded,
        model_error: engine.unavailable_reason().map(str::to_string),
        enrichment_configured: enrichment.is_configured(),
        candidates: enrichment.candidates().to_vec(),
        version: version::VERSION_NUMBER.to_string(),
        version_info: version::get_version_info(),
    })
}

pub async fn classes_handler() -> Json<ClassesResponse> {
    Json(ClassesResponse {
        classes: HerbalSpecies::ALL
            .iter()
            .enumerate()
            .map(|(index, species)| ClassInfo {
                index,
                id: species.id().to_string(),
                name: species.display_name(),
            })
            .collect(),
    })
}
