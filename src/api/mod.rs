// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod errors;
pub mod http_server;
pub mod predict;
pub mod uploads;

pub use errors::{ApiError, ErrorResponse};
pub use http_server::{
    build_router, start_server, AppState, ClassInfo, ClassesResponse, HealthResponse,
};
pub use predict::{predict_handler, PredictResponse, PredictUpload};
pub use uploads::upload_handler;
