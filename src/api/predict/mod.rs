// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Predict API endpoint module
//!
//! Provides POST /predict for classifying an uploaded leaf image.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::predict_handler;
pub use request::{PredictUpload, FILE_FIELD};
pub use response::PredictResponse;
