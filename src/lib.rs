// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod pipeline;
pub mod storage;
pub mod version;
pub mod vision;

// Re-export main types
pub use classifier::{ClassificationEngine, HerbalSpecies, LeafClassifier, PredictionResult};
pub use config::AppConfig;
pub use enrichment::{EnrichmentChain, EnrichmentOutcome, GenerativeProvider};
pub use error::InferenceError;
pub use pipeline::{InferencePipeline, InferenceRecord};
pub use vision::{ImageTensor, RawImage};
