// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Herbal leaf classification

pub mod engine;
pub mod labels;
pub mod model;

pub use engine::{argmax_first, ClassificationEngine, PredictionResult};
pub use labels::{readable_name, HerbalSpecies};
pub use model::{LeafClassifier, OnnxLeafClassifier};
