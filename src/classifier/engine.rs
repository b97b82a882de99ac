// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Classification engine: turns a tensor into a label and confidence

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::labels::HerbalSpecies;
use super::model::{LeafClassifier, OnnxLeafClassifier};
use crate::error::InferenceError;
use crate::vision::ImageTensor;

/// Result of a single successful classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    /// Predicted species
    pub label: HerbalSpecies,
    /// Confidence percentage in [0, 100], full precision
    pub confidence: f32,
}

impl PredictionResult {
    /// Confidence formatted with one decimal place, e.g. "97.3"
    pub fn confidence_display(&self) -> String {
        format!("{:.1}", self.confidence)
    }
}

/// Loaded-or-not state of the process-wide classifier
#[derive(Clone)]
enum ClassifierState {
    Ready(Arc<dyn LeafClassifier>),
    Unavailable { reason: String },
}

/// Wraps the classifier loaded at startup
///
/// Loading never fails the process: a model that could not be loaded
/// leaves the engine in an unavailable state and every `classify` call
/// returns [`InferenceError::ModelUnavailable`].
#[derive(Clone)]
pub struct ClassificationEngine {
    state: ClassifierState,
}

impl std::fmt::Debug for ClassificationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.state {
            ClassifierState::Ready(model) => f
                .debug_struct("ClassificationEngine")
                .field("model", &model.name())
                .finish(),
            ClassifierState::Unavailable { reason } => f
                .debug_struct("ClassificationEngine")
                .field("unavailable", reason)
                .finish(),
        }
    }
}

impl ClassificationEngine {
    /// Load the ONNX classifier, recording any failure instead of returning it
    pub fn load(model_path: Option<&Path>) -> Self {
        let Some(path) = model_path else {
            warn!("⚠️ No classifier model path configured");
            return Self::unavailable("no model path configured");
        };

        match OnnxLeafClassifier::load(path) {
            Ok(model) => {
                info!("✅ Leaf classifier ready from {}", path.display());
                Self::with_classifier(Arc::new(model))
            }
            Err(e) => {
                warn!("⚠️ Failed to load leaf classifier from {}: {:#}", path.display(), e);
                Self::unavailable(format!("{:#}", e))
            }
        }
    }

    pub fn with_classifier(classifier: Arc<dyn LeafClassifier>) -> Self {
        Self {
            state: ClassifierState::Ready(classifier),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            state: ClassifierState::Unavailable {
                reason: reason.into(),
            },
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.state, ClassifierState::Ready(_))
    }

    /// Why the classifier is unavailable, if it is
    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.state {
            ClassifierState::Ready(_) => None,
            ClassifierState::Unavailable { reason } => Some(reason),
        }
    }

    /// Fail fast when no classifier is loaded
    pub fn ensure_available(&self) -> Result<&Arc<dyn LeafClassifier>, InferenceError> {
        match &self.state {
            ClassifierState::Ready(model) => Ok(model),
            ClassifierState::Unavailable { reason } => {
                Err(InferenceError::ModelUnavailable(reason.clone()))
            }
        }
    }

    /// Classify a preprocessed tensor
    ///
    /// Confidence is the maximum score times 100; the label is the class at
    /// the first index holding that maximum. No retries are attempted.
    pub fn classify(&self, tensor: ImageTensor) -> Result<PredictionResult, InferenceError> {
        let model = self.ensure_available()?;

        let scores = model
            .predict(&tensor)
            .map_err(|e| InferenceError::Classification(format!("{:#}", e)))?;

        if scores.len() != HerbalSpecies::COUNT {
            return Err(InferenceError::Classification(format!(
                "classifier returned {} scores, expected {}",
                scores.len(),
                HerbalSpecies::COUNT
            )));
        }

        let (index, max_score) = argmax_first(&scores).ok_or_else(|| {
            InferenceError::Classification("classifier returned no comparable scores".to_string())
        })?;

        // Index is in range: scores.len() == COUNT was checked above
        let label = HerbalSpecies::from_index(index).ok_or_else(|| {
            InferenceError::Classification(format!("class index {} out of range", index))
        })?;

        let confidence = (max_score * 100.0).clamp(0.0, 100.0);

        debug!(
            "Classified as {} ({:.1}%) using {}",
            label,
            confidence,
            model.name()
        );

        Ok(PredictionResult { label, confidence })
    }
}

/// Index and value of the maximum score
///
/// Ties resolve to the lowest index. NaN entries never win.
pub fn argmax_first(values: &[f32]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;

    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, current)) if v <= current => {}
            _ => best = Some((i, v)),
        }
    }

    best
}
