// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Inference orchestrator: normalize, classify, enrich

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::record::InferenceRecord;
use crate::classifier::ClassificationEngine;
use crate::enrichment::EnrichmentChain;
use crate::error::InferenceError;
use crate::vision::{normalize, RawImage};

/// Runs the three stages strictly in sequence
///
/// Decode and model failures short-circuit before enrichment. Enrichment
/// failure never fails the request: the record keeps its label and the
/// description carries the failure message.
#[derive(Debug, Clone)]
pub struct InferencePipeline {
    engine: Arc<ClassificationEngine>,
    enrichment: Arc<EnrichmentChain>,
}

impl InferencePipeline {
    pub fn new(engine: Arc<ClassificationEngine>, enrichment: Arc<EnrichmentChain>) -> Self {
        Self { engine, enrichment }
    }

    pub fn engine(&self) -> &ClassificationEngine {
        &self.engine
    }

    pub fn enrichment(&self) -> &EnrichmentChain {
        &self.enrichment
    }

    /// Process one uploaded image
    pub async fn process(&self, image: RawImage) -> Result<InferenceRecord, InferenceError> {
        let start = Instant::now();

        // Unavailable model: fail before spending decode/resize work
        self.engine.ensure_available()?;

        let source_ref = image.filename.clone();
        let engine = Arc::clone(&self.engine);

        // Decode, resize and inference are CPU-bound
        let prediction = tokio::task::spawn_blocking(move || {
            let tensor = normalize(&image)?;
            engine.classify(tensor)
        })
        .await
        .map_err(|e| InferenceError::Classification(format!("classification task failed: {}", e)))?
        .map_err(|e| {
            warn!("Inference failed for '{}': {}", source_ref, e);
            e
        })?;

        debug!(
            "'{}' classified as {} ({}%) in {}ms",
            source_ref,
            prediction.label,
            prediction.confidence_display(),
            start.elapsed().as_millis()
        );

        let outcome = self.enrichment.enrich(prediction.label).await;
        if outcome.is_failed() {
            warn!(
                "Enrichment failed for {}, returning classification only",
                prediction.label
            );
        }

        let record = InferenceRecord::new(&prediction, &outcome, Some(source_ref));

        info!(
            "Prediction: {} ({}%), enrichment {:?}, {}ms",
            record.label,
            record.confidence_display,
            record.enrichment.status,
            start.elapsed().as_millis()
        );

        Ok(record)
    }
}
