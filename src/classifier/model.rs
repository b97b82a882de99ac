// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Leaf classifier backends
//!
//! `LeafClassifier` is the seam between the classification engine and the
//! model runtime. Production uses an ONNX export of the MobileNetV2 leaf
//! model; tests plug in deterministic fakes.

use anyhow::{Context, Result};
use ndarray::Array4;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::labels::HerbalSpecies;
use crate::vision::{ImageTensor, TENSOR_SHAPE};

/// A loaded image classifier producing one score per herbal class
pub trait LeafClassifier: Send + Sync {
    /// Run the model on a `[1, 224, 224, 3]` tensor
    ///
    /// Returns the raw probability-like vector, expected to have
    /// [`HerbalSpecies::COUNT`] entries.
    fn predict(&self, input: &ImageTensor) -> Result<Vec<f32>>;

    /// Model name for logging
    fn name(&self) -> &str;
}

/// ONNX Runtime backed leaf classifier
///
/// Runs on CPU only. The session is guarded by a mutex because
/// `Session::run` needs exclusive access; the model itself is never
/// modified after loading.
#[derive(Clone)]
pub struct OnnxLeafClassifier {
    /// ONNX Runtime session (thread-safe)
    session: Arc<Mutex<Session>>,
    /// Model input name
    input_name: String,
    /// Path the model was loaded from
    model_path: PathBuf,
}

impl std::fmt::Debug for OnnxLeafClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxLeafClassifier")
            .field("input_name", &self.input_name)
            .field("model_path", &self.model_path)
            .finish_non_exhaustive()
    }
}

impl OnnxLeafClassifier {
    /// Load the leaf classifier from an ONNX file
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found
    /// - ONNX Runtime initialization fails
    /// - A validation inference does not yield one score per known class
    pub fn load<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("Leaf classifier model not found: {}", model_path.display());
        }

        info!("Loading leaf classifier from {}", model_path.display());

        let mut session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(4)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .context(format!(
                "Failed to load leaf classifier from {}",
                model_path.display()
            ))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "input".to_string());

        debug!("Leaf classifier input: {}", input_name);

        // Class count mismatch is a configuration error, caught once here
        let scores = run_session(&mut session, &input_name, Array4::zeros(TENSOR_SHAPE))
            .context("Leaf classifier validation inference failed")?;
        if scores.len() != HerbalSpecies::COUNT {
            anyhow::bail!(
                "Leaf classifier outputs {} classes, expected {}",
                scores.len(),
                HerbalSpecies::COUNT
            );
        }

        info!("✅ Leaf classifier loaded successfully (CPU-only)");

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            model_path: model_path.to_path_buf(),
        })
    }
}

impl LeafClassifier for OnnxLeafClassifier {
    fn predict(&self, input: &ImageTensor) -> Result<Vec<f32>> {
        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("Leaf classifier session lock poisoned"))?;

        run_session(&mut session, &self.input_name, input.view().to_owned())
    }

    fn name(&self) -> &str {
        "mobilenetv2-leaf"
    }
}

/// Run one inference and flatten the first output into a score vector
fn run_session(session: &mut Session, input_name: &str, input: Array4<f32>) -> Result<Vec<f32>> {
    let input_value = Value::from_array(input).context("Failed to create input tensor")?;

    let outputs = session
        .run(ort::inputs![input_name => input_value])
        .context("Leaf classifier inference failed")?;

    let output_tensor = outputs[0]
        .try_extract_array::<f32>()
        .context("Failed to extract output tensor")?;

    debug!("Leaf classifier output shape: {:?}", output_tensor.shape());

    Ok(output_tensor.iter().copied().collect())
}
