// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Shared fixtures for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use herbal_leaf_node::classifier::{ClassificationEngine, HerbalSpecies, LeafClassifier};
use herbal_leaf_node::enrichment::{EnrichmentChain, EnrichmentError, GenerativeProvider};
use herbal_leaf_node::pipeline::InferencePipeline;
use herbal_leaf_node::vision::ImageTensor;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Complete three-section description as a model would return it
pub const SAMPLE_DESCRIPTION: &str = "### 🌱 Khasiat Utama\nMeredakan radang.\n\n\
### 🍵 Cara Penggunaan Tradisional\nDirebus lalu diminum.\n\n\
### ⚠️ Peringatan Singkat\nHindari dosis berlebihan.";

/// Classifier returning fixed scores and counting calls
pub struct MockClassifier {
    scores: Vec<f32>,
    calls: AtomicUsize,
}

impl MockClassifier {
    /// Scores with all mass on one species
    pub fn confident(species: HerbalSpecies, confidence: f32) -> Self {
        let rest = (1.0 - confidence) / (HerbalSpecies::COUNT as f32 - 1.0);
        let scores = HerbalSpecies::ALL
            .iter()
            .map(|s| if *s == species { confidence } else { rest })
            .collect();
        Self::with_scores(scores)
    }

    pub fn with_scores(scores: Vec<f32>) -> Self {
        Self {
            scores,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LeafClassifier for MockClassifier {
    fn predict(&self, input: &ImageTensor) -> anyhow::Result<Vec<f32>> {
        assert_eq!(input.shape(), &[1, 224, 224, 3]);
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.scores.clone())
    }

    fn name(&self) -> &str {
        "mock-leaf"
    }
}

/// Provider answering from a per-model script
pub struct MockProvider {
    script: HashMap<String, Result<String, EnrichmentError>>,
    calls: Mutex<Vec<String>>,
    prompts: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            script: HashMap::new(),
            calls: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn succeed(mut self, model: &str, text: &str) -> Self {
        self.script.insert(model.to_string(), Ok(text.to_string()));
        self
    }

    pub fn rate_limit(mut self, model: &str) -> Self {
        self.script.insert(
            model.to_string(),
            Err(EnrichmentError::RateLimited {
                model: model.to_string(),
                message: "Resource has been exhausted (e.g. check quota).".to_string(),
            }),
        );
        self
    }

    pub fn fail(mut self, model: &str, error: EnrichmentError) -> Self {
        self.script.insert(model.to_string(), Err(error));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeProvider for MockProvider {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, EnrichmentError> {
        self.calls.lock().unwrap().push(model.to_string());
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.script.get(model).cloned().unwrap_or_else(|| {
            Err(EnrichmentError::Api {
                model: model.to_string(),
                status: 404,
                message: format!("models/{} is not found", model),
            })
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Default candidate list used across tests
pub fn candidates() -> Vec<String> {
    [
        "gemini-2.0-flash",
        "gemini-2.0-flash-exp",
        "gemini-1.5-flash",
        "gemini-flash-latest",
    ]
    .iter()
    .map(|m| m.to_string())
    .collect()
}

pub fn chain_with(provider: Arc<MockProvider>) -> EnrichmentChain {
    EnrichmentChain::new(provider, candidates(), Duration::from_secs(5), "Bahasa Indonesia")
        .unwrap()
}

pub fn pipeline_with(
    classifier: Arc<MockClassifier>,
    chain: EnrichmentChain,
) -> InferencePipeline {
    InferencePipeline::new(
        Arc::new(ClassificationEngine::with_classifier(classifier)),
        Arc::new(chain),
    )
}

/// Encode a solid-colour image
pub fn solid_image(width: u32, height: u32, rgb: [u8; 3], format: ImageFormat) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(rgb)));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

pub fn green_png() -> Vec<u8> {
    solid_image(300, 300, [0, 255, 0], ImageFormat::Png)
}
