// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Ordered fallback across generative model candidates

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::gemini::GeminiProvider;
use super::prompt::{build_herbal_prompt, missing_sections};
use super::provider::GenerativeProvider;
use super::types::{EnrichmentError, EnrichmentOutcome};
use crate::classifier::HerbalSpecies;
use crate::config::EnrichmentConfig;

/// Tries each candidate model in order until one returns text
///
/// Without a provider (no API key) the chain is in degraded mode and
/// answers every request with the fixed not-configured text.
#[derive(Clone)]
pub struct EnrichmentChain {
    provider: Option<Arc<dyn GenerativeProvider>>,
    candidates: Vec<String>,
    timeout: Duration,
    language: String,
}

impl std::fmt::Debug for EnrichmentChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnrichmentChain")
            .field("provider", &self.provider.as_ref().map(|p| p.name()))
            .field("candidates", &self.candidates)
            .field("timeout", &self.timeout)
            .field("language", &self.language)
            .finish()
    }
}

impl EnrichmentChain {
    /// Create a chain over an explicit provider and candidate list
    pub fn new(
        provider: Arc<dyn GenerativeProvider>,
        candidates: Vec<String>,
        timeout: Duration,
        language: impl Into<String>,
    ) -> Result<Self> {
        if candidates.is_empty() {
            anyhow::bail!("Enrichment chain needs at least one candidate model");
        }
        if timeout.is_zero() {
            anyhow::bail!("Enrichment timeout must be greater than 0");
        }

        Ok(Self {
            provider: Some(provider),
            candidates,
            timeout,
            language: language.into(),
        })
    }

    /// Degraded chain that never calls out
    pub fn not_configured() -> Self {
        let defaults = EnrichmentConfig::default();
        Self {
            provider: None,
            candidates: defaults.models,
            timeout: Duration::from_millis(defaults.timeout_ms),
            language: defaults.language,
        }
    }

    /// Build a Gemini-backed chain, or a degraded one when no key is set
    pub fn from_config(config: &EnrichmentConfig) -> Result<Self> {
        let Some(api_key) = config.api_key.as_deref() else {
            warn!("⚠️ GEMINI_API_KEY not set, herbal descriptions disabled");
            return Ok(Self {
                candidates: config.models.clone(),
                ..Self::not_configured()
            }
            .with_language(config.language.clone()));
        };

        let timeout = Duration::from_millis(config.timeout_ms);
        let provider = GeminiProvider::new(api_key, config.api_base.clone(), timeout)
            .context("Failed to create Gemini provider")?;

        info!(
            "Enrichment chain configured with {} candidate models: {}",
            config.models.len(),
            config.models.join(", ")
        );

        Self::new(
            Arc::new(provider),
            config.models.clone(),
            timeout,
            config.language.clone(),
        )
    }

    fn with_language(mut self, language: String) -> Self {
        self.language = language;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Candidate model names in try order
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Fetch usage information for a classified species
    pub async fn enrich(&self, species: HerbalSpecies) -> EnrichmentOutcome {
        self.enrich_subject(&species.display_name()).await
    }

    /// Fetch usage information for a plant by display name
    ///
    /// Stops at the first candidate that returns text. Each candidate gets
    /// one bounded attempt; a timeout counts as a failure. When every
    /// candidate fails only the last error is reported.
    pub async fn enrich_subject(&self, plant_name: &str) -> EnrichmentOutcome {
        let Some(provider) = self.provider.as_ref() else {
            debug!("Enrichment not configured, skipping remote calls");
            return EnrichmentOutcome::not_configured();
        };

        let prompt = build_herbal_prompt(plant_name, &self.language);
        let start = Instant::now();
        let mut last_error: Option<EnrichmentError> = None;
        let mut attempts = 0;

        for model in &self.candidates {
            attempts += 1;
            debug!("Trying {} model {} for '{}'", provider.name(), model, plant_name);

            let call = provider.generate(model, &prompt);
            let result = match tokio::time::timeout(self.timeout, call).await {
                Ok(result) => result,
                Err(_) => Err(EnrichmentError::Timeout {
                    model: model.clone(),
                    timeout_ms: self.timeout.as_millis() as u64,
                }),
            };

            match result {
                Ok(text) => {
                    let missing = missing_sections(&text);
                    if !missing.is_empty() {
                        warn!("Model {} omitted sections: {:?}", model, missing);
                    }

                    info!(
                        "Enrichment for '{}' from {} in {}ms (attempt {})",
                        plant_name,
                        model,
                        start.elapsed().as_millis(),
                        attempts
                    );

                    return EnrichmentOutcome::Text {
                        body: text,
                        model: Some(model.clone()),
                    };
                }
                Err(e) => {
                    warn!("Enrichment model {} failed: {}, trying next", model, e);
                    last_error = Some(e);
                }
            }
        }

        // Candidates are non-empty for a configured chain, so last_error is set
        let last_error = last_error.unwrap_or_else(|| EnrichmentError::Transport {
            model: "none".to_string(),
            message: "no candidate models configured".to_string(),
        });

        warn!(
            "All {} enrichment models failed for '{}', last error: {}",
            attempts, plant_name, last_error
        );

        EnrichmentOutcome::Failed {
            last_error,
            attempts,
        }
    }
}
