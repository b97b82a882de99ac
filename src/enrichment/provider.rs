// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Generative text provider trait definition

use async_trait::async_trait;

use super::types::EnrichmentError;

/// Trait for remote generative-language services
///
/// A provider is called with a named model and a prompt and returns the
/// text body or an error tagged with the model name. The enrichment chain
/// calls the same provider once per candidate model, in order.
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    /// Generate text for `prompt` using `model`
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, EnrichmentError>;

    /// Get the provider name for logging
    fn name(&self) -> &'static str;
}
