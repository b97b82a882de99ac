// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Herbal usage enrichment
//!
//! Asks a generative-language service for a short three-section
//! description of the classified plant, trying candidate models in order.

pub mod chain;
pub mod gemini;
pub mod prompt;
pub mod provider;
pub mod types;

pub use chain::EnrichmentChain;
pub use gemini::GeminiProvider;
pub use prompt::{build_herbal_prompt, missing_sections, SECTION_HEADERS};
pub use provider::GenerativeProvider;
pub use types::{
    EnrichmentError, EnrichmentOutcome, EnrichmentStatus, EXHAUSTED_MESSAGE,
    NOT_CONFIGURED_MESSAGE,
};
