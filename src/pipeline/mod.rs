// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! End-to-end inference pipeline

pub mod orchestrator;
pub mod record;

pub use orchestrator::InferencePipeline;
pub use record::{EnrichmentSummary, ErrorRecord, InferenceRecord};
