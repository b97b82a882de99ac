// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Fixed-structure prompt for herbal usage descriptions
//!
//! The three markdown headers below are rendered verbatim by clients, so
//! every prompt asks for exactly these sections in this order.

/// Main benefits section header
pub const BENEFITS_HEADER: &str = "### 🌱 Khasiat Utama";
/// Traditional usage section header
pub const USAGE_HEADER: &str = "### 🍵 Cara Penggunaan Tradisional";
/// One-sentence caution section header
pub const CAUTION_HEADER: &str = "### ⚠️ Peringatan Singkat";

/// Section headers in display order
pub const SECTION_HEADERS: [&str; 3] = [BENEFITS_HEADER, USAGE_HEADER, CAUTION_HEADER];

/// Build the enrichment prompt for a plant
///
/// `plant_name` is the human-readable name (e.g. "Lidah Buaya").
pub fn build_herbal_prompt(plant_name: &str, language: &str) -> String {
    format!(
        "Give short and engaging information about the herbal plant \"{plant}\" in {language}.\n\
         Use exactly this markdown format, keeping the headers unchanged:\n\
         \n\
         {benefits}\n\
         [Explain 2-3 main benefits briefly]\n\
         \n\
         {usage}\n\
         [Explain the single most common and easy way it is used]\n\
         \n\
         {caution}\n\
         [One sentence of caution or side effects, if any]\n\
         \n\
         Answer in an informative, friendly and concise tone. Do not make it too long.",
        plant = plant_name.trim(),
        language = language.trim(),
        benefits = BENEFITS_HEADER,
        usage = USAGE_HEADER,
        caution = CAUTION_HEADER,
    )
}

/// Section headers absent from a generated description
pub fn missing_sections(text: &str) -> Vec<&'static str> {
    SECTION_HEADERS
        .iter()
        .copied()
        .filter(|header| !text.contains(header))
        .collect()
}
