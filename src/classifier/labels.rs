// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Herbal leaf class enumeration
//!
//! Order matters: index `i` of the classifier output vector is the score
//! for `HerbalSpecies::ALL[i]`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Known herbal plant species, in classifier output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HerbalSpecies {
    BangunBangun,
    JambuBiji,
    LidahBuaya,
    Mint,
    Pandan,
    Pegagan,
    Sirih,
    Sirsak,
}

impl HerbalSpecies {
    /// Number of classes the classifier must output
    pub const COUNT: usize = 8;

    /// All species in classifier output order
    pub const ALL: [HerbalSpecies; Self::COUNT] = [
        HerbalSpecies::BangunBangun,
        HerbalSpecies::JambuBiji,
        HerbalSpecies::LidahBuaya,
        HerbalSpecies::Mint,
        HerbalSpecies::Pandan,
        HerbalSpecies::Pegagan,
        HerbalSpecies::Sirih,
        HerbalSpecies::Sirsak,
    ];

    /// Internal snake-case identifier (as used during training)
    pub fn id(&self) -> &'static str {
        match self {
            HerbalSpecies::BangunBangun => "bangun_bangun",
            HerbalSpecies::JambuBiji => "jambu_biji",
            HerbalSpecies::LidahBuaya => "lidah_buaya",
            HerbalSpecies::Mint => "mint",
            HerbalSpecies::Pandan => "pandan",
            HerbalSpecies::Pegagan => "pegagan",
            HerbalSpecies::Sirih => "sirih",
            HerbalSpecies::Sirsak => "sirsak",
        }
    }

    /// Position in the classifier output vector
    pub fn index(&self) -> usize {
        Self::ALL
            .iter()
            .position(|s| s == self)
            .unwrap_or_default()
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Human-readable name, e.g. "Lidah Buaya"
    pub fn display_name(&self) -> String {
        readable_name(self.id())
    }
}

impl fmt::Display for HerbalSpecies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for HerbalSpecies {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase().replace([' ', '-'], "_");
        Self::ALL
            .iter()
            .copied()
            .find(|species| species.id() == needle)
            .ok_or_else(|| format!("unknown herbal species '{}'", s))
    }
}

/// Convert a snake-case identifier into title-cased display text
///
/// Underscores become spaces; the first letter of every alphabetic run is
/// uppercased and the rest lowercased.
pub fn readable_name(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    let mut prev_alpha = false;

    for ch in id.chars() {
        let ch = if ch == '_' { ' ' } else { ch };
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }

    out
}
