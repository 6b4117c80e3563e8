// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Atlas identifiers and the fixed per-atlas policy table.
//!
//! Every atlas is addressed by an upper-case key (`ARA`, `CP_VORONOI`, ...).
//! The default atlas is `ARA`; the others are custom atlases whose color
//! layers either replace or overlay the default color table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{AtlasError, AtlasResult};

/// One embedded color table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColorLayer {
    Ara,
    CpcVoronoi,
    CpiVoronoi,
    CprVoronoi,
    BlaaDivisions,
    Dp,
    ScDivisions,
}

impl ColorLayer {
    pub const ALL: [ColorLayer; 7] = [
        ColorLayer::Ara,
        ColorLayer::CpcVoronoi,
        ColorLayer::CpiVoronoi,
        ColorLayer::CprVoronoi,
        ColorLayer::BlaaDivisions,
        ColorLayer::Dp,
        ColorLayer::ScDivisions,
    ];

    pub fn table_name(self) -> &'static str {
        match self {
            ColorLayer::Ara => "ara",
            ColorLayer::CpcVoronoi => "cpc_voronoi",
            ColorLayer::CpiVoronoi => "cpi_voronoi",
            ColorLayer::CprVoronoi => "cpr_voronoi",
            ColorLayer::BlaaDivisions => "blaa_divisions",
            ColorLayer::Dp => "dp",
            ColorLayer::ScDivisions => "sc_divisions",
        }
    }
}

/// Atlas identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AtlasId {
    Ara,
    CpVoronoi,
    CpcVoronoi,
    CpiVoronoi,
    CprVoronoi,
    BlaaDivisions,
    Dp,
    ScDivisions,
}

impl AtlasId {
    pub const DEFAULT: AtlasId = AtlasId::Ara;

    pub const ALL: [AtlasId; 8] = [
        AtlasId::Ara,
        AtlasId::CpVoronoi,
        AtlasId::CpcVoronoi,
        AtlasId::CpiVoronoi,
        AtlasId::CprVoronoi,
        AtlasId::BlaaDivisions,
        AtlasId::Dp,
        AtlasId::ScDivisions,
    ];

    pub fn key(self) -> &'static str {
        match self {
            AtlasId::Ara => "ARA",
            AtlasId::CpVoronoi => "CP_VORONOI",
            AtlasId::CpcVoronoi => "CPC_VORONOI",
            AtlasId::CpiVoronoi => "CPI_VORONOI",
            AtlasId::CprVoronoi => "CPR_VORONOI",
            AtlasId::BlaaDivisions => "BLAA_DIVISIONS",
            AtlasId::Dp => "DP",
            AtlasId::ScDivisions => "SC_DIVISIONS",
        }
    }

    pub fn is_default(self) -> bool {
        self == AtlasId::DEFAULT
    }

    /// Color layers applied, in order, when building this atlas's codec
    pub fn layers(self) -> &'static [ColorLayer] {
        match self {
            AtlasId::Ara => &[ColorLayer::Ara],
            AtlasId::CpVoronoi => &[
                ColorLayer::CpcVoronoi,
                ColorLayer::CpiVoronoi,
                ColorLayer::CprVoronoi,
            ],
            AtlasId::CpcVoronoi => &[ColorLayer::CpcVoronoi],
            AtlasId::CpiVoronoi => &[ColorLayer::CpiVoronoi],
            AtlasId::CprVoronoi => &[ColorLayer::CprVoronoi],
            AtlasId::BlaaDivisions => &[ColorLayer::BlaaDivisions],
            AtlasId::Dp => &[ColorLayer::Dp],
            AtlasId::ScDivisions => &[ColorLayer::ScDivisions],
        }
    }

    /// Whether the custom layers replace the default table instead of overlaying it
    pub fn clears_default(self) -> bool {
        matches!(
            self,
            AtlasId::CpVoronoi | AtlasId::CpcVoronoi | AtlasId::CpiVoronoi | AtlasId::CprVoronoi
        )
    }

    /// Stable asset version
    pub fn version(self) -> &'static str {
        match self {
            AtlasId::CprVoronoi | AtlasId::BlaaDivisions => "v2",
            AtlasId::ScDivisions => "v3",
            _ => "v1",
        }
    }

    pub fn same_version(self, other: AtlasId) -> bool {
        self.version() == other.version()
    }

    /// Human readable name, e.g. `Cp Voronoi`
    pub fn display_name(self) -> String {
        self.key()
            .split('_')
            .map(|word| {
                let lower = word.to_lowercase();
                let mut chars = lower.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Lenient lookup used by user-facing selectors; unknown names select the default atlas.
    pub fn from_display_name(name: &str) -> AtlasId {
        match name.parse() {
            Ok(atlas) => atlas,
            Err(_) => {
                warn!(target: "connlens-atlas", "Cannot use '{}' as an atlas, using {}", name, AtlasId::DEFAULT);
                AtlasId::DEFAULT
            }
        }
    }

    pub fn candidates() -> String {
        AtlasId::ALL
            .iter()
            .map(|atlas| atlas.key())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Display names of every atlas, in catalog order
pub fn available_atlases() -> Vec<String> {
    AtlasId::ALL.iter().map(|atlas| atlas.display_name()).collect()
}

impl FromStr for AtlasId {
    type Err = AtlasError;

    /// Accepts keys in any case, with spaces standing in for underscores.
    fn from_str(s: &str) -> AtlasResult<Self> {
        let key = s.trim().to_uppercase().replace(' ', "_");
        AtlasId::ALL
            .iter()
            .copied()
            .find(|atlas| atlas.key() == key)
            .ok_or_else(|| AtlasError::UnknownAtlas {
                name: s.to_string(),
                candidates: AtlasId::candidates(),
            })
    }
}

impl TryFrom<String> for AtlasId {
    type Error = AtlasError;

    fn try_from(value: String) -> AtlasResult<Self> {
        value.parse()
    }
}

impl From<AtlasId> for String {
    fn from(atlas: AtlasId) -> Self {
        atlas.key().to_string()
    }
}

impl fmt::Display for AtlasId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_key() {
        assert_eq!("cp voronoi".parse::<AtlasId>().unwrap(), AtlasId::CpVoronoi);
        assert_eq!("SC_DIVISIONS".parse::<AtlasId>().unwrap(), AtlasId::ScDivisions);
        assert_eq!(" ara ".parse::<AtlasId>().unwrap(), AtlasId::Ara);
    }

    #[test]
    fn test_unknown_atlas_lists_candidates() {
        let err = "NOT_AN_ATLAS".parse::<AtlasId>().unwrap_err();
        match err {
            AtlasError::UnknownAtlas { name, candidates } => {
                assert_eq!(name, "NOT_AN_ATLAS");
                assert!(candidates.contains("CP_VORONOI"));
                assert!(candidates.starts_with("ARA"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_display_names() {
        assert_eq!(AtlasId::Ara.display_name(), "Ara");
        assert_eq!(AtlasId::CpVoronoi.display_name(), "Cp Voronoi");
        assert_eq!(AtlasId::BlaaDivisions.display_name(), "Blaa Divisions");
        assert_eq!(available_atlases().len(), AtlasId::ALL.len());
    }

    #[test]
    fn test_display_name_round_trips() {
        for atlas in AtlasId::ALL {
            assert_eq!(AtlasId::from_display_name(&atlas.display_name()), atlas);
        }
        assert_eq!(AtlasId::from_display_name("Whole Brain"), AtlasId::Ara);
    }

    #[test]
    fn test_policy_table() {
        assert!(AtlasId::CpVoronoi.clears_default());
        assert!(!AtlasId::BlaaDivisions.clears_default());
        assert_eq!(AtlasId::CpVoronoi.layers().len(), 3);
        assert_eq!(AtlasId::ScDivisions.version(), "v3");
        assert!(AtlasId::Ara.same_version(AtlasId::Dp));
        assert!(!AtlasId::Ara.same_version(AtlasId::CprVoronoi));
    }
}
