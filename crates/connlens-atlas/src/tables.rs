// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Embedded atlas tables.

The color layers, the non-gray-matter exclusion list, the legacy spelling
remap and the custom region groups ship with the crate as JSON and are parsed
once into an [`AtlasTables`] value. Codecs and registries borrow from it, so
callers usually hold it in an `Arc` and pass it around.
*/

use std::collections::{BTreeMap, BTreeSet};

use ahash::AHashMap;

use crate::atlas::ColorLayer;
use crate::color::{RegionIndex, Rgb};
use crate::error::{AtlasError, AtlasResult};

const ARA_JSON: &str = include_str!("../tables/ara.json");
const CPC_VORONOI_JSON: &str = include_str!("../tables/cpc_voronoi.json");
const CPI_VORONOI_JSON: &str = include_str!("../tables/cpi_voronoi.json");
const CPR_VORONOI_JSON: &str = include_str!("../tables/cpr_voronoi.json");
const BLAA_DIVISIONS_JSON: &str = include_str!("../tables/blaa_divisions.json");
const DP_JSON: &str = include_str!("../tables/dp.json");
const SC_DIVISIONS_JSON: &str = include_str!("../tables/sc_divisions.json");
const NON_GRAY_MATTER_JSON: &str = include_str!("../tables/non_gray_matter.json");
const LEGACY_REGION_NAMES_JSON: &str = include_str!("../tables/legacy_region_names.json");
const CUSTOM_REGIONS_JSON: &str = include_str!("../tables/custom_regions.json");

fn layer_source(layer: ColorLayer) -> &'static str {
    match layer {
        ColorLayer::Ara => ARA_JSON,
        ColorLayer::CpcVoronoi => CPC_VORONOI_JSON,
        ColorLayer::CpiVoronoi => CPI_VORONOI_JSON,
        ColorLayer::CprVoronoi => CPR_VORONOI_JSON,
        ColorLayer::BlaaDivisions => BLAA_DIVISIONS_JSON,
        ColorLayer::Dp => DP_JSON,
        ColorLayer::ScDivisions => SC_DIVISIONS_JSON,
    }
}

/// Color key to region name, ordered by index
pub type ColorTable = BTreeMap<Rgb, String>;

/// Immutable lookup tables shared by every atlas scope
#[derive(Debug, Clone)]
pub struct AtlasTables {
    layers: AHashMap<ColorLayer, ColorTable>,
    non_gray_matter: BTreeSet<String>,
    legacy_region_names: AHashMap<String, String>,
    custom_regions: BTreeMap<String, Vec<String>>,
    default_gray_matter: BTreeSet<RegionIndex>,
}

impl AtlasTables {
    /// Parse the tables compiled into the crate.
    pub fn load_embedded() -> AtlasResult<Self> {
        let mut layers = AHashMap::new();
        for layer in ColorLayer::ALL {
            layers.insert(layer, parse_color_table(layer.table_name(), layer_source(layer))?);
        }

        let non_gray_matter: BTreeSet<String> =
            parse_json("non_gray_matter", NON_GRAY_MATTER_JSON)?;
        let legacy_region_names: AHashMap<String, String> =
            parse_json("legacy_region_names", LEGACY_REGION_NAMES_JSON)?;
        let custom_regions: BTreeMap<String, Vec<String>> =
            parse_json("custom_regions", CUSTOM_REGIONS_JSON)?;

        let default_gray_matter = layers
            .get(&ColorLayer::Ara)
            .map(|table| {
                table
                    .iter()
                    .filter(|(_, name)| !non_gray_matter.contains(name.as_str()))
                    .map(|(rgb, _)| rgb.index())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            layers,
            non_gray_matter,
            legacy_region_names,
            custom_regions,
            default_gray_matter,
        })
    }

    /// The default (ARA) color table
    pub fn default_table(&self) -> &ColorTable {
        self.layer(ColorLayer::Ara)
    }

    pub fn layer(&self, layer: ColorLayer) -> &ColorTable {
        // every layer is inserted by load_embedded
        static EMPTY: ColorTable = ColorTable::new();
        self.layers.get(&layer).unwrap_or(&EMPTY)
    }

    pub fn is_non_gray_matter(&self, region: &str) -> bool {
        self.non_gray_matter.contains(region)
    }

    pub fn non_gray_matter(&self) -> &BTreeSet<String> {
        &self.non_gray_matter
    }

    /// Gray-matter indices of the default atlas
    pub fn default_gray_matter(&self) -> &BTreeSet<RegionIndex> {
        &self.default_gray_matter
    }

    /// Current spelling for a legacy region name, if it is one
    pub fn legacy_rename(&self, region: &str) -> Option<&str> {
        self.legacy_region_names.get(region).map(String::as_str)
    }

    /// Named groups of regions (`CP`, `ACB`) used as composite injection sites
    pub fn custom_regions(&self) -> &BTreeMap<String, Vec<String>> {
        &self.custom_regions
    }

    /// Every region name across all color layers and custom region groups
    pub fn known_regions(&self) -> BTreeSet<String> {
        let mut names: BTreeSet<String> = self
            .layers
            .values()
            .flat_map(|table| table.values().cloned())
            .collect();
        names.extend(self.custom_regions.values().flatten().cloned());
        names
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(table: &str, source: &str) -> AtlasResult<T> {
    serde_json::from_str(source).map_err(|e| AtlasError::Table {
        table: table.to_string(),
        message: e.to_string(),
    })
}

fn parse_color_table(table: &str, source: &str) -> AtlasResult<ColorTable> {
    let raw: BTreeMap<String, String> = parse_json(table, source)?;
    raw.into_iter()
        .map(|(key, name)| {
            let rgb = key.parse::<Rgb>().map_err(|e| AtlasError::Table {
                table: table.to_string(),
                message: e.to_string(),
            })?;
            Ok((rgb, name))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> AtlasTables {
        AtlasTables::load_embedded().unwrap()
    }

    #[test]
    fn test_default_table_contents() {
        let tables = tables();
        let table = tables.default_table();
        assert_eq!(table.len(), 830);
        assert_eq!(table.get(&Rgb::new(0, 156, 112)).map(String::as_str), Some("GU_6b"));
    }

    #[test]
    fn test_default_gray_matter_excludes_tracts_and_ventricles() {
        let tables = tables();
        assert_eq!(tables.default_gray_matter().len(), 689);
        for (rgb, name) in tables.default_table() {
            let gray = tables.default_gray_matter().contains(&rgb.index());
            assert_eq!(gray, !tables.is_non_gray_matter(name), "{name}");
        }
    }

    #[test]
    fn test_custom_layers_loaded() {
        let tables = tables();
        assert_eq!(tables.layer(ColorLayer::CprVoronoi).len(), 5);
        assert_eq!(tables.layer(ColorLayer::CpiVoronoi).len(), 15);
        assert!(tables.layer(ColorLayer::Dp).is_empty());
    }

    #[test]
    fn test_legacy_rename() {
        let tables = tables();
        assert_eq!(tables.legacy_rename("AON_"), Some("AON"));
        assert_eq!(tables.legacy_rename("Ald_6b"), Some("AId_6b"));
        assert_eq!(tables.legacy_rename("AON"), None);
    }

    #[test]
    fn test_known_regions_include_custom_groups() {
        let known = tables().known_regions();
        assert!(known.contains("GU_6b"));
        assert!(known.contains("CPr.imv"));
        assert!(known.contains("ACBsh.m"));
    }

    #[test]
    fn test_malformed_color_key_is_reported() {
        let err = parse_color_table("broken", r#"{"1:2": "X"}"#).unwrap_err();
        assert!(matches!(err, AtlasError::Table { .. }));
    }
}
