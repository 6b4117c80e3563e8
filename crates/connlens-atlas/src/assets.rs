// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Atlas asset resolution.
//!
//! Assets live under a configurable root:
//!
//! ```text
//! <root>/                                  RGB atlases
//! <root>/full_black_borders/               wireframes
//! <root>/annotated_bw_atlas/               black/white annotated atlases
//! <root>/annotated_color_atlas/            color annotated atlases
//! ```
//!
//! Custom atlases add `<subdir>/<version>/` below each of those. A custom
//! atlas missing an asset at some level falls back to the default atlas.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::atlas::AtlasId;
use crate::codec::{index_atlas, ColorCodec};
use crate::color::RegionIndex;
use crate::error::{AtlasError, AtlasResult};
use crate::tables::AtlasTables;

/// Coronal section level of the reference atlas, 1..=132
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtlasLevel(u16);

impl AtlasLevel {
    pub const MIN: u16 = 1;
    pub const MAX: u16 = 132;

    pub fn new(level: u16) -> AtlasResult<Self> {
        if (Self::MIN..=Self::MAX).contains(&level) {
            Ok(Self(level))
        } else {
            Err(AtlasError::InvalidLevel(level.to_string()))
        }
    }

    pub fn get(self) -> u16 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = AtlasLevel> {
        (Self::MIN..=Self::MAX).map(AtlasLevel)
    }
}

impl FromStr for AtlasLevel {
    type Err = AtlasError;

    /// Only the three digit form (`007`) is accepted.
    fn from_str(s: &str) -> AtlasResult<Self> {
        if s.len() != 3 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AtlasError::InvalidLevel(s.to_string()));
        }
        let level = s
            .parse::<u16>()
            .map_err(|_| AtlasError::InvalidLevel(s.to_string()))?;
        Self::new(level)
    }
}

impl fmt::Display for AtlasLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

/// Kinds of per-level atlas images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AtlasAssetType {
    RgbAtlas,
    Wireframe,
    AnnotatedBwAtlas,
    AnnotatedColorAtlas,
}

impl AtlasAssetType {
    /// Directory below the asset root holding this asset type
    pub fn root_subdir(self) -> &'static str {
        match self {
            AtlasAssetType::RgbAtlas => "",
            AtlasAssetType::Wireframe => "full_black_borders",
            AtlasAssetType::AnnotatedBwAtlas => "annotated_bw_atlas",
            AtlasAssetType::AnnotatedColorAtlas => "annotated_color_atlas",
        }
    }

    /// File name of this asset for an atlas at a level
    pub fn file_name(self, atlas: AtlasId, level: AtlasLevel) -> String {
        match self {
            AtlasAssetType::RgbAtlas => format!("{}{}", level, rgb_postfix(atlas)),
            AtlasAssetType::Wireframe => wireframe_format(atlas).replace("{}", &level.to_string()),
            AtlasAssetType::AnnotatedBwAtlas | AtlasAssetType::AnnotatedColorAtlas => {
                annotation_format(atlas).replace("{}", &level.to_string())
            }
        }
    }
}

impl fmt::Display for AtlasAssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AtlasAssetType::RgbAtlas => "rgb atlas",
            AtlasAssetType::Wireframe => "wireframe",
            AtlasAssetType::AnnotatedBwAtlas => "annotated bw atlas",
            AtlasAssetType::AnnotatedColorAtlas => "annotated color atlas",
        };
        f.write_str(name)
    }
}

fn rgb_postfix(atlas: AtlasId) -> &'static str {
    match atlas {
        AtlasId::Ara => "_2013_rgb-01_append.tif",
        AtlasId::CpVoronoi | AtlasId::CpcVoronoi | AtlasId::CpiVoronoi | AtlasId::CprVoronoi => {
            "_cp_voronoi.tif"
        }
        AtlasId::BlaaDivisions => "_ARA-Coronal-BLAA_Divisions.tif",
        AtlasId::Dp => "_dp.tif",
        AtlasId::ScDivisions => "_SC_rgb_atlas.tif",
    }
}

fn wireframe_format(atlas: AtlasId) -> &'static str {
    match atlas {
        AtlasId::Ara => "{}_ARA_borders.tif",
        AtlasId::BlaaDivisions | AtlasId::CpVoronoi => "{}_borders.tif",
        AtlasId::CpcVoronoi | AtlasId::CpiVoronoi | AtlasId::CprVoronoi => "{}_cp_voronoi.tif",
        // TODO: replace once DP and SC wireframes are generated
        AtlasId::Dp | AtlasId::ScDivisions => "todo_{}.tif",
    }
}

fn annotation_format(atlas: AtlasId) -> &'static str {
    match atlas {
        AtlasId::Ara => "ARA-Coronal-{}_full_labels.tif",
        AtlasId::CpcVoronoi | AtlasId::CpiVoronoi | AtlasId::CprVoronoi => "{}_cp_voronoi.tif",
        AtlasId::BlaaDivisions | AtlasId::CpVoronoi | AtlasId::Dp | AtlasId::ScDivisions => {
            "todo_{}.tif"
        }
    }
}

/// Directory name of a custom atlas below each asset type root
pub fn atlas_subdir(atlas: AtlasId) -> PathBuf {
    let name = match atlas {
        AtlasId::Ara => return PathBuf::new(),
        AtlasId::CpVoronoi => "cp_voronoi",
        AtlasId::CprVoronoi => "cpr_voronoi",
        AtlasId::CpiVoronoi => "cpi_voronoi",
        AtlasId::CpcVoronoi => "cpc_voronoi",
        AtlasId::BlaaDivisions => "blaa_divisions",
        AtlasId::Dp => "dp",
        AtlasId::ScDivisions => "sc",
    };
    Path::new(name).join(atlas.version())
}

/// The asset actually used, which may belong to the default atlas after fallback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    pub atlas: AtlasId,
    pub path: PathBuf,
}

impl ResolvedAsset {
    pub fn is_fallback(&self, requested: AtlasId) -> bool {
        self.atlas != requested
    }
}

/// Maps (atlas, level, asset type) to files under an asset root
#[derive(Debug, Clone)]
pub struct AssetResolver {
    root: PathBuf,
}

impl AssetResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn asset_dir(&self, asset_type: AtlasAssetType, atlas: AtlasId) -> PathBuf {
        self.root
            .join(asset_type.root_subdir())
            .join(atlas_subdir(atlas))
    }

    /// Expected location of an asset, without checking that it exists
    pub fn asset_path(&self, asset_type: AtlasAssetType, atlas: AtlasId, level: AtlasLevel) -> PathBuf {
        self.asset_dir(asset_type, atlas)
            .join(asset_type.file_name(atlas, level))
    }

    /// Locate an asset, falling back to the default atlas when the requested one has no file.
    pub fn resolve(
        &self,
        level: AtlasLevel,
        asset_type: AtlasAssetType,
        atlas: AtlasId,
    ) -> AtlasResult<ResolvedAsset> {
        let path = self.asset_path(asset_type, atlas, level);
        if path.is_file() {
            return Ok(ResolvedAsset { atlas, path });
        }

        let fallback = self.asset_path(asset_type, AtlasId::DEFAULT, level);
        if fallback.is_file() {
            if !atlas.is_default() {
                debug!(
                    target: "connlens-atlas",
                    "No {} for {} level {}, using {}",
                    asset_type, atlas, level, AtlasId::DEFAULT
                );
            }
            return Ok(ResolvedAsset {
                atlas: AtlasId::DEFAULT,
                path: fallback,
            });
        }

        Err(AtlasError::AssetNotFound {
            asset: asset_type.to_string(),
            atlas: atlas.to_string(),
            level: level.to_string(),
            path: fallback,
        })
    }

    /// Location of the precomputed per-level region index for an atlas
    pub fn level_rois_path(&self, atlas: AtlasId) -> PathBuf {
        self.asset_dir(AtlasAssetType::RgbAtlas, atlas)
            .join(format!("{}_level_rois.json", atlas))
    }

    /// Indices present in the RGB atlas image for a level
    pub fn level_indices(
        &self,
        level: AtlasLevel,
        atlas: AtlasId,
    ) -> AtlasResult<(ResolvedAsset, BTreeSet<RegionIndex>)> {
        let resolved = self.resolve(level, AtlasAssetType::RgbAtlas, atlas)?;
        let image = image::open(&resolved.path)
            .map_err(|e| AtlasError::Image {
                path: resolved.path.clone(),
                message: e.to_string(),
            })?
            .to_rgb8();
        let indices = index_atlas(&image).iter().map(|&i| RegionIndex(i)).collect();
        Ok((resolved, indices))
    }

    /// For each index, the levels whose RGB atlas contains it
    pub fn levels_containing(
        &self,
        atlas: AtlasId,
        indices: &[RegionIndex],
        levels: impl IntoIterator<Item = AtlasLevel>,
    ) -> AtlasResult<BTreeMap<RegionIndex, Vec<AtlasLevel>>> {
        let mut found: BTreeMap<RegionIndex, Vec<AtlasLevel>> =
            indices.iter().map(|&index| (index, Vec::new())).collect();
        for level in levels {
            let (_, present) = self.level_indices(level, atlas)?;
            for (index, hits) in found.iter_mut() {
                if present.contains(index) {
                    debug!(target: "connlens-atlas", "Found {} at {} level {}", index, atlas, level);
                    hits.push(level);
                }
            }
        }
        Ok(found)
    }
}

/// Region names present at each level of an atlas, keyed by the three digit level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelRoiIndex {
    levels: BTreeMap<String, Vec<String>>,
}

impl LevelRoiIndex {
    /// Scan the RGB atlas of every level and name the regions found.
    ///
    /// Names come from the codec of the atlas each image was resolved to.
    pub fn build(
        resolver: &AssetResolver,
        tables: &AtlasTables,
        atlas: AtlasId,
        levels: impl IntoIterator<Item = AtlasLevel>,
    ) -> AtlasResult<Self> {
        let mut codecs: BTreeMap<AtlasId, ColorCodec> = BTreeMap::new();
        let mut index = BTreeMap::new();

        for level in levels {
            let (resolved, present) = resolver.level_indices(level, atlas)?;
            let codec = codecs
                .entry(resolved.atlas)
                .or_insert_with(|| ColorCodec::new(resolved.atlas, tables));

            let mut names = Vec::with_capacity(present.len());
            for region_index in present {
                match codec.region_of_index(region_index) {
                    Some(name) => names.push(name.to_string()),
                    None => warn!(
                        target: "connlens-atlas",
                        "Unknown color {} in {}",
                        region_index.color(),
                        resolved.path.display()
                    ),
                }
            }
            index.insert(level.to_string(), names);
        }

        info!(target: "connlens-atlas", "Indexed {} levels of {}", index.len(), atlas);
        Ok(Self { levels: index })
    }

    pub fn load(path: &Path) -> AtlasResult<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|source| AtlasError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> AtlasResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self).map_err(|source| AtlasError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Regions at a level; bilateral mode lists `<name>_ipsi` and `<name>_contra` instead.
    pub fn level_rois(&self, level: AtlasLevel, bilateral: bool) -> AtlasResult<BTreeSet<String>> {
        let key = level.to_string();
        let names = self
            .levels
            .get(&key)
            .ok_or_else(|| AtlasError::MissingLevel(key.clone()))?;
        if !bilateral {
            return Ok(names.iter().cloned().collect());
        }
        Ok(names
            .iter()
            .flat_map(|name| [format!("{}_ipsi", name), format!("{}_contra", name)])
            .collect())
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn level(n: u16) -> AtlasLevel {
        AtlasLevel::new(n).unwrap()
    }

    #[test]
    fn test_level_formatting() {
        assert_eq!(level(7).to_string(), "007");
        assert_eq!(level(132).to_string(), "132");
        assert_eq!("045".parse::<AtlasLevel>().unwrap(), level(45));
    }

    #[test]
    fn test_level_validation() {
        assert!(AtlasLevel::new(0).is_err());
        assert!(AtlasLevel::new(133).is_err());
        assert!("45".parse::<AtlasLevel>().is_err());
        assert!("0a5".parse::<AtlasLevel>().is_err());
        assert!("000".parse::<AtlasLevel>().is_err());
        assert_eq!(AtlasLevel::all().count(), 132);
    }

    #[test]
    fn test_asset_naming() {
        let l = level(51);
        assert_eq!(
            AtlasAssetType::RgbAtlas.file_name(AtlasId::Ara, l),
            "051_2013_rgb-01_append.tif"
        );
        assert_eq!(
            AtlasAssetType::Wireframe.file_name(AtlasId::Ara, l),
            "051_ARA_borders.tif"
        );
        assert_eq!(
            AtlasAssetType::AnnotatedColorAtlas.file_name(AtlasId::Ara, l),
            "ARA-Coronal-051_full_labels.tif"
        );
        assert_eq!(
            AtlasAssetType::RgbAtlas.file_name(AtlasId::ScDivisions, l),
            "051_SC_rgb_atlas.tif"
        );
    }

    #[test]
    fn test_asset_dirs() {
        let resolver = AssetResolver::new("/atlas");
        assert_eq!(
            resolver.asset_dir(AtlasAssetType::RgbAtlas, AtlasId::Ara),
            PathBuf::from("/atlas")
        );
        assert_eq!(
            resolver.asset_dir(AtlasAssetType::Wireframe, AtlasId::CprVoronoi),
            PathBuf::from("/atlas/full_black_borders/cpr_voronoi/v2")
        );
        assert_eq!(
            resolver.level_rois_path(AtlasId::ScDivisions),
            PathBuf::from("/atlas/sc/v3/SC_DIVISIONS_level_rois.json")
        );
    }

    #[test]
    fn test_resolve_prefers_requested_atlas() {
        let dir = tempdir().unwrap();
        let resolver = AssetResolver::new(dir.path());
        let path = resolver.asset_path(AtlasAssetType::RgbAtlas, AtlasId::Dp, level(10));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"").unwrap();

        let resolved = resolver
            .resolve(level(10), AtlasAssetType::RgbAtlas, AtlasId::Dp)
            .unwrap();
        assert_eq!(resolved.atlas, AtlasId::Dp);
        assert_eq!(resolved.path, path);
        assert!(!resolved.is_fallback(AtlasId::Dp));
    }

    #[test]
    fn test_resolve_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let resolver = AssetResolver::new(dir.path());
        let default_path = resolver.asset_path(AtlasAssetType::RgbAtlas, AtlasId::Ara, level(10));
        fs::write(&default_path, b"").unwrap();

        let resolved = resolver
            .resolve(level(10), AtlasAssetType::RgbAtlas, AtlasId::BlaaDivisions)
            .unwrap();
        assert_eq!(resolved.atlas, AtlasId::Ara);
        assert_eq!(resolved.path, default_path);
        assert!(resolved.is_fallback(AtlasId::BlaaDivisions));
    }

    #[test]
    fn test_resolve_fails_without_default() {
        let dir = tempdir().unwrap();
        let resolver = AssetResolver::new(dir.path());
        let err = resolver
            .resolve(level(10), AtlasAssetType::Wireframe, AtlasId::CpVoronoi)
            .unwrap_err();
        assert!(matches!(err, AtlasError::AssetNotFound { .. }));
    }

    #[test]
    fn test_level_rois_bilateral() {
        let mut levels = BTreeMap::new();
        levels.insert("012".to_string(), vec!["GU_6b".to_string(), "AQ".to_string()]);
        let index = LevelRoiIndex { levels };

        let plain = index.level_rois(level(12), false).unwrap();
        assert_eq!(plain.len(), 2);
        let bilateral = index.level_rois(level(12), true).unwrap();
        assert!(bilateral.contains("GU_6b_ipsi"));
        assert!(bilateral.contains("AQ_contra"));
        assert_eq!(bilateral.len(), 4);
        assert!(index.level_rois(level(13), false).is_err());
    }
}
