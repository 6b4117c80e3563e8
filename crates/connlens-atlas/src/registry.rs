// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Region registry: the realized index/name mapping for one atlas plus its
//! gray-matter classification.

use std::collections::{BTreeMap, BTreeSet};

use ahash::AHashMap;

use crate::atlas::AtlasId;
use crate::codec::ColorCodec;
use crate::color::RegionIndex;
use crate::tables::AtlasTables;

/// Index/name tables and gray-matter set for one atlas.
///
/// Two registries are equal when they serve the same atlas; contents are not compared.
#[derive(Debug, Clone)]
pub struct RegionRegistry {
    atlas: AtlasId,
    index_to_name: BTreeMap<RegionIndex, String>,
    name_to_index: AHashMap<String, RegionIndex>,
    gray_matter: BTreeSet<RegionIndex>,
}

impl RegionRegistry {
    /// Realize the registry from the codec's active color table.
    ///
    /// A region is gray matter only if its index is gray matter in the default atlas,
    /// so custom-only colors are never classified as gray matter.
    pub fn from_codec(codec: &ColorCodec, tables: &AtlasTables) -> Self {
        let default_gray = tables.default_gray_matter();
        let mut index_to_name = BTreeMap::new();
        let mut name_to_index = AHashMap::new();
        let mut gray_matter = BTreeSet::new();

        for (rgb, name) in codec.table() {
            let index = rgb.index();
            index_to_name.insert(index, name.clone());
            name_to_index.insert(name.clone(), index);
            if default_gray.contains(&index) {
                gray_matter.insert(index);
            }
        }

        Self {
            atlas: codec.atlas(),
            index_to_name,
            name_to_index,
            gray_matter,
        }
    }

    pub fn new(atlas: AtlasId, tables: &AtlasTables) -> Self {
        Self::from_codec(&ColorCodec::new(atlas, tables), tables)
    }

    pub fn atlas(&self) -> AtlasId {
        self.atlas
    }

    pub fn index_of(&self, region: &str) -> Option<RegionIndex> {
        self.name_to_index.get(region).copied()
    }

    pub fn name_of(&self, index: RegionIndex) -> Option<&str> {
        self.index_to_name.get(&index).map(String::as_str)
    }

    pub fn contains(&self, region: &str) -> bool {
        self.name_to_index.contains_key(region)
    }

    pub fn is_gray_matter(&self, index: RegionIndex) -> bool {
        self.gray_matter.contains(&index)
    }

    /// Gray-matter indices in ascending order
    pub fn gray_matter(&self) -> &BTreeSet<RegionIndex> {
        &self.gray_matter
    }

    pub fn len(&self) -> usize {
        self.index_to_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index_to_name.is_empty()
    }

    pub fn regions(&self) -> impl Iterator<Item = (RegionIndex, &str)> {
        self.index_to_name
            .iter()
            .map(|(index, name)| (*index, name.as_str()))
    }
}

impl PartialEq for RegionRegistry {
    fn eq(&self, other: &Self) -> bool {
        self.atlas == other.atlas
    }
}

impl Eq for RegionRegistry {}
