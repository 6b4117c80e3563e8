// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Color, index and region name translation for one atlas scope.

use ahash::AHashMap;
use image::RgbImage;
use ndarray::Array2;
use tracing::{debug, warn};

use crate::atlas::{AtlasId, ColorLayer};
use crate::color::{RegionIndex, Rgb};
use crate::error::AtlasResult;
use crate::tables::{AtlasTables, ColorTable};

/// A color key that was overwritten while layering a custom atlas
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorConflict {
    pub color: Rgb,
    pub previous: String,
    pub replacement: String,
    pub layer: ColorLayer,
}

/// Bidirectional color/index/name lookup for one atlas.
///
/// Equality compares the atlas id only.
#[derive(Debug, Clone)]
pub struct ColorCodec {
    atlas: AtlasId,
    color_to_region: ColorTable,
    region_to_color: AHashMap<String, Rgb>,
    conflicts: Vec<ColorConflict>,
}

impl ColorCodec {
    pub fn new(atlas: AtlasId, tables: &AtlasTables) -> Self {
        let mut color_to_region = if atlas.is_default() || !atlas.clears_default() {
            tables.default_table().clone()
        } else {
            ColorTable::new()
        };

        let mut conflicts = Vec::new();
        if !atlas.is_default() {
            for &layer in atlas.layers() {
                for (rgb, name) in tables.layer(layer) {
                    if let Some(previous) = color_to_region.insert(*rgb, name.clone()) {
                        warn!(
                            target: "connlens-atlas",
                            "rgb code clash in {}: {} was {}, now {}",
                            atlas, rgb, previous, name
                        );
                        conflicts.push(ColorConflict {
                            color: *rgb,
                            previous,
                            replacement: name.clone(),
                            layer,
                        });
                    }
                }
            }
        }

        let region_to_color = color_to_region
            .iter()
            .map(|(rgb, name)| (name.clone(), *rgb))
            .collect();

        debug!(
            target: "connlens-atlas",
            "Built color codec for {} with {} colors",
            atlas,
            color_to_region.len()
        );

        Self {
            atlas,
            color_to_region,
            region_to_color,
            conflicts,
        }
    }

    /// Build a codec from an atlas key as written in measurement files
    pub fn from_name(name: &str, tables: &AtlasTables) -> AtlasResult<Self> {
        Ok(Self::new(name.parse()?, tables))
    }

    pub fn atlas(&self) -> AtlasId {
        self.atlas
    }

    /// Active color table, ordered by index
    pub fn table(&self) -> &ColorTable {
        &self.color_to_region
    }

    pub fn conflicts(&self) -> &[ColorConflict] {
        &self.conflicts
    }

    pub fn region_of_color(&self, rgb: Rgb) -> Option<&str> {
        self.color_to_region.get(&rgb).map(String::as_str)
    }

    pub fn region_of_index(&self, index: RegionIndex) -> Option<&str> {
        self.region_of_color(index.color())
    }

    pub fn color_of_region(&self, region: &str) -> Option<Rgb> {
        self.region_to_color.get(region).copied()
    }

    pub fn index_of_region(&self, region: &str) -> Option<RegionIndex> {
        self.color_of_region(region).map(Rgb::index)
    }

    /// Region name, or the `??!R:G:B!??` marker when the color is not in the table
    pub fn describe_color(&self, rgb: Rgb) -> String {
        match self.region_of_color(rgb) {
            Some(name) => name.to_string(),
            None => format!("??!{}!??", rgb),
        }
    }

    pub fn describe_colors(&self, colors: &[Rgb]) -> Vec<String> {
        colors.iter().map(|&rgb| self.describe_color(rgb)).collect()
    }
}

impl PartialEq for ColorCodec {
    fn eq(&self, other: &Self) -> bool {
        self.atlas == other.atlas
    }
}

impl Eq for ColorCodec {}

/// Convert an RGB atlas image into a per-pixel region index grid of shape (height, width).
pub fn index_atlas(image: &RgbImage) -> Array2<u32> {
    let (width, height) = image.dimensions();
    Array2::from_shape_fn((height as usize, width as usize), |(row, col)| {
        let pixel = image.get_pixel(col as u32, row as u32);
        Rgb::from(pixel.0).index().0
    })
}
