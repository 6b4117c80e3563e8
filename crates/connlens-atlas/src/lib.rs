// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# connlens-atlas

Atlas-side lookups for connectivity aggregation:

- [`Rgb`] / [`RegionIndex`]: packed colors and the integer index they encode
- [`ColorCodec`]: color, index and region name translation for one atlas,
  with custom atlas layers replacing or overlaying the default table
- [`RegionRegistry`]: index/name tables plus gray-matter classification
- [`AssetResolver`]: per-level atlas image lookup with default-atlas fallback

All static data lives in [`AtlasTables`], loaded once and shared.

```rust
use connlens_atlas::{AtlasId, AtlasTables, RegionRegistry};

let tables = AtlasTables::load_embedded().unwrap();
let registry = RegionRegistry::new(AtlasId::Ara, &tables);
assert!(registry.contains("GU_6b"));
```
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod assets;
pub mod atlas;
pub mod codec;
pub mod color;
pub mod error;
pub mod registry;
pub mod tables;

pub use assets::{AssetResolver, AtlasAssetType, AtlasLevel, LevelRoiIndex, ResolvedAsset};
pub use atlas::{available_atlases, AtlasId, ColorLayer};
pub use codec::{index_atlas, ColorCodec, ColorConflict};
pub use color::{RegionIndex, Rgb};
pub use error::{AtlasError, AtlasResult};
pub use registry::RegionRegistry;
pub use tables::{AtlasTables, ColorTable};
