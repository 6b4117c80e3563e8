// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # connlens - atlas-complete tracer connectivity
//!
//! connlens reads per-section tracer overlap measurements and turns every
//! tracer injection into one canonical table: each gray-matter region of the
//! atlas, in both hemispheres, with summed overlap and area.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! connlens = "0.1"
//! ```
//!
//! ```rust,no_run
//! use connlens::prelude::*;
//!
//! let config = load_config(None, None)?;
//! let context = ConnectivityContext::from_config(&config)?;
//! let builder = ConnectivityBuilder::new(&context, TracerOptions::default());
//!
//! for tracer in builder.build(&["/data/SW160120"])? {
//!     let id = tracer.case_tracer(true)?;
//!     println!("{id}: {:?}", tracer.top_overlap_regions(10));
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Feature Flags
//!
//! - **`observability`** (default): logging setup through `connlens-observability`
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: connlens-config, connlens-observability    │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Atlas: connlens-atlas                                  │
//! │  (color codec, region registry, asset resolver)         │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Measurements: connlens-connectivity                    │
//! │  (parser, level/tracer aggregation, builder)            │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

pub use connlens_atlas as atlas;
pub use connlens_config as config;
pub use connlens_connectivity as connectivity;

#[cfg(feature = "observability")]
pub use connlens_observability as observability;

/// Prelude - commonly used types and functions
pub mod prelude {
    pub use crate::atlas::{AssetResolver, AtlasId, AtlasTables, ColorCodec, RegionIndex, RegionRegistry, Rgb};
    pub use crate::config::{load_config, validate_config, ConnlensConfig};
    pub use crate::connectivity::{
        ConnectivityBuilder, ConnectivityContext, ConnectivityError, Hemisphere, IngestSettings,
        InjectionSiteMap, InjectionSiteOverride, LevelConnectivity, TracerConnectivity,
        TracerOptions,
    };

    #[cfg(feature = "observability")]
    pub use crate::observability::{init_logging, parse_debug_flags, CrateDebugFlags, LoggingOptions};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_facade_imports() {
        use crate::prelude::*;
        let color = Rgb::new(0, 156, 112);
        assert_eq!(RegionIndex::from(color).color(), color);
        assert_eq!(AtlasId::DEFAULT, AtlasId::Ara);
    }
}
