// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# connlens-connectivity

Tracer overlap measurements in, atlas-complete connectivity tables out.

- [`OverlapParser`]: header and record parsing of one measurement file
- [`LevelConnectivity`]: one section level joined against the region registry
- [`TracerConnectivity`]: every level of one case/channel, checked and merged
- [`ConnectivityBuilder`]: case/series discovery over input directories

```rust,no_run
use connlens_connectivity::{ConnectivityBuilder, ConnectivityContext, IngestSettings, TracerOptions};

let context = ConnectivityContext::new(IngestSettings::default())?;
let builder = ConnectivityBuilder::new(&context, TracerOptions::default());
for tracer in builder.build(&["/data/SW160120"])? {
    println!("{}: {:?}", tracer.case_tracer(false)?, tracer.top_overlap_regions(5));
}
# Ok::<(), connlens_connectivity::ConnectivityError>(())
```
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod builder;
pub mod context;
pub mod error;
pub mod injection;
pub mod level;
pub mod metadata;
pub mod parser;
pub mod tracer;
pub mod tracers;

pub use builder::{group_files, ConnectivityBuilder};
pub use context::{ConnectivityContext, IngestSettings};
pub use error::{ConnectivityError, ConnectivityResult};
pub use injection::{InjectionSiteMap, InjectionSiteOverride};
pub use level::{LevelConnectivity, LevelRow};
pub use metadata::{MeasurementMetadata, MetadataKey};
pub use parser::{
    FileHeader, Hemisphere, MeasurementFile, MeasurementRecord, OverlapParser, ParseDiagnostic,
    ParsedData, DATA_SENTINEL,
};
pub use tracer::{ConnectivityRow, LevelTableRow, SkippedFile, TracerConnectivity, TracerOptions};
pub use tracers::{Tracer, TracerCatalog, TracerTransport};
