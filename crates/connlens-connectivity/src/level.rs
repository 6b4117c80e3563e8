// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Connectivity of a single section level, read from one measurement file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use connlens_atlas::{AtlasId, RegionIndex, RegionRegistry};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::ConnectivityContext;
use crate::error::{ConnectivityError, ConnectivityResult};
use crate::metadata::MeasurementMetadata;
use crate::parser::{Hemisphere, MeasurementFile, OverlapParser, ParseDiagnostic};
use crate::tracers::TracerTransport;

/// One region/hemisphere measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelRow {
    pub index: RegionIndex,
    pub hemisphere: Hemisphere,
    pub atlas_only: f64,
    pub overlap: f64,
    pub area: f64,
}

#[derive(Debug, Clone)]
pub struct LevelConnectivity {
    path: PathBuf,
    metadata: MeasurementMetadata,
    level: u32,
    tracer: String,
    transport: Option<TracerTransport>,
    cell_count: bool,
    atlas: AtlasId,
    registry: Arc<RegionRegistry>,
    rows: Vec<LevelRow>,
    diagnostics: Vec<ParseDiagnostic>,
}

impl LevelConnectivity {
    /// Read and parse one region-mode measurement file.
    ///
    /// # Errors
    ///
    /// `NotRegionMode`, `UnsupportedFileVersion` and `UnknownTracer` reject the
    /// file; malformed records and bad metadata are reported as such.
    pub fn open(path: &Path, context: &ConnectivityContext) -> ConnectivityResult<Self> {
        if OverlapParser::for_path(path) != OverlapParser::Region {
            return Err(ConnectivityError::NotRegionMode {
                path: path.to_path_buf(),
            });
        }

        let file = MeasurementFile::read(path)?;
        let settings = context.settings();
        let header = file.header(settings.header_scan_lines);
        file.parser.validate(&header, path)?;

        let tracer_name = header.metadata.tracer_name().unwrap_or_default();
        let tracer = context
            .tracers()
            .get(tracer_name)
            .ok_or_else(|| ConnectivityError::UnknownTracer {
                path: path.to_path_buf(),
                tracer: tracer_name.to_string(),
            })?;

        let level = header.metadata.level(path)?;
        let atlas = header.metadata.atlas(settings.default_atlas)?;
        let registry = context.registry(atlas);

        let data = file
            .parser
            .parse_data(&file.lines, &header, &registry, context.tables(), path)?;

        let rows: Vec<LevelRow> = data
            .records
            .iter()
            .filter_map(|record| {
                registry.index_of(&record.region).map(|index| LevelRow {
                    index,
                    hemisphere: record.hemisphere,
                    atlas_only: record.atlas_only,
                    overlap: record.overlap,
                    area: record.area,
                })
            })
            .collect();

        let cell_count =
            !tracer.is_anterograde() && path.to_string_lossy().ends_with("cellcount.csv");

        debug!(
            target: "connlens-connectivity",
            "{}: level {} tracer {} atlas {} rows {}",
            path.display(),
            level,
            tracer.name,
            atlas,
            rows.len()
        );

        Ok(Self {
            path: path.to_path_buf(),
            level,
            tracer: tracer.name.clone(),
            transport: tracer.transport,
            cell_count,
            atlas,
            registry,
            rows,
            diagnostics: data.diagnostics,
            metadata: header.metadata,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metadata(&self) -> &MeasurementMetadata {
        &self.metadata
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn tracer(&self) -> &str {
        &self.tracer
    }

    pub fn transport(&self) -> Option<TracerTransport> {
        self.transport
    }

    pub fn is_anterograde(&self) -> bool {
        matches!(
            self.transport,
            Some(TracerTransport::Anterograde | TracerTransport::Either)
        )
    }

    /// Retrograde cell counts are stored in files ending in `cellcount.csv`
    pub fn is_cell_count(&self) -> bool {
        self.cell_count
    }

    pub fn atlas(&self) -> AtlasId {
        self.atlas
    }

    pub fn registry(&self) -> &Arc<RegionRegistry> {
        &self.registry
    }

    pub fn diagnostics(&self) -> &[ParseDiagnostic] {
        &self.diagnostics
    }

    pub fn all_rows(&self) -> &[LevelRow] {
        &self.rows
    }

    pub fn gray_matter_rows(&self) -> impl Iterator<Item = &LevelRow> + '_ {
        self.rows
            .iter()
            .filter(|row| self.registry.is_gray_matter(row.index))
    }

    pub fn connectivity(&self, gray_matter: bool) -> Vec<LevelRow> {
        if gray_matter {
            self.gray_matter_rows().copied().collect()
        } else {
            self.rows.clone()
        }
    }
}
