// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Atlas-complete connectivity of one tracer injection.

All level files of one case/channel are parsed, checked for agreement and
merged into a table holding one row per (gray-matter region, hemisphere),
including regions no level observed.
*/

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use connlens_atlas::{AtlasId, RegionIndex, RegionRegistry};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::context::ConnectivityContext;
use crate::error::{ConnectivityError, ConnectivityResult};
use crate::injection::InjectionSiteOverride;
use crate::level::{LevelConnectivity, LevelRow};
use crate::metadata::MeasurementMetadata;
use crate::parser::Hemisphere;
use crate::tracers::TracerTransport;

/// Case id without the series letter, e.g. `SW160120-01` of `SW160120-01B`
static CASE_ID: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2}[0-9]{6}-[0-9]{2}"));

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TracerOptions {
    pub injection_site: Option<InjectionSiteOverride>,
    pub injection_site_level: Option<u32>,
}

/// One row of the aggregated table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectivityRow {
    /// Region name with `_c` (left) or `_i` (right)
    pub label: String,
    pub index: RegionIndex,
    pub hemisphere: Hemisphere,
    pub overlap: f64,
    pub area: f64,
}

/// Gray-matter row of one level, zeroed when the level is masked
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelTableRow {
    pub level: u32,
    #[serde(flatten)]
    pub row: LevelRow,
}

/// A file left out of the aggregation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct TracerConnectivity {
    directory: PathBuf,
    metadata: MeasurementMetadata,
    case: String,
    channel: String,
    tracer: String,
    transport: Option<TracerTransport>,
    cell_count: bool,
    atlas: AtlasId,
    registry: Arc<RegionRegistry>,
    injection_site: Option<String>,
    injection_site_level: Option<u32>,
    levels: BTreeMap<u32, LevelConnectivity>,
    level_subset: Option<BTreeSet<u32>>,
    table: Vec<ConnectivityRow>,
    skipped: Vec<SkippedFile>,
}

impl TracerConnectivity {
    /// Aggregate the level files of one case/channel.
    ///
    /// `files` names the files inside `directory`; when `None`, every file
    /// with the configured extension is used.
    ///
    /// # Errors
    ///
    /// Fails when no level survives, two files share a level, or the levels
    /// disagree on their metadata. Unsupported files are skipped instead.
    pub fn open(
        directory: &Path,
        files: Option<&[String]>,
        context: &ConnectivityContext,
        options: &TracerOptions,
    ) -> ConnectivityResult<Self> {
        if !directory.is_dir() {
            return Err(ConnectivityError::InvalidDirectory {
                path: directory.to_path_buf(),
            });
        }

        let mut names = match files {
            Some(files) => files.to_vec(),
            None => list_files(directory, context)?,
        };
        names.sort();

        let mut levels: BTreeMap<u32, LevelConnectivity> = BTreeMap::new();
        let mut skipped = Vec::new();
        for name in &names {
            let path = directory.join(name);
            let level = match LevelConnectivity::open(&path, context) {
                Ok(level) => level,
                Err(e) if e.is_file_rejection() => {
                    warn!(target: "connlens-connectivity", "Skipping {}", e);
                    skipped.push(SkippedFile {
                        path,
                        reason: e.to_string(),
                    });
                    continue;
                }
                Err(e) => return Err(e),
            };
            if let Some(first) = levels.get(&level.level()) {
                return Err(ConnectivityError::DuplicateLevel {
                    level: level.level(),
                    first: first.path().to_path_buf(),
                    second: path,
                });
            }
            levels.insert(level.level(), level);
        }

        let Some(first) = levels.values().next() else {
            return Err(ConnectivityError::NoLevels {
                directory: directory.to_path_buf(),
            });
        };
        check_consistency(first, levels.values())?;

        let metadata = first.metadata().clone();
        let case = metadata.case_name.clone().unwrap_or_default();
        let channel = metadata.channel_number.clone().unwrap_or_default();
        let parsed_site = metadata.injection_site.as_deref();
        let injection_site = match &options.injection_site {
            Some(site) => site.resolve(parsed_site, &case, &channel),
            None => parsed_site.map(str::to_string),
        };

        let tracer_name = first.tracer().to_string();
        let transport = first.transport();
        let cell_count = first.is_cell_count();
        let atlas = first.atlas();
        let registry = Arc::clone(first.registry());

        let mut tracer = Self {
            directory: directory.to_path_buf(),
            tracer: tracer_name,
            transport,
            cell_count,
            atlas,
            registry,
            metadata,
            case,
            channel,
            injection_site,
            injection_site_level: options.injection_site_level,
            levels,
            level_subset: None,
            table: Vec::new(),
            skipped,
        };
        tracer.rebuild_table();

        info!(
            target: "connlens-connectivity",
            "Aggregated {} channel {} ({}): {} levels, {} rows, {} skipped",
            tracer.case,
            tracer.channel,
            tracer.tracer,
            tracer.levels.len(),
            tracer.table.len(),
            tracer.skipped.len()
        );
        Ok(tracer)
    }

    fn is_active(&self, level: u32) -> bool {
        self.level_subset
            .as_ref()
            .map_or(true, |subset| subset.contains(&level))
    }

    fn rebuild_table(&mut self) {
        let mut sums: BTreeMap<(RegionIndex, Hemisphere), (f64, f64)> = self
            .registry
            .gray_matter()
            .iter()
            .flat_map(|&index| Hemisphere::BOTH.map(|side| ((index, side), (0.0, 0.0))))
            .collect();

        for (&level, connectivity) in &self.levels {
            if !self.is_active(level) {
                continue;
            }
            for row in connectivity.gray_matter_rows() {
                if let Some((overlap, area)) = sums.get_mut(&(row.index, row.hemisphere)) {
                    *overlap += row.overlap;
                    *area += row.area;
                }
            }
        }

        self.table = sums
            .into_iter()
            .map(|((index, hemisphere), (overlap, area))| ConnectivityRow {
                label: format!(
                    "{}_{}",
                    self.registry.name_of(index).unwrap_or_default(),
                    hemisphere.side_suffix()
                ),
                index,
                hemisphere,
                overlap,
                area,
            })
            .collect();
    }

    /// Restrict aggregation to `levels`; `None` restores every level.
    pub fn set_level_subset(&mut self, levels: Option<BTreeSet<u32>>) {
        debug!(target: "connlens-connectivity", "{}: level subset {:?}", self.case, levels);
        self.level_subset = levels;
        self.rebuild_table();
    }

    /// Levels contributing to the table, ascending
    pub fn active_levels(&self) -> Vec<u32> {
        match &self.level_subset {
            Some(subset) => subset.iter().copied().collect(),
            None => self.levels.keys().copied().collect(),
        }
    }

    pub fn table(&self) -> &[ConnectivityRow] {
        &self.table
    }

    pub fn row(&self, label: &str) -> Option<&ConnectivityRow> {
        self.table.iter().find(|row| row.label == label)
    }

    /// Gray-matter rows of every level, tagged with their level
    pub fn connectivity_by_level(&self) -> Vec<LevelTableRow> {
        self.levels
            .iter()
            .flat_map(|(&level, connectivity)| {
                let active = self.is_active(level);
                connectivity.gray_matter_rows().map(move |&row| {
                    let row = if active {
                        row
                    } else {
                        LevelRow {
                            overlap: 0.0,
                            area: 0.0,
                            ..row
                        }
                    };
                    LevelTableRow { level, row }
                })
            })
            .collect()
    }

    /// Labels of the `n` rows with the highest overlap; ties keep table order
    pub fn top_overlap_regions(&self, n: usize) -> Vec<&str> {
        let mut rows: Vec<&ConnectivityRow> = self.table.iter().collect();
        rows.sort_by(|a, b| b.overlap.total_cmp(&a.overlap));
        rows.into_iter().take(n).map(|row| row.label.as_str()).collect()
    }

    /// `<case>_<tracer>`; with `series_insensitive` the series letter is dropped
    pub fn case_tracer(&self, series_insensitive: bool) -> ConnectivityResult<String> {
        if !series_insensitive {
            return Ok(format!("{}_{}", self.case, self.tracer));
        }
        let pattern = CASE_ID.as_ref().map_err(|e| ConnectivityError::Pattern(e.clone()))?;
        let case_id = pattern
            .find(&self.case)
            .ok_or_else(|| ConnectivityError::InvalidCaseName {
                case: self.case.clone(),
            })?;
        Ok(format!("{}_{}", case_id.as_str(), self.tracer))
    }

    pub fn set_injection_site(&mut self, site: impl Into<String>, level: Option<u32>) {
        self.injection_site = Some(site.into());
        self.injection_site_level = level;
    }

    pub fn injection_site(&self) -> Option<&str> {
        self.injection_site.as_deref()
    }

    pub fn injection_site_level(&self) -> Option<u32> {
        self.injection_site_level
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Metadata of the lowest level
    pub fn metadata(&self) -> &MeasurementMetadata {
        &self.metadata
    }

    pub fn project(&self) -> Option<&str> {
        self.metadata.project_name.as_deref()
    }

    pub fn case(&self) -> &str {
        &self.case
    }

    pub fn channel(&self) -> &str {
        &self.channel
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

    pub fn is_cell_count(&self) -> bool {
        self.cell_count
    }

    pub fn atlas(&self) -> AtlasId {
        self.atlas
    }

    pub fn registry(&self) -> &RegionRegistry {
        &self.registry
    }

    pub fn levels(&self) -> impl Iterator<Item = &LevelConnectivity> {
        self.levels.values()
    }

    pub fn level(&self, level: u32) -> Option<&LevelConnectivity> {
        self.levels.get(&level)
    }

    pub fn skipped_files(&self) -> &[SkippedFile] {
        &self.skipped
    }
}

fn list_files(directory: &Path, context: &ConnectivityContext) -> ConnectivityResult<Vec<String>> {
    let entries = fs::read_dir(directory).map_err(|e| ConnectivityError::io(directory, e))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConnectivityError::io(directory, e))?;
        if !entry.path().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if context.settings().has_extension(&name) {
            names.push(name);
        }
    }
    Ok(names)
}

/// Compare every level against the lowest one
fn check_consistency<'a>(
    first: &LevelConnectivity,
    levels: impl Iterator<Item = &'a LevelConnectivity>,
) -> ConnectivityResult<()> {
    let a = first.metadata();
    for level in levels {
        let b = level.metadata();
        let fields = [
            ("project", a.project_name == b.project_name),
            ("case", a.case_name == b.case_name),
            ("tracer", first.tracer() == level.tracer()),
            ("channel", a.channel_number == b.channel_number),
            ("injection site", a.injection_site == b.injection_site),
            ("anterograde", first.is_anterograde() == level.is_anterograde()),
            ("cell count", first.is_cell_count() == level.is_cell_count()),
            ("atlas", first.atlas() == level.atlas()),
        ];
        if let Some((field, _)) = fields.iter().find(|(_, same)| !same) {
            return Err(ConnectivityError::MetadataConsistency {
                case: a.case_name.clone().unwrap_or_default(),
                channel: a.channel_number.clone().unwrap_or_default(),
                first_level: first.level(),
                level: level.level(),
                field: *field,
            });
        }
    }
    Ok(())
}
