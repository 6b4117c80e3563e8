// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Discovery of case/series groups and batch aggregation.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use crate::context::{ConnectivityContext, IngestSettings};
use crate::error::{ConnectivityError, ConnectivityResult};
use crate::tracer::{TracerConnectivity, TracerOptions};

/// Case and series prefix of a measurement file name, e.g. `SW160120-01B`
static CASE_SERIES: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z]{2}[0-9]{6}-[0-9]{2}[A-Z]"));

/// Group the measurement files of `directory` by case/series prefix.
///
/// Files without the prefix are ignored. File names inside a group are sorted.
pub fn group_files(
    directory: &Path,
    settings: &IngestSettings,
) -> ConnectivityResult<BTreeMap<String, Vec<String>>> {
    if !directory.is_dir() {
        return Err(ConnectivityError::InvalidDirectory {
            path: directory.to_path_buf(),
        });
    }
    let pattern = CASE_SERIES
        .as_ref()
        .map_err(|e| ConnectivityError::Pattern(e.clone()))?;

    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let entries = fs::read_dir(directory).map_err(|e| ConnectivityError::io(directory, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| ConnectivityError::io(directory, e))?;
        if !entry.path().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !settings.has_extension(&name) {
            continue;
        }
        match pattern.find(&name) {
            Some(prefix) => groups
                .entry(prefix.as_str().to_string())
                .or_default()
                .push(name),
            None => debug!(target: "connlens-connectivity", "Ignoring {}", name),
        }
    }
    for files in groups.values_mut() {
        files.sort();
    }
    Ok(groups)
}

/// Builds one [`TracerConnectivity`] per case/series group
#[derive(Debug, Clone)]
pub struct ConnectivityBuilder<'a> {
    context: &'a ConnectivityContext,
    options: TracerOptions,
}

impl<'a> ConnectivityBuilder<'a> {
    pub fn new(context: &'a ConnectivityContext, options: TracerOptions) -> Self {
        Self { context, options }
    }

    pub fn options(&self) -> &TracerOptions {
        &self.options
    }

    /// Aggregate every group of every directory, in directory then group order.
    ///
    /// # Errors
    ///
    /// A missing directory or a failing group aborts the whole build.
    pub fn build<P: AsRef<Path>>(&self, directories: &[P]) -> ConnectivityResult<Vec<TracerConnectivity>> {
        let mut tracers = Vec::new();
        for directory in directories {
            let directory = directory.as_ref();
            let groups = group_files(directory, self.context.settings())?;
            if groups.is_empty() {
                info!(target: "connlens-connectivity", "No case groups in {}", directory.display());
                continue;
            }
            info!(
                target: "connlens-connectivity",
                "{}: {} case groups",
                directory.display(),
                groups.len()
            );
            for (key, files) in &groups {
                debug!(target: "connlens-connectivity", "Group {}: {} files", key, files.len());
                tracers.push(TracerConnectivity::open(
                    directory,
                    Some(files.as_slice()),
                    self.context,
                    &self.options,
                )?);
            }
        }
        Ok(tracers)
    }
}
