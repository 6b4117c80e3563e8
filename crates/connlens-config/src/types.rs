// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! Each struct maps to a section of `connlens.toml`. Every field has a default,
//! so an empty file is a complete configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ConnlensConfig {
    pub system: SystemConfig,
    pub atlas: AtlasConfig,
    pub ingest: IngestConfig,
    pub logging: LoggingConfig,
}

/// System-level configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SystemConfig {
    pub debug: bool,
    pub log_level: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            debug: false,
            log_level: "info".to_string(),
        }
    }
}

/// Atlas asset location and level range
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AtlasConfig {
    pub asset_root: PathBuf,
    /// Atlas key used when a measurement file names none
    pub default_atlas: String,
    pub min_level: u16,
    pub max_level: u16,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("/ifs/loni/faculty/dong/mcp/atlas_roigb"),
            default_atlas: "ARA".to_string(),
            min_level: 1,
            max_level: 132,
        }
    }
}

/// Measurement file ingestion
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Lines searched for the header/data sentinel
    pub header_scan_lines: usize,
    /// Extension of measurement files, without the dot
    pub file_extension: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            header_scan_lines: 20,
            file_extension: "csv".to_string(),
        }
    }
}

/// Log output
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Enables file logging when set
    pub log_dir: Option<PathBuf>,
    pub retention_days: u64,
    pub retention_runs: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            log_dir: None,
            retention_days: 30,
            retention_runs: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}
