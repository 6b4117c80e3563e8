// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for measurement parsing and connectivity aggregation.

use std::path::PathBuf;

use connlens_atlas::AtlasError;
use connlens_config::ConfigError;
use thiserror::Error;

/// Result alias for connectivity operations
pub type ConnectivityResult<T> = Result<T, ConnectivityError>;

#[derive(Debug, Error)]
pub enum ConnectivityError {
    #[error("{path}: overlap is from an older unsupported version of connection lens, re-run overlap")]
    UnsupportedFileVersion { path: PathBuf },

    #[error("{path}: unknown tracer <{tracer}>")]
    UnknownTracer { path: PathBuf, tracer: String },

    #[error("{path} is not region based")]
    NotRegionMode { path: PathBuf },

    #[error("{path}: grid overlap data is not supported")]
    GridFormatUnsupported { path: PathBuf },

    #[error("{path}:{line}: malformed record: {reason}")]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("{path}: invalid metadata '{field}': {reason}")]
    InvalidMetadata {
        path: PathBuf,
        field: String,
        reason: String,
    },

    #[error(
        "Metadata conflict in case {case} channel {channel} at level {first_level} and level {level}: {field} differs"
    )]
    MetadataConsistency {
        case: String,
        channel: String,
        first_level: u32,
        level: u32,
        field: &'static str,
    },

    #[error("Level {level} appears in both {first} and {second}")]
    DuplicateLevel {
        level: u32,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("No level connectivity constructed from {directory}")]
    NoLevels { directory: PathBuf },

    #[error("{path} is not a directory")]
    InvalidDirectory { path: PathBuf },

    #[error("Case name '{case}' does not match the case id pattern")]
    InvalidCaseName { case: String },

    #[error("Invalid naming pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Tracer catalog is malformed: {0}")]
    Catalog(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Atlas(#[from] AtlasError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ConnectivityError {
    /// Per-file rejections that exclude the file from aggregation instead of failing the group
    pub fn is_file_rejection(&self) -> bool {
        matches!(
            self,
            ConnectivityError::UnsupportedFileVersion { .. }
                | ConnectivityError::UnknownTracer { .. }
                | ConnectivityError::NotRegionMode { .. }
        )
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConnectivityError::Io {
            path: path.into(),
            source,
        }
    }
}
