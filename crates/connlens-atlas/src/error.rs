// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for atlas tables, codecs and asset resolution.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias for atlas operations
pub type AtlasResult<T> = Result<T, AtlasError>;

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("Unknown atlas '{name}'. Candidate atlases are {candidates}")]
    UnknownAtlas { name: String, candidates: String },

    #[error("Invalid color key '{0}': expected R:G:B with 8-bit channels")]
    InvalidColor(String),

    #[error("Embedded table '{table}' is malformed: {message}")]
    Table { table: String, message: String },

    #[error("Invalid atlas level '{0}': expected 1..=132 or a three digit string")]
    InvalidLevel(String),

    #[error("No {asset} asset for level {level} in atlas {atlas} or the default atlas (tried {path})")]
    AssetNotFound {
        asset: String,
        atlas: String,
        level: String,
        path: PathBuf,
    },

    #[error("Level {0} is missing from the level region index")]
    MissingLevel(String),

    #[error("Failed to decode atlas image {path}: {message}")]
    Image { path: PathBuf, message: String },

    #[error("Failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
