// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # connlens Configuration System
//!
//! Type-safe configuration loader with support for:
//! - TOML file parsing (`connlens.toml`)
//! - Environment variable overrides (`CONNLENS_*`)
//! - CLI argument overrides
//!
//! ## Usage
//!
//! ```rust,no_run
//! use connlens_config::{load_config, validate_config};
//!
//! let config = load_config(None, None).expect("Failed to load config");
//! validate_config(&config).expect("Invalid config");
//!
//! println!("Atlas assets: {}", config.atlas.asset_root.display());
//! println!("Header scan lines: {}", config.ingest.header_scan_lines);
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod loader;
pub mod types;
pub mod validation;

pub use loader::{apply_cli_overrides, apply_environment_overrides, find_config_file, load_config};
pub use types::*;
pub use validation::{validate_config, ConfigValidationError};

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found. Searched: {0}")]
    FileNotFound(String),

    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax: {0}")]
    ParseError(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ConnlensConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_config_serializes_all_sections() {
        let value = serde_json::to_value(ConnlensConfig::default()).unwrap();
        for section in ["system", "atlas", "ingest", "logging"] {
            assert!(value.get(section).is_some(), "missing {}", section);
        }
        assert_eq!(value["logging"]["format"], "text");
    }
}
