// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Checks value ranges and required fields. All problems are collected and
//! reported together.

use crate::{ConfigError, ConfigResult, ConnlensConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone)]
pub enum ConfigValidationError {
    InvalidLevelRange { min: u16, max: u16 },
    MissingRequired { field: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLevelRange { min, max } => {
                write!(
                    f,
                    "Atlas level range {}..={} must satisfy 1 <= min <= max <= 132",
                    min, max
                )
            }
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` with details if validation fails
pub fn validate_config(config: &ConnlensConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_atlas(config, &mut errors);
    validate_ingest(config, &mut errors);
    validate_system(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn validate_atlas(config: &ConnlensConfig, errors: &mut Vec<ConfigValidationError>) {
    let atlas = &config.atlas;
    if atlas.min_level < 1 || atlas.min_level > atlas.max_level || atlas.max_level > 132 {
        errors.push(ConfigValidationError::InvalidLevelRange {
            min: atlas.min_level,
            max: atlas.max_level,
        });
    }
    if atlas.asset_root.as_os_str().is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "atlas.asset_root".to_string(),
        });
    }
    if atlas.default_atlas.trim().is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "atlas.default_atlas".to_string(),
        });
    }
}

fn validate_ingest(config: &ConnlensConfig, errors: &mut Vec<ConfigValidationError>) {
    let ingest = &config.ingest;
    if ingest.header_scan_lines == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "ingest.header_scan_lines".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    if ingest.file_extension.is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "ingest.file_extension".to_string(),
        });
    } else if ingest.file_extension.starts_with('.') {
        errors.push(ConfigValidationError::InvalidValue {
            field: "ingest.file_extension".to_string(),
            reason: "give the extension without a leading dot".to_string(),
        });
    }
}

fn validate_system(config: &ConnlensConfig, errors: &mut Vec<ConfigValidationError>) {
    let level = config.system.log_level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "system.log_level".to_string(),
            reason: format!("expected one of {}", LOG_LEVELS.join(", ")),
        });
    }
}
