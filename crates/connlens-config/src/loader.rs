// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier configuration loading system:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, ConnlensConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "connlens.toml";

/// Find the connlens configuration file
///
/// Search order:
/// 1. `CONNLENS_CONFIG_PATH` environment variable
/// 2. Current working directory: `./connlens.toml`
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("CONNLENS_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        } else {
            return Err(ConfigError::FileNotFound(format!(
                "Config file specified by CONNLENS_CONFIG_PATH not found: {}",
                path.display()
            )));
        }
    }

    let mut search_paths = Vec::new();

    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));

        let mut current = cwd.clone();
        for _ in 0..5 {
            if let Some(parent) = current.parent() {
                search_paths.push(parent.join(CONFIG_FILE_NAME));
                current = parent.to_path_buf();
            }
        }
    }

    for path in &search_paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "connlens configuration file '{}' not found in any of these locations:\n{}\n\nSet CONNLENS_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found or contains invalid TOML.
/// Validation is left to [`crate::validate_config`].
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<ConnlensConfig> {
    let config_file = if let Some(path) = config_path {
        path.to_path_buf()
    } else {
        find_config_file()?
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: ConnlensConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);

    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `CONNLENS_LOG_LEVEL` -> `system.log_level`
/// - `CONNLENS_ASSET_ROOT` -> `atlas.asset_root`
/// - `CONNLENS_DEFAULT_ATLAS` -> `atlas.default_atlas`
/// - `CONNLENS_HEADER_SCAN_LINES` -> `ingest.header_scan_lines`
/// - `CONNLENS_FILE_EXTENSION` -> `ingest.file_extension`
/// - `CONNLENS_LOG_DIR` -> `logging.log_dir`
pub fn apply_environment_overrides(config: &mut ConnlensConfig) {
    if let Ok(value) = env::var("CONNLENS_LOG_LEVEL") {
        config.system.log_level = value;
    }

    if let Ok(value) = env::var("CONNLENS_ASSET_ROOT") {
        config.atlas.asset_root = PathBuf::from(value);
    }
    if let Ok(value) = env::var("CONNLENS_DEFAULT_ATLAS") {
        config.atlas.default_atlas = value;
    }

    if let Ok(value) = env::var("CONNLENS_HEADER_SCAN_LINES") {
        if let Ok(lines) = value.parse::<usize>() {
            config.ingest.header_scan_lines = lines;
        }
    }
    if let Ok(value) = env::var("CONNLENS_FILE_EXTENSION") {
        config.ingest.file_extension = value;
    }

    if let Ok(value) = env::var("CONNLENS_LOG_DIR") {
        config.logging.log_dir = Some(PathBuf::from(value));
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - HashMap of CLI arguments (e.g., `{"asset_root": "/data/atlas", "header_scan_lines": "30"}`)
pub fn apply_cli_overrides(config: &mut ConnlensConfig, cli_args: &HashMap<String, String>) {
    if let Some(value) = cli_args.get("debug") {
        config.system.debug = value.to_lowercase() == "true" || value == "1";
    }
    if let Some(value) = cli_args.get("log_level") {
        config.system.log_level = value.clone();
    }

    if let Some(value) = cli_args.get("asset_root") {
        config.atlas.asset_root = PathBuf::from(value);
    }
    if let Some(value) = cli_args.get("default_atlas") {
        config.atlas.default_atlas = value.clone();
    }

    if let Some(value) = cli_args.get("header_scan_lines") {
        if let Ok(lines) = value.parse::<usize>() {
            config.ingest.header_scan_lines = lines;
        }
    }
    if let Some(value) = cli_args.get("file_extension") {
        config.ingest.file_extension = value.clone();
    }

    if let Some(value) = cli_args.get("log_dir") {
        config.logging.log_dir = Some(PathBuf::from(value));
    }
}
