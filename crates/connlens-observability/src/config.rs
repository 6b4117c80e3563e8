// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging options

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use connlens_config::{ConnlensConfig, LogFormat};

/// Options consumed by [`crate::init_logging`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingOptions {
    /// Default level for events outside debug-enabled crates
    pub level: String,
    pub format: LogFormat,
    /// File logging is enabled when set
    pub log_dir: Option<PathBuf>,
    pub retention_days: u64,
    pub retention_runs: usize,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            log_dir: None,
            retention_days: 30,
            retention_runs: 10,
        }
    }
}

impl From<&ConnlensConfig> for LoggingOptions {
    fn from(config: &ConnlensConfig) -> Self {
        let level = if config.system.debug {
            "debug".to_string()
        } else {
            config.system.log_level.clone()
        };
        Self {
            level,
            format: config.logging.format,
            log_dir: config.logging.log_dir.clone(),
            retention_days: config.logging.retention_days,
            retention_runs: config.logging.retention_runs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_from_config() {
        let mut config = ConnlensConfig::default();
        config.system.log_level = "warn".to_string();
        config.logging.log_dir = Some(PathBuf::from("/tmp/logs"));
        config.logging.retention_runs = 3;

        let options = LoggingOptions::from(&config);
        assert_eq!(options.level, "warn");
        assert_eq!(options.log_dir, Some(PathBuf::from("/tmp/logs")));
        assert_eq!(options.retention_runs, 3);
    }

    #[test]
    fn test_debug_overrides_level() {
        let mut config = ConnlensConfig::default();
        config.system.debug = true;
        assert_eq!(LoggingOptions::from(&config).level, "debug");
    }
}
