// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Shared read-only state for ingestion: atlas tables, tracer catalog,
//! per-atlas registries and ingest settings.

use std::sync::Arc;

use ahash::AHashMap;
use connlens_atlas::{AtlasId, AtlasTables, RegionRegistry};
use connlens_config::{validate_config, ConnlensConfig};

use crate::error::ConnectivityResult;
use crate::tracers::TracerCatalog;

/// Parser and discovery settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestSettings {
    /// Lines searched for the header/data sentinel
    pub header_scan_lines: usize,
    /// Measurement file extension, without the dot
    pub file_extension: String,
    /// Atlas assumed when a file names none
    pub default_atlas: AtlasId,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            header_scan_lines: 20,
            file_extension: "csv".to_string(),
            default_atlas: AtlasId::DEFAULT,
        }
    }
}

impl IngestSettings {
    /// Settings from a validated configuration
    ///
    /// # Errors
    ///
    /// `Config` when the configuration fails validation, `Atlas` when the
    /// default atlas is unknown.
    pub fn from_config(config: &ConnlensConfig) -> ConnectivityResult<Self> {
        validate_config(config)?;
        Ok(Self {
            header_scan_lines: config.ingest.header_scan_lines,
            file_extension: config.ingest.file_extension.clone(),
            default_atlas: config.atlas.default_atlas.parse()?,
        })
    }

    pub(crate) fn has_extension(&self, file_name: &str) -> bool {
        file_name
            .rsplit_once('.')
            .is_some_and(|(_, ext)| ext == self.file_extension)
    }
}

/// Everything a parser or aggregator needs besides the files themselves
#[derive(Debug, Clone)]
pub struct ConnectivityContext {
    tables: Arc<AtlasTables>,
    tracers: Arc<TracerCatalog>,
    registries: AHashMap<AtlasId, Arc<RegionRegistry>>,
    settings: IngestSettings,
}

impl ConnectivityContext {
    /// Load the embedded tables
    pub fn new(settings: IngestSettings) -> ConnectivityResult<Self> {
        Ok(Self::with_tables(
            Arc::new(AtlasTables::load_embedded()?),
            Arc::new(TracerCatalog::load_embedded()?),
            settings,
        ))
    }

    pub fn from_config(config: &ConnlensConfig) -> ConnectivityResult<Self> {
        Self::new(IngestSettings::from_config(config)?)
    }

    pub fn with_tables(
        tables: Arc<AtlasTables>,
        tracers: Arc<TracerCatalog>,
        settings: IngestSettings,
    ) -> Self {
        let registries = AtlasId::ALL
            .iter()
            .map(|&atlas| (atlas, Arc::new(RegionRegistry::new(atlas, &tables))))
            .collect();
        Self {
            tables,
            tracers,
            registries,
            settings,
        }
    }

    pub fn tables(&self) -> &AtlasTables {
        &self.tables
    }

    pub fn tracers(&self) -> &TracerCatalog {
        &self.tracers
    }

    pub fn settings(&self) -> &IngestSettings {
        &self.settings
    }

    pub fn registry(&self, atlas: AtlasId) -> Arc<RegionRegistry> {
        match self.registries.get(&atlas) {
            Some(registry) => Arc::clone(registry),
            None => Arc::new(RegionRegistry::new(atlas, &self.tables)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConnectivityError;

    #[test]
    fn test_settings_from_config() {
        let mut config = ConnlensConfig::default();
        config.atlas.default_atlas = "blaa divisions".to_string();
        config.ingest.header_scan_lines = 12;

        let settings = IngestSettings::from_config(&config).unwrap();
        assert_eq!(settings.default_atlas, AtlasId::BlaaDivisions);
        assert_eq!(settings.header_scan_lines, 12);
    }

    #[test]
    fn test_settings_reject_unknown_atlas() {
        let mut config = ConnlensConfig::default();
        config.atlas.default_atlas = "MOUSE".to_string();
        assert!(IngestSettings::from_config(&config).is_err());
    }

    #[test]
    fn test_settings_reject_zero_scan_bound() {
        let mut config = ConnlensConfig::default();
        config.ingest.header_scan_lines = 0;
        assert!(matches!(
            IngestSettings::from_config(&config),
            Err(ConnectivityError::Config(_))
        ));
        assert!(ConnectivityContext::from_config(&config).is_err());
    }

    #[test]
    fn test_extension_match() {
        let settings = IngestSettings::default();
        assert!(settings.has_extension("SW160120-01B_045.csv"));
        assert!(!settings.has_extension("notes.txt"));
        assert!(!settings.has_extension("csv"));
        assert!(!settings.has_extension("data.CSV"));
    }

    #[test]
    fn test_registries_are_shared() {
        let context = ConnectivityContext::new(IngestSettings::default()).unwrap();
        let a = context.registry(AtlasId::Ara);
        let b = context.registry(AtlasId::Ara);
        assert!(Arc::ptr_eq(&a, &b));
    }
}
