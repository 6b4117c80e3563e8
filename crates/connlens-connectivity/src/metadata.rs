// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Key/value header of a measurement file.

use std::path::Path;

use connlens_atlas::AtlasId;
use serde::{Deserialize, Serialize};

use crate::error::{ConnectivityError, ConnectivityResult};

/// Header keys recognized in measurement files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataKey {
    ProjectName,
    CaseName,
    SlideNumber,
    ChannelNumber,
    AraLevel,
    Tracer,
    InjectionSite,
    SecondaryInjectionSite,
    AtlasName,
    AtlasVersion,
    OverlapFormat,
    GridSize,
    ThresholdAdjusted,
    ConnectionLensVersion,
}

impl MetadataKey {
    pub const ALL: [MetadataKey; 14] = [
        MetadataKey::ProjectName,
        MetadataKey::CaseName,
        MetadataKey::SlideNumber,
        MetadataKey::ChannelNumber,
        MetadataKey::AraLevel,
        MetadataKey::Tracer,
        MetadataKey::InjectionSite,
        MetadataKey::SecondaryInjectionSite,
        MetadataKey::AtlasName,
        MetadataKey::AtlasVersion,
        MetadataKey::OverlapFormat,
        MetadataKey::GridSize,
        MetadataKey::ThresholdAdjusted,
        MetadataKey::ConnectionLensVersion,
    ];

    /// Key as written in the file header
    pub fn header_name(self) -> &'static str {
        match self {
            MetadataKey::ProjectName => "Project Name",
            MetadataKey::CaseName => "Case Name",
            MetadataKey::SlideNumber => "Slide Number",
            MetadataKey::ChannelNumber => "Channel Number",
            MetadataKey::AraLevel => "ARA Level",
            MetadataKey::Tracer => "Tracer",
            MetadataKey::InjectionSite => "Injection Site",
            MetadataKey::SecondaryInjectionSite => "Secondary Injection Site",
            MetadataKey::AtlasName => "Atlas Name",
            MetadataKey::AtlasVersion => "Atlas Version",
            MetadataKey::OverlapFormat => "Overlap Format",
            MetadataKey::GridSize => "Grid Size",
            MetadataKey::ThresholdAdjusted => "Threshold Adjusted",
            MetadataKey::ConnectionLensVersion => "Connection Lens Version",
        }
    }

    pub fn from_header_name(name: &str) -> Option<Self> {
        MetadataKey::ALL
            .iter()
            .copied()
            .find(|key| key.header_name() == name)
    }
}

/// Parsed header values; keys absent from the file stay `None`.
///
/// Two files have equal metadata when every field matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementMetadata {
    pub project_name: Option<String>,
    pub case_name: Option<String>,
    pub slide_number: Option<String>,
    pub channel_number: Option<String>,
    pub ara_level: Option<String>,
    pub tracer: Option<String>,
    pub injection_site: Option<String>,
    pub secondary_injection_site: Option<String>,
    pub atlas_name: Option<String>,
    pub atlas_version: Option<String>,
    pub overlap_format: Option<String>,
    pub grid_size: Option<String>,
    pub threshold_adjusted: Option<String>,
    pub connection_lens_version: Option<String>,
}

impl MeasurementMetadata {
    fn slot(&mut self, key: MetadataKey) -> &mut Option<String> {
        match key {
            MetadataKey::ProjectName => &mut self.project_name,
            MetadataKey::CaseName => &mut self.case_name,
            MetadataKey::SlideNumber => &mut self.slide_number,
            MetadataKey::ChannelNumber => &mut self.channel_number,
            MetadataKey::AraLevel => &mut self.ara_level,
            MetadataKey::Tracer => &mut self.tracer,
            MetadataKey::InjectionSite => &mut self.injection_site,
            MetadataKey::SecondaryInjectionSite => &mut self.secondary_injection_site,
            MetadataKey::AtlasName => &mut self.atlas_name,
            MetadataKey::AtlasVersion => &mut self.atlas_version,
            MetadataKey::OverlapFormat => &mut self.overlap_format,
            MetadataKey::GridSize => &mut self.grid_size,
            MetadataKey::ThresholdAdjusted => &mut self.threshold_adjusted,
            MetadataKey::ConnectionLensVersion => &mut self.connection_lens_version,
        }
    }

    pub fn set(&mut self, key: MetadataKey, value: &str) {
        *self.slot(key) = Some(value.trim().to_string());
    }

    /// Apply one header line. Lines that are not exactly `key:value`, or carry
    /// an unrecognized key, are ignored. Returns whether the line was used.
    pub fn apply_line(&mut self, line: &str) -> bool {
        let mut tokens = line.trim().split(':');
        let (Some(key), Some(value), None) = (tokens.next(), tokens.next(), tokens.next()) else {
            return false;
        };
        match MetadataKey::from_header_name(key) {
            Some(key) => {
                self.set(key, value);
                true
            }
            None => false,
        }
    }

    /// Tracer name: the first whitespace-separated token of the `Tracer` field
    pub fn tracer_name(&self) -> Option<&str> {
        self.tracer.as_deref().and_then(|t| t.split_whitespace().next())
    }

    /// Section level from the `ARA Level` field
    pub fn level(&self, path: &Path) -> ConnectivityResult<u32> {
        let invalid = |reason: String| ConnectivityError::InvalidMetadata {
            path: path.to_path_buf(),
            field: MetadataKey::AraLevel.header_name().to_string(),
            reason,
        };
        let raw = self
            .ara_level
            .as_deref()
            .ok_or_else(|| invalid("missing".to_string()))?;
        raw.parse::<u32>()
            .map_err(|_| invalid(format!("'{}' is not an integer", raw)))
    }

    /// Atlas from the `Atlas Name` field, or `default` when the file names none
    pub fn atlas(&self, default: AtlasId) -> ConnectivityResult<AtlasId> {
        match self.atlas_name.as_deref() {
            Some(name) if !name.is_empty() => Ok(name.parse()?),
            _ => Ok(default),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_line() {
        let mut metadata = MeasurementMetadata::default();
        assert!(metadata.apply_line("Case Name: SW160120-01B\n"));
        assert!(metadata.apply_line("Tracer:  BDA red "));
        assert!(!metadata.apply_line("Unknown Key: value"));
        assert!(!metadata.apply_line("(HEMISPHERE:R:G:B)"));
        assert!(!metadata.apply_line("no separator"));

        assert_eq!(metadata.case_name.as_deref(), Some("SW160120-01B"));
        assert_eq!(metadata.tracer.as_deref(), Some("BDA red"));
        assert_eq!(metadata.tracer_name(), Some("BDA"));
    }

    #[test]
    fn test_values_with_colons_are_skipped() {
        let mut metadata = MeasurementMetadata::default();
        assert!(!metadata.apply_line("Connection Lens Version: 1.2:3"));
        assert_eq!(metadata.connection_lens_version, None);
    }

    #[test]
    fn test_level_parsing() {
        let path = Path::new("f.csv");
        let mut metadata = MeasurementMetadata::default();
        assert!(metadata.level(path).is_err());

        metadata.set(MetadataKey::AraLevel, "045");
        assert_eq!(metadata.level(path).unwrap(), 45);

        metadata.set(MetadataKey::AraLevel, "forty");
        assert!(matches!(
            metadata.level(path),
            Err(ConnectivityError::InvalidMetadata { .. })
        ));
    }

    #[test]
    fn test_atlas_defaults_when_missing() {
        let mut metadata = MeasurementMetadata::default();
        assert_eq!(metadata.atlas(AtlasId::Ara).unwrap(), AtlasId::Ara);

        metadata.set(MetadataKey::AtlasName, "CP_VORONOI");
        assert_eq!(metadata.atlas(AtlasId::Ara).unwrap(), AtlasId::CpVoronoi);

        metadata.set(MetadataKey::AtlasName, "BRAIN");
        assert!(matches!(
            metadata.atlas(AtlasId::Ara),
            Err(ConnectivityError::Atlas(_))
        ));
    }

    #[test]
    fn test_header_names_round_trip() {
        for key in MetadataKey::ALL {
            assert_eq!(MetadataKey::from_header_name(key.header_name()), Some(key));
        }
    }
}
