// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Measurement file parsing.

A region-mode file looks like:

```text
Project Name: MCP
Case Name: SW160120-01B
ARA Level: 045
Tracer: BDA
(HEMISPHERE:R:G:B),atlas_only,overlap,region
(l:0:156:112),0.2,0.3,GU_6b
(r:0:156:112),0.1,0.1,GU_6b
```

The header is read until the `(HEMISPHERE:R:G:B)` sentinel, which must
appear within the scan bound. Every later non-blank line is a record.
*/

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use connlens_atlas::{AtlasTables, RegionRegistry, Rgb};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConnectivityError, ConnectivityResult};
use crate::metadata::MeasurementMetadata;

/// Line separating the header from the data section of region-mode files
pub const DATA_SENTINEL: &str = "(HEMISPHERE:R:G:B)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Hemisphere {
    Left,
    Right,
}

impl Hemisphere {
    pub const BOTH: [Hemisphere; 2] = [Hemisphere::Left, Hemisphere::Right];

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "l" | "L" => Some(Hemisphere::Left),
            "r" | "R" => Some(Hemisphere::Right),
            _ => None,
        }
    }

    /// Label suffix: left is contralateral, right is ipsilateral
    pub fn side_suffix(self) -> &'static str {
        match self {
            Hemisphere::Left => "c",
            Hemisphere::Right => "i",
        }
    }
}

impl fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Hemisphere::Left => "l",
            Hemisphere::Right => "r",
        })
    }
}

/// One data line of a region-mode file
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementRecord {
    pub line: usize,
    pub hemisphere: Hemisphere,
    pub color: Rgb,
    /// Canonical name, after the legacy spelling remap
    pub region: String,
    pub atlas_only: f64,
    pub overlap: f64,
    /// `atlas_only + overlap`, computed before any overlap correction
    pub area: f64,
}

/// Non-fatal conditions found while reading records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseDiagnostic {
    /// Region not in the registry; the record was dropped
    UnresolvedRegion { line: usize, region: String },
    /// Total area was zero; overlap was forced to zero
    ZeroArea { line: usize, region: String },
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseDiagnostic::UnresolvedRegion { line, region } => {
                write!(f, "line {}: unknown region {}, discarding line", line, region)
            }
            ParseDiagnostic::ZeroArea { line, region } => {
                write!(f, "line {}: area of {} is zero, forcing overlap to zero", line, region)
            }
        }
    }
}

/// Header scan result
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileHeader {
    pub metadata: MeasurementMetadata,
    /// Index of the first data line, when the sentinel was found
    pub data_start: Option<usize>,
}

/// Records and diagnostics of one file
#[derive(Debug, Clone, Default)]
pub struct ParsedData {
    pub records: Vec<MeasurementRecord>,
    pub diagnostics: Vec<ParseDiagnostic>,
}

/// Overlap file format, chosen from the file name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapParser {
    /// Per-region overlap with a sentinel-delimited data section
    Region,
    /// Per-grid-cell overlap; the header is readable but the data schema is not defined
    Grid,
}

impl OverlapParser {
    /// A file name containing `grid` selects the grid format
    pub fn for_path(path: &Path) -> Self {
        let is_grid = path
            .file_name()
            .map(|name| name.to_string_lossy().contains("grid"))
            .unwrap_or(false);
        if is_grid {
            OverlapParser::Grid
        } else {
            OverlapParser::Region
        }
    }

    /// Read header lines, at most `scan_lines` of them.
    pub fn parse_header<S: AsRef<str>>(&self, lines: &[S], scan_lines: usize) -> FileHeader {
        let mut header = FileHeader::default();
        for (i, line) in lines.iter().take(scan_lines).enumerate() {
            let line = line.as_ref();
            if *self == OverlapParser::Region && line.starts_with(DATA_SENTINEL) {
                header.data_start = Some(i + 1);
                break;
            }
            header.metadata.apply_line(line);
        }
        header
    }

    /// Reject file versions this parser cannot read
    pub fn validate(&self, header: &FileHeader, path: &Path) -> ConnectivityResult<()> {
        match self {
            OverlapParser::Region if header.data_start.is_none() => {
                Err(ConnectivityError::UnsupportedFileVersion {
                    path: path.to_path_buf(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Parse the data section, resolving region names against `registry`.
    pub fn parse_data<S: AsRef<str>>(
        &self,
        lines: &[S],
        header: &FileHeader,
        registry: &RegionRegistry,
        tables: &AtlasTables,
        path: &Path,
    ) -> ConnectivityResult<ParsedData> {
        let start = match (self, header.data_start) {
            (OverlapParser::Grid, _) => {
                return Err(ConnectivityError::GridFormatUnsupported {
                    path: path.to_path_buf(),
                })
            }
            (OverlapParser::Region, Some(start)) => start,
            (OverlapParser::Region, None) => {
                return Err(ConnectivityError::UnsupportedFileVersion {
                    path: path.to_path_buf(),
                })
            }
        };

        let mut data = ParsedData::default();
        for (i, line) in lines.iter().enumerate().skip(start) {
            let line = line.as_ref().trim();
            if line.is_empty() {
                continue;
            }
            let line_number = i + 1;
            let mut record = parse_record(line, line_number, path)?;

            let region = tables
                .legacy_rename(&record.region)
                .unwrap_or(&record.region)
                .to_string();
            if !registry.contains(&region) {
                data.diagnostics.push(ParseDiagnostic::UnresolvedRegion {
                    line: line_number,
                    region: record.region,
                });
                continue;
            }
            record.region = region;

            if record.area == 0.0 {
                data.diagnostics.push(ParseDiagnostic::ZeroArea {
                    line: line_number,
                    region: record.region.clone(),
                });
                record.overlap = 0.0;
            }
            data.records.push(record);
        }

        for diagnostic in &data.diagnostics {
            warn!(target: "connlens-connectivity", "{}: {}", path.display(), diagnostic);
        }
        Ok(data)
    }
}

/// Parse `(H:R:G:B),atlas_only,overlap,region`
fn parse_record(line: &str, line_number: usize, path: &Path) -> ConnectivityResult<MeasurementRecord> {
    let malformed = |reason: String| ConnectivityError::MalformedRecord {
        path: path.to_path_buf(),
        line: line_number,
        reason,
    };

    let fields: Vec<&str> = line.split(',').collect();
    let [tag, atlas_only, overlap, region] = fields.as_slice() else {
        return Err(malformed(format!("expected 4 fields, found {}", fields.len())));
    };

    let tag = tag.trim();
    let inner = tag
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .ok_or_else(|| malformed(format!("tag '{}' is not parenthesized", tag)))?;
    let (hemisphere, color) = inner
        .split_once(':')
        .ok_or_else(|| malformed(format!("tag '{}' has no color", tag)))?;
    let hemisphere = Hemisphere::from_tag(hemisphere.trim())
        .ok_or_else(|| malformed(format!("unknown hemisphere '{}'", hemisphere)))?;
    let color = color
        .parse::<Rgb>()
        .map_err(|_| malformed(format!("invalid color in tag '{}'", tag)))?;

    let parse_area = |value: &str, name: &str| {
        let value = value.trim();
        match value.parse::<f64>() {
            Ok(area) if area.is_finite() => Ok(area),
            Ok(_) => Err(malformed(format!("{} '{}' is not a finite number", name, value))),
            Err(_) => Err(malformed(format!("{} '{}' is not a number", name, value))),
        }
    };
    let atlas_only = parse_area(*atlas_only, "atlas_only")?;
    let overlap = parse_area(*overlap, "overlap")?;

    Ok(MeasurementRecord {
        line: line_number,
        hemisphere,
        color,
        region: region.trim().to_string(),
        atlas_only,
        overlap,
        area: atlas_only + overlap,
    })
}

/// A measurement file read into memory
#[derive(Debug, Clone)]
pub struct MeasurementFile {
    pub path: PathBuf,
    pub parser: OverlapParser,
    pub lines: Vec<String>,
}

impl MeasurementFile {
    /// Read the whole file; the handle is closed before returning.
    pub fn read(path: &Path) -> ConnectivityResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConnectivityError::io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            parser: OverlapParser::for_path(path),
            lines: content.lines().map(str::to_string).collect(),
        })
    }

    pub fn header(&self, scan_lines: usize) -> FileHeader {
        self.parser.parse_header(&self.lines, scan_lines)
    }
}
