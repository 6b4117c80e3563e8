// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Packed color triples and the integer region index they encode.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AtlasError;

/// An 8-bit RGB triple, written `R:G:B`.
///
/// Ordering is lexicographic on (r, g, b), which matches the order of the packed index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `R*65536 + G*256 + B`
    pub const fn index(self) -> RegionIndex {
        RegionIndex(((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32)
    }

    /// Only the low 24 bits of the index are used.
    pub const fn from_index(index: RegionIndex) -> Self {
        let value = index.0;
        Self {
            r: ((value >> 16) & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: (value & 0xFF) as u8,
        }
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(channels: [u8; 3]) -> Self {
        Self::new(channels[0], channels[1], channels[2])
    }
}

impl FromStr for Rgb {
    type Err = AtlasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AtlasError::InvalidColor(s.to_string());
        let mut channels = s.trim().split(':').map(|c| c.trim().parse::<u8>());
        let (Some(Ok(r)), Some(Ok(g)), Some(Ok(b)), None) =
            (channels.next(), channels.next(), channels.next(), channels.next())
        else {
            return Err(invalid());
        };
        Ok(Self::new(r, g, b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.r, self.g, self.b)
    }
}

/// A region color packed into a single integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionIndex(pub u32);

impl RegionIndex {
    pub const MAX: RegionIndex = RegionIndex(0x00FF_FFFF);

    pub fn color(self) -> Rgb {
        Rgb::from_index(self)
    }
}

impl From<Rgb> for RegionIndex {
    fn from(rgb: Rgb) -> Self {
        rgb.index()
    }
}

impl fmt::Display for RegionIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
