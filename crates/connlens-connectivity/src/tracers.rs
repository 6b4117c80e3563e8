// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Tracer catalog: transport class, display color and external names of every
//! known tracer.

use std::collections::BTreeMap;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{ConnectivityError, ConnectivityResult};

const TRACERS_JSON: &str = include_str!("../tables/tracers.json");

/// Direction a tracer is transported along axons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TracerTransport {
    Anterograde,
    Retrograde,
    /// Labels in both directions (BDA, AAV1)
    Either,
    Rabies,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tracer {
    pub name: String,
    /// `None` for stains such as Nissl
    pub transport: Option<TracerTransport>,
    pub color: String,
    pub lims_name: Option<String>,
    pub table_name: Option<String>,
}

impl Tracer {
    /// Bidirectional tracers are analyzed as anterograde
    pub fn is_anterograde(&self) -> bool {
        matches!(
            self.transport,
            Some(TracerTransport::Anterograde | TracerTransport::Either)
        )
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    tracers: Vec<Tracer>,
    generic_tracers: BTreeMap<String, String>,
    color_codes: BTreeMap<String, [u8; 3]>,
}

/// Known tracers, loaded once from embedded data
#[derive(Debug, Clone)]
pub struct TracerCatalog {
    tracers: Vec<Tracer>,
    by_name: AHashMap<String, usize>,
    by_lowercase: AHashMap<String, usize>,
    generic_tracers: BTreeMap<String, String>,
    color_codes: BTreeMap<String, [u8; 3]>,
}

impl TracerCatalog {
    pub fn load_embedded() -> ConnectivityResult<Self> {
        Self::from_json(TRACERS_JSON)
    }

    pub fn from_json(source: &str) -> ConnectivityResult<Self> {
        let file: CatalogFile =
            serde_json::from_str(source).map_err(|e| ConnectivityError::Catalog(e.to_string()))?;

        for tracer in &file.tracers {
            if !file.color_codes.contains_key(&tracer.color) {
                return Err(ConnectivityError::Catalog(format!(
                    "tracer {} uses undefined color {}",
                    tracer.name, tracer.color
                )));
            }
        }

        let by_name = file
            .tracers
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.clone(), i))
            .collect();
        let by_lowercase = file
            .tracers
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.to_lowercase(), i))
            .collect();

        Ok(Self {
            tracers: file.tracers,
            by_name,
            by_lowercase,
            generic_tracers: file.generic_tracers,
            color_codes: file.color_codes,
        })
    }

    pub fn get(&self, name: &str) -> Option<&Tracer> {
        self.by_name.get(name).map(|&i| &self.tracers[i])
    }

    pub fn get_case_insensitive(&self, name: &str) -> Option<&Tracer> {
        self.by_lowercase
            .get(&name.to_lowercase())
            .map(|&i| &self.tracers[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn tracers(&self) -> &[Tracer] {
        &self.tracers
    }

    /// RGB scaling code used to colorize a gray image, e.g. `[1, 0, 0]` for red
    pub fn color_code(&self, color: &str) -> Option<[u8; 3]> {
        self.color_codes.get(color).copied()
    }

    pub fn tracer_code(&self, name: &str) -> Option<[u8; 3]> {
        self.get(name).and_then(|t| self.color_code(&t.color))
    }

    pub fn colors(&self) -> impl Iterator<Item = &str> {
        self.color_codes.keys().map(String::as_str)
    }

    /// Reverse lookup from the registration-table name
    pub fn by_table_name(&self, table_name: &str) -> Option<&Tracer> {
        self.tracers
            .iter()
            .find(|t| t.table_name.as_deref() == Some(table_name))
    }

    /// Placeholder tracer names (`retro_red`, ...) and their colors
    pub fn generic_tracers(&self) -> &BTreeMap<String, String> {
        &self.generic_tracers
    }
}
