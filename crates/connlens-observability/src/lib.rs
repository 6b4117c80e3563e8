// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # connlens-observability
//!
//! Logging setup for connlens binaries and tests.
//!
//! Library crates only emit `tracing` events with a `connlens-<crate>` target;
//! this crate installs the subscriber, honoring per-crate debug flags
//! (`--debug-connlens-connectivity`, `CONNLENS_DEBUG=all`).

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::*;
pub use config::*;
pub use init::*;

/// Known connlens crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "connlens-atlas",
    "connlens-connectivity",
    "connlens-config",
];
