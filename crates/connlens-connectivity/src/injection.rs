// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Injection site overrides applied when aggregating a tracer.

use std::collections::BTreeMap;

/// Remapping of injection sites, by parsed site or by (case, channel)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectionSiteMap {
    by_site: BTreeMap<String, String>,
    by_case_channel: BTreeMap<(String, String), String>,
}

impl InjectionSiteMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the parsed site `from` with `to`
    pub fn with_site(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.by_site.insert(from.into(), to.into());
        self
    }

    /// Use `site` for every file of `case` imaged on `channel`
    pub fn with_case_channel(
        mut self,
        case: impl Into<String>,
        channel: impl Into<String>,
        site: impl Into<String>,
    ) -> Self {
        self.by_case_channel
            .insert((case.into(), channel.into()), site.into());
        self
    }

    pub fn lookup(&self, parsed: Option<&str>, case: &str, channel: &str) -> Option<&str> {
        parsed
            .and_then(|site| self.by_site.get(site))
            .or_else(|| {
                self.by_case_channel
                    .get(&(case.to_string(), channel.to_string()))
            })
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.by_site.is_empty() && self.by_case_channel.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectionSiteOverride {
    /// Always use this site
    Explicit(String),
    /// Remap the parsed site; unmatched sites are kept
    Lookup(InjectionSiteMap),
}

impl InjectionSiteOverride {
    /// Resolve the injection site of one case/channel.
    ///
    /// Explicit wins, then the site lookup, then the (case, channel) lookup,
    /// then the parsed value.
    pub fn resolve(&self, parsed: Option<&str>, case: &str, channel: &str) -> Option<String> {
        match self {
            InjectionSiteOverride::Explicit(site) => Some(site.clone()),
            InjectionSiteOverride::Lookup(map) => map
                .lookup(parsed, case, channel)
                .or(parsed)
                .map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_wins() {
        let site = InjectionSiteOverride::Explicit("SSp-bfd".to_string());
        assert_eq!(
            site.resolve(Some("ACB"), "SW160120-01B", "2").as_deref(),
            Some("SSp-bfd")
        );
        assert_eq!(site.resolve(None, "SW160120-01B", "2").as_deref(), Some("SSp-bfd"));
    }

    #[test]
    fn test_lookup_order() {
        let map = InjectionSiteMap::new()
            .with_site("ACB", "ACB_core")
            .with_case_channel("SW160120-01B", "2", "CP");
        let site = InjectionSiteOverride::Lookup(map);

        assert_eq!(
            site.resolve(Some("ACB"), "SW160120-01B", "2").as_deref(),
            Some("ACB_core")
        );
        assert_eq!(
            site.resolve(Some("MOp"), "SW160120-01B", "2").as_deref(),
            Some("CP")
        );
        assert_eq!(
            site.resolve(Some("MOp"), "SW160120-01B", "3").as_deref(),
            Some("MOp")
        );
        assert_eq!(site.resolve(None, "SW999999-01A", "1"), None);
    }
}
