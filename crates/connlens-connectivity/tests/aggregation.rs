// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! End-to-end aggregation of level files into tracer connectivity.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use connlens_atlas::AtlasId;
use connlens_connectivity::{
    ConnectivityContext, ConnectivityError, Hemisphere, IngestSettings, InjectionSiteMap,
    InjectionSiteOverride, TracerConnectivity, TracerOptions,
};
use tempfile::{tempdir, TempDir};

const CASE: &str = "SW160120-01B";

fn context() -> ConnectivityContext {
    ConnectivityContext::new(IngestSettings::default()).unwrap()
}

struct Level<'a> {
    level: &'a str,
    tracer: &'a str,
    injection_site: &'a str,
    atlas: Option<&'a str>,
    records: &'a [&'a str],
}

impl<'a> Level<'a> {
    fn bda(level: &'a str, records: &'a [&'a str]) -> Self {
        Self {
            level,
            tracer: "BDA",
            injection_site: "ACB",
            atlas: None,
            records,
        }
    }

    fn write(&self, dir: &Path, name: &str) {
        let mut content = format!(
            "Project Name: MCP\nCase Name: {}\nSlide Number: 3\nChannel Number: 2\nARA Level: {}\nTracer: {}\nInjection Site: {}\n",
            CASE, self.level, self.tracer, self.injection_site
        );
        if let Some(atlas) = self.atlas {
            content.push_str(&format!("Atlas Name: {}\n", atlas));
        }
        content.push_str("(HEMISPHERE:R:G:B),atlas_only,overlap,region\n");
        for record in self.records {
            content.push_str(record);
            content.push('\n');
        }
        fs::write(dir.join(name), content).unwrap();
    }
}

/// Two BDA levels of SW160120-01B
fn bda_case() -> TempDir {
    let dir = tempdir().unwrap();
    Level::bda(
        "045",
        &[
            "(l:0:156:112),0.2,0.3,GU_6b",
            "(r:0:156:112),0.5,0.1,GU_6b",
            "(l:128:225:248),1.0,2.0,ACB",
            "(r:170:170:173),4.0,1.0,AQ",
        ],
    )
    .write(dir.path(), "SW160120-01B_045.csv");
    Level::bda(
        "046",
        &["(l:0:156:112),0.1,0.4,GU_6b", "(l:1:2:3),1.0,1.0,NotARegion"],
    )
    .write(dir.path(), "SW160120-01B_046.csv");
    dir
}

fn open(dir: &Path, options: &TracerOptions) -> Result<TracerConnectivity, ConnectivityError> {
    TracerConnectivity::open(dir, None, &context(), options)
}

fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 1e-9, "{} != {}", actual, expected);
}

#[test]
fn test_bda_case_is_atlas_complete() {
    let dir = bda_case();
    let tracer = open(dir.path(), &TracerOptions::default()).unwrap();

    assert_eq!(tracer.case(), CASE);
    assert_eq!(tracer.channel(), "2");
    assert_eq!(tracer.project(), Some("MCP"));
    assert_eq!(tracer.tracer(), "BDA");
    assert!(tracer.is_anterograde());
    assert!(!tracer.is_cell_count());
    assert_eq!(tracer.atlas(), AtlasId::Ara);
    assert_eq!(tracer.injection_site(), Some("ACB"));
    assert_eq!(tracer.active_levels(), vec![45, 46]);

    let gray = tracer.registry().gray_matter().len();
    assert_eq!(tracer.table().len(), 2 * gray);

    let gu_left = tracer.row("GU_6b_c").unwrap();
    assert_eq!(gu_left.hemisphere, Hemisphere::Left);
    assert_close(gu_left.overlap, 0.7);
    assert_close(gu_left.area, 1.0);

    let gu_right = tracer.row("GU_6b_i").unwrap();
    assert_close(gu_right.overlap, 0.1);
    assert_close(gu_right.area, 0.6);

    let unobserved = tracer.row("CP_i").unwrap();
    assert_eq!(unobserved.overlap, 0.0);
    assert_eq!(unobserved.area, 0.0);

    assert!(tracer.row("AQ_i").is_none());
    assert_eq!(tracer.level(46).unwrap().diagnostics().len(), 1);
}

#[test]
fn test_zero_area_level_adds_nothing() {
    let dir = tempdir().unwrap();
    Level::bda(
        "045",
        &["(l:0:156:112),0.2,0.3,GU_6b", "(r:0:156:112),0.1,0.1,GU_6b"],
    )
    .write(dir.path(), "SW160120-01B_045.csv");
    Level::bda("046", &["(l:0:156:112),0.0,0.0,GU_6b"]).write(dir.path(), "SW160120-01B_046.csv");

    let tracer = open(dir.path(), &TracerOptions::default()).unwrap();
    assert_eq!(tracer.active_levels(), vec![45, 46]);

    let left = tracer.row("GU_6b_c").unwrap();
    assert_close(left.overlap, 0.3);
    assert_close(left.area, 0.5);
    let right = tracer.row("GU_6b_i").unwrap();
    assert_close(right.overlap, 0.1);
    assert_close(right.area, 0.2);

    assert!(tracer
        .table()
        .iter()
        .all(|row| row.overlap >= 0.0 && row.area >= 0.0 && !row.overlap.is_nan()));
    assert_eq!(
        tracer.table().len(),
        2 * tracer.registry().gray_matter().len()
    );
    assert_eq!(
        tracer
            .table()
            .iter()
            .filter(|row| row.overlap != 0.0 || row.area != 0.0)
            .count(),
        2
    );
}

#[test]
fn test_table_is_sorted_left_before_right() {
    let dir = bda_case();
    let tracer = open(dir.path(), &TracerOptions::default()).unwrap();
    let keys: Vec<_> = tracer
        .table()
        .iter()
        .map(|row| (row.index, row.hemisphere))
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(keys, sorted);
    assert_eq!(tracer.table()[0].hemisphere, Hemisphere::Left);
    assert_eq!(tracer.table()[1].hemisphere, Hemisphere::Right);
}

#[test]
fn test_level_masking_is_idempotent() {
    let dir = bda_case();
    let mut tracer = open(dir.path(), &TracerOptions::default()).unwrap();
    let original = tracer.table().to_vec();

    tracer.set_level_subset(Some(BTreeSet::from([45])));
    assert_eq!(tracer.active_levels(), vec![45]);
    assert_close(tracer.row("GU_6b_c").unwrap().overlap, 0.3);
    assert_eq!(tracer.table().len(), original.len());

    let masked: Vec<_> = tracer
        .connectivity_by_level()
        .into_iter()
        .filter(|row| row.level == 46)
        .collect();
    assert!(!masked.is_empty());
    assert!(masked.iter().all(|row| row.row.overlap == 0.0 && row.row.area == 0.0));

    tracer.set_level_subset(Some(BTreeSet::from([45, 46])));
    tracer.set_level_subset(Some(BTreeSet::from([45, 46])));
    assert_eq!(tracer.table(), original.as_slice());

    tracer.set_level_subset(None);
    assert_eq!(tracer.table(), original.as_slice());
}

#[test]
fn test_top_overlap_regions() {
    let dir = bda_case();
    let tracer = open(dir.path(), &TracerOptions::default()).unwrap();
    assert_eq!(tracer.top_overlap_regions(2), vec!["ACB_c", "GU_6b_c"]);
    assert_eq!(tracer.top_overlap_regions(3)[2], "GU_6b_i");
}

#[test]
fn test_case_tracer_identity() {
    let dir = bda_case();
    let tracer = open(dir.path(), &TracerOptions::default()).unwrap();
    assert_eq!(tracer.case_tracer(false).unwrap(), "SW160120-01B_BDA");
    assert_eq!(tracer.case_tracer(true).unwrap(), "SW160120-01_BDA");
}

#[test]
fn test_unsupported_files_are_skipped() {
    let dir = bda_case();
    fs::write(
        dir.path().join("SW160120-01B_047.csv"),
        "Case Name: SW160120-01B\nARA Level: 047\nTracer: BDA\n(l:0:156:112),0.2,0.3,GU_6b\n",
    )
    .unwrap();
    Level {
        tracer: "Glitter",
        ..Level::bda("048", &[])
    }
    .write(dir.path(), "SW160120-01B_048.csv");
    fs::write(dir.path().join("notes.txt"), "not a level").unwrap();

    let tracer = open(dir.path(), &TracerOptions::default()).unwrap();
    assert_eq!(tracer.active_levels(), vec![45, 46]);
    let skipped: Vec<_> = tracer
        .skipped_files()
        .iter()
        .map(|file| file.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(skipped, vec!["SW160120-01B_047.csv", "SW160120-01B_048.csv"]);
}

#[test]
fn test_no_levels() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("old.csv"), "Case Name: X\nTracer: BDA\n").unwrap();
    assert!(matches!(
        open(dir.path(), &TracerOptions::default()),
        Err(ConnectivityError::NoLevels { .. })
    ));
}

#[test]
fn test_duplicate_level() {
    let dir = bda_case();
    Level::bda("045", &[]).write(dir.path(), "SW160120-01B_045_rerun.csv");
    assert!(matches!(
        open(dir.path(), &TracerOptions::default()),
        Err(ConnectivityError::DuplicateLevel { level: 45, .. })
    ));
}

#[test]
fn test_metadata_conflict_names_levels_and_field() {
    let dir = bda_case();
    Level {
        injection_site: "CP",
        ..Level::bda("050", &[])
    }
    .write(dir.path(), "SW160120-01B_050.csv");

    match open(dir.path(), &TracerOptions::default()) {
        Err(ConnectivityError::MetadataConsistency {
            case,
            channel,
            first_level,
            level,
            field,
        }) => {
            assert_eq!(case, CASE);
            assert_eq!(channel, "2");
            assert_eq!(first_level, 45);
            assert_eq!(level, 50);
            assert_eq!(field, "injection site");
        }
        other => panic!("expected metadata conflict, got {:?}", other.map(|t| t.case().to_string())),
    }
}

#[test]
fn test_injection_site_overrides() {
    let dir = bda_case();

    let explicit = TracerOptions {
        injection_site: Some(InjectionSiteOverride::Explicit("SSp-bfd".to_string())),
        injection_site_level: Some(60),
    };
    let mut tracer = open(dir.path(), &explicit).unwrap();
    assert_eq!(tracer.injection_site(), Some("SSp-bfd"));
    assert_eq!(tracer.injection_site_level(), Some(60));

    tracer.set_injection_site("MOs", Some(55));
    assert_eq!(tracer.injection_site(), Some("MOs"));
    assert_eq!(tracer.injection_site_level(), Some(55));

    let lookup = TracerOptions {
        injection_site: Some(InjectionSiteOverride::Lookup(
            InjectionSiteMap::new().with_case_channel(CASE, "2", "ACB_core"),
        )),
        injection_site_level: None,
    };
    let tracer = open(dir.path(), &lookup).unwrap();
    assert_eq!(tracer.injection_site(), Some("ACB_core"));
}

#[test]
fn test_custom_atlas_regions_are_not_gray_matter() {
    let dir = tempdir().unwrap();
    Level {
        atlas: Some("BLAA_DIVISIONS"),
        ..Level::bda(
            "045",
            &["(l:23:34:240),1.0,1.0,BLA_al", "(l:0:156:112),0.2,0.3,GU_6b"],
        )
    }
    .write(dir.path(), "SW160120-01B_045.csv");

    let tracer = open(dir.path(), &TracerOptions::default()).unwrap();
    assert_eq!(tracer.atlas(), AtlasId::BlaaDivisions);
    assert!(tracer.registry().contains("BLA_al"));
    assert!(tracer.row("BLA_al_c").is_none());
    assert_close(tracer.row("GU_6b_c").unwrap().overlap, 0.3);
    assert_eq!(
        tracer.table().len(),
        2 * tracer.registry().gray_matter().len()
    );
    assert_eq!(tracer.level(45).unwrap().all_rows().len(), 2);
}

#[test]
fn test_explicit_file_list() {
    let dir = bda_case();
    let files = vec!["SW160120-01B_046.csv".to_string()];
    let tracer =
        TracerConnectivity::open(dir.path(), Some(&files), &context(), &TracerOptions::default())
            .unwrap();
    assert_eq!(tracer.active_levels(), vec![46]);
    assert_close(tracer.row("GU_6b_c").unwrap().overlap, 0.4);
}

#[test]
fn test_missing_directory() {
    let dir = tempdir().unwrap();
    assert!(matches!(
        open(&dir.path().join("missing"), &TracerOptions::default()),
        Err(ConnectivityError::InvalidDirectory { .. })
    ));
}
