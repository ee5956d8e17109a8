//! Integration tests for the catalog sync and download flow
//!
//! These tests drive [`AppContext`] through the public API only, with an
//! in-memory remote whose content can change between calls.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tempfile::TempDir;
use wpgp_fetcher::app::resolver::ResolveWarning;
use wpgp_fetcher::app::transport::local_file_name;
use wpgp_fetcher::errors::{AppError, TransportError, TransportResult, UserInputError};
use wpgp_fetcher::prelude::*;

const MANIFEST: &str = "assets/wpgpDatasets.csv";
const HEADER: &str = "ID,ISO,ISO3,CountryName,DataSetName,Description,PathToRaster\n";

#[derive(Default)]
struct Remote {
    files: HashMap<String, Vec<u8>>,
    broken: HashSet<String>,
    downloads: Vec<String>,
}

/// Transport backed by a shared [`Remote`] so tests can edit it mid-run
struct MemoryTransport(Rc<RefCell<Remote>>);

impl MemoryTransport {
    fn unreachable(remote_path: &str) -> TransportError {
        TransportError::Connect {
            host: "memory".to_string(),
            reason: format!("no such file {}", remote_path),
        }
    }
}

impl Transport for MemoryTransport {
    fn describe(&self) -> String {
        "memory://".to_string()
    }

    fn probe_fingerprint(&mut self, remote_path: &str) -> TransportResult<Fingerprint> {
        self.0
            .borrow()
            .files
            .get(remote_path)
            .map(|content| Fingerprint::of_bytes(content))
            .ok_or_else(|| Self::unreachable(remote_path))
    }

    fn download_to(
        &mut self,
        remote_path: &str,
        local_dir: &Path,
        _show_progress: bool,
    ) -> TransportResult<PathBuf> {
        let mut remote = self.0.borrow_mut();
        remote.downloads.push(remote_path.to_string());
        if remote.broken.contains(remote_path) {
            return Err(Self::unreachable(remote_path));
        }
        let content = remote
            .files
            .get(remote_path)
            .ok_or_else(|| Self::unreachable(remote_path))?;

        let path = local_dir.join(local_file_name(remote_path));
        fs::write(&path, content).map_err(|source| TransportError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

fn kenya_manifest() -> String {
    let mut csv = String::from(HEADER);
    csv.push_str("1,404,KEN,Kenya,ppp_2000,Estimated population 2000,GIS/Population/KEN/ken_ppp_2000.tif\n");
    csv.push_str("2,404,KEN,Kenya,ppp_2020,Estimated population 2020,GIS/Population/KEN/ken_ppp_2020.tif\n");
    csv.push_str("3,404,KEN,Kenya,srtm,SRTM elevation,GIS/Covariates/KEN/ken_srtm.tif\n");
    csv.push_str("9,800,UGA,Uganda,ppp_2000,Estimated population 2000,GIS/Population/UGA/uga_ppp_2000.tif\n");
    csv
}

fn setup() -> (TempDir, Rc<RefCell<Remote>>, AppContext) {
    let dir = TempDir::new().unwrap();
    let remote = Rc::new(RefCell::new(Remote::default()));
    {
        let mut remote = remote.borrow_mut();
        remote.files.insert(MANIFEST.to_string(), kenya_manifest().into_bytes());
        for (i, path) in [
            "GIS/Population/KEN/ken_ppp_2000.tif",
            "GIS/Population/KEN/ken_ppp_2020.tif",
            "GIS/Covariates/KEN/ken_srtm.tif",
        ]
        .into_iter()
        .enumerate()
        {
            remote
                .files
                .insert(path.to_string(), format!("raster-{}", i).into_bytes());
        }
    }

    let store = CatalogStore::new(dir.path().join("catalog/wpgpDatasets.csv.gz"), Compression::Gzip);
    let ctx = AppContext::new(store, TransportConfig::default(), MANIFEST)
        .with_transport(Box::new(MemoryTransport(Rc::clone(&remote))));
    (dir, remote, ctx)
}

/// Test a first run against an empty machine
/// Purpose: Verify the missing catalog is reported stale, fetched, and used
/// Benefit: Covers the path every new user goes through
#[test]
fn test_first_run_fetches_catalog_and_downloads() {
    let (_dir, remote, mut ctx) = setup();
    let output = TempDir::new().unwrap();

    assert!(ctx.needs_update().unwrap());
    let outcome = ctx.perform_update(false, |_| true).unwrap();
    assert!(matches!(outcome, UpdateOutcome::Updated { records: 4, .. }));
    assert!(!ctx.needs_update().unwrap());

    let plan = ctx.resolve_targets("KEN", [1, 2, 5], None).unwrap();
    assert_eq!(plan.alpha3, "KEN");
    assert_eq!(plan.valid_ids, BTreeSet::from([1, 2]));
    assert_eq!(plan.invalid_ids, BTreeSet::from([5]));
    assert_eq!(
        plan.warnings,
        vec![ResolveWarning::UnknownIds {
            ids: BTreeSet::from([5])
        }]
    );

    let report = ctx
        .download_plan(&plan, output.path(), DownloadOptions::default(), |_| {})
        .unwrap();
    assert!(report.is_success());
    assert_eq!(report.completed.len(), 2);
    assert_eq!(
        fs::read_to_string(output.path().join("ken_ppp_2000.tif")).unwrap(),
        "raster-0"
    );
    assert_eq!(
        remote.borrow().downloads,
        vec![
            MANIFEST.to_string(),
            "GIS/Population/KEN/ken_ppp_2000.tif".to_string(),
            "GIS/Population/KEN/ken_ppp_2020.tif".to_string(),
        ]
    );
}

#[test]
fn test_alpha2_and_numeric_codes_resolve_to_same_country() {
    let (_dir, _remote, mut ctx) = setup();
    ctx.force_update(false).unwrap();

    for code in ["KEN", "ken", "KE", "404"] {
        let selection = ctx.iter_datasets_for_country(code, None).unwrap();
        assert_eq!(selection.catalog.alpha3(), "KEN", "code {}", code);
        assert_eq!(selection.catalog.len(), 3);
    }
}

#[test]
fn test_unknown_country_is_user_error() {
    let (_dir, _remote, mut ctx) = setup();
    ctx.force_update(false).unwrap();

    let err = ctx.resolve_targets("ZZZ", [1], None).unwrap_err();
    assert!(matches!(
        err,
        AppError::UserInput(UserInputError::UnknownCountry { .. })
    ));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_empty_id_list_is_rejected() {
    let (_dir, _remote, mut ctx) = setup();
    ctx.force_update(false).unwrap();

    let err = ctx.resolve_targets("KEN", Vec::new(), None).unwrap_err();
    assert!(matches!(
        err,
        AppError::UserInput(UserInputError::NoIdsProvided)
    ));
}

/// Test description filtering during resolution
/// Purpose: Verify ids outside the filtered view are reported, not fetched
/// Benefit: A filter narrows downloads exactly like it narrows listings
#[test]
fn test_filter_restricts_resolved_ids() {
    let (_dir, _remote, mut ctx) = setup();
    ctx.force_update(false).unwrap();

    let plan = ctx
        .resolve_targets("KEN", [1, 3], Some("POPULATION"))
        .unwrap();
    let ids: Vec<u32> = plan.targets.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1]);
    assert_eq!(plan.invalid_ids, BTreeSet::from([3]));
}

#[test]
fn test_country_without_datasets_warns() {
    let (_dir, _remote, mut ctx) = setup();
    ctx.force_update(false).unwrap();

    let selection = ctx.iter_datasets_for_country("FRA", None).unwrap();
    assert!(selection.catalog.is_empty());
    assert_eq!(
        selection.warnings,
        vec![ResolveWarning::EmptyCountry {
            alpha3: "FRA".to_string()
        }]
    );
}

/// Test remote catalog changes
/// Purpose: Verify a changed manifest is detected and replaces the index
/// Benefit: Queries after an update never see records from the old catalog
#[test]
fn test_remote_change_is_detected_and_installed() {
    let (_dir, remote, mut ctx) = setup();
    ctx.force_update(false).unwrap();
    assert!(ctx.resolve_targets("KEN", [7], None).is_err());

    let mut updated = kenya_manifest();
    updated.push_str("7,404,KEN,Kenya,ppp_2021,Estimated population 2021,GIS/Population/KEN/ken_ppp_2021.tif\n");
    remote
        .borrow_mut()
        .files
        .insert(MANIFEST.to_string(), updated.clone().into_bytes());

    let report = ctx.check_for_update().unwrap();
    assert!(report.is_stale());
    assert_eq!(report.remote, Fingerprint::of_bytes(updated.as_bytes()));

    ctx.perform_update(false, |_| true).unwrap();
    let plan = ctx.resolve_targets("KEN", [7], None).unwrap();
    assert_eq!(plan.targets[0].file_name(), "ken_ppp_2021.tif");
}

#[test]
fn test_failed_refresh_keeps_previous_catalog() {
    let (_dir, remote, mut ctx) = setup();
    ctx.force_update(false).unwrap();
    let before = ctx.store().current_fingerprint().unwrap();

    remote.borrow_mut().broken.insert(MANIFEST.to_string());
    assert!(ctx.force_update(false).is_err());

    assert_eq!(ctx.store().current_fingerprint().unwrap(), before);
    ctx.invalidate_catalog();
    assert_eq!(ctx.catalog().unwrap().len(), 4);
}

/// Test failure policies
/// Purpose: Verify abort skips what is left while continue carries on
/// Benefit: Users get the behaviour they asked for on flaky connections
#[test]
fn test_failure_policies() {
    let (_dir, remote, mut ctx) = setup();
    ctx.force_update(false).unwrap();
    remote
        .borrow_mut()
        .broken
        .insert("GIS/Population/KEN/ken_ppp_2000.tif".to_string());
    let plan = ctx.resolve_targets("KEN", [1, 2, 3], None).unwrap();

    let output = TempDir::new().unwrap();
    let aborted = ctx
        .download_plan(&plan, output.path(), DownloadOptions::default(), |_| {})
        .unwrap();
    assert_eq!(aborted.failed.len(), 1);
    assert_eq!(aborted.skipped.len(), 2);
    assert!(aborted.completed.is_empty());

    let output = TempDir::new().unwrap();
    let options = DownloadOptions {
        policy: FailurePolicy::Continue,
        show_progress: false,
    };
    let mut events = Vec::new();
    let continued = ctx
        .download_plan(&plan, output.path(), options, |event| {
            events.push(match event {
                SessionEvent::Started { position, .. } => format!("start {}", position),
                SessionEvent::Completed(done) => format!("done {}", done.record.id),
                SessionEvent::Failed(failed) => format!("failed {}", failed.record.id),
                SessionEvent::Skipped(record) => format!("skipped {}", record.id),
            })
        })
        .unwrap();
    assert_eq!(continued.completed.len(), 2);
    assert_eq!(continued.failed.len(), 1);
    assert!(!continued.is_success());
    assert_eq!(
        events,
        vec!["start 1", "failed 1", "start 2", "done 2", "start 3", "done 3"]
    );
}
