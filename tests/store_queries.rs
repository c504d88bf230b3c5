//! Integration tests for the store and its queries
//!
//! Runs every query against the bundled demo samples and checks caching
//! behavior with a counting fake fetcher.

use hiresight::config::Settings;
use hiresight::data::{DatasetKind, FetchError, LoaderError, RemoteFetcher, TableLoader};
use hiresight::query::GeoLevel;
use hiresight::OewsStore;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct FakeFetcher {
    body: Vec<u8>,
    failures: usize,
    calls: Arc<AtomicUsize>,
}

impl RemoteFetcher for FakeFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) < self.failures {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: 500,
            });
        }
        Ok(self.body.clone())
    }
}

fn demo_store() -> OewsStore {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings {
        data_dir: dir.path().to_path_buf(),
        sample_dir: "sample_data".into(),
        demo_mode: true,
        ..Settings::default()
    };
    OewsStore::from_settings(settings)
}

fn remote_store(failures: usize) -> (OewsStore, Arc<AtomicUsize>) {
    let dir = tempfile::tempdir().unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let fetcher = FakeFetcher {
        body: std::fs::read("testdata/national.csv").unwrap(),
        failures,
        calls: Arc::clone(&calls),
    };
    let settings = Settings {
        data_dir: dir.path().to_path_buf(),
        sample_dir: dir.path().to_path_buf(),
        ..Settings::default()
    }
    .with_remote_url(DatasetKind::National, "https://oews.example.test/national.csv");

    let store = OewsStore::new(TableLoader::new(settings, Box::new(fetcher)));
    (store, calls)
}

#[test]
fn test_tables_are_loaded_once_and_shared() {
    let (store, calls) = remote_store(0);
    assert!(!store.is_loaded(DatasetKind::National));

    let first = store.load(DatasetKind::National).unwrap();
    let second = store.load_named("national").unwrap();
    store.top_occupations_by_employment(5).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert!(store.is_loaded(DatasetKind::National));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_failed_load_is_retried() {
    let (store, calls) = remote_store(1);

    let err = store.load(DatasetKind::National).unwrap_err();
    assert!(matches!(err, LoaderError::MissingSource { .. }));
    assert!(!store.is_loaded(DatasetKind::National));

    let table = store.load(DatasetKind::National).unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_concurrent_first_loads_fetch_once() {
    let (store, calls) = remote_store(0);
    let store = Arc::new(store);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || store.load(DatasetKind::National).map(|t| t.len()))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), 3);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_missing_source_surfaces_from_queries() {
    let dir = tempfile::tempdir().unwrap();
    let store = OewsStore::from_settings(Settings {
        data_dir: dir.path().to_path_buf(),
        sample_dir: dir.path().to_path_buf(),
        ..Settings::default()
    });

    let err = store.industry_mix_for_occ("15-1252", 5).unwrap_err();
    assert!(err.to_string().contains("OEWS_URL_NATSECT"));
    assert!(store.occupation_list_az().is_err());
}

#[test]
fn test_top_occupations_from_demo_sample() {
    let store = demo_store();
    let top = store.top_occupations_by_employment(3).unwrap();
    let codes: Vec<&str> = top.iter().map(|s| s.occ_code.as_str()).collect();
    assert_eq!(codes, vec!["41-2031", "35-3023", "29-1141"]);

    let all = store.top_occupations_by_employment(100).unwrap();
    assert!(all.iter().all(|s| s.occ_code != "00-0000"));
    assert!(all.iter().all(|s| s.occ_code != "11-0000"), "major groups are not in the crosswalk");

    let by_median = store.top_occupations_by_median_wage(1).unwrap();
    assert_eq!(by_median[0].occ_code, "11-1011");
}

#[test]
fn test_snapshot_from_demo_sample() {
    let store = demo_store();
    assert_eq!(store.us_median_wage().unwrap(), 49_500.0);

    let snap = store.snapshot_for_occ("15-1252").unwrap().unwrap();
    assert_eq!(snap.occ_title, "Software Developers");
    assert_eq!(snap.median_wage, 138_110.0);
    assert_eq!(snap.wage_range, (79_310.0, 211_450.0));
    assert!((snap.relative_wage - 138_110.0 / 49_500.0).abs() < 1e-12);

    assert!(store.snapshot_for_occ("99-9999").unwrap().is_none());

    let json = serde_json::to_value(&snap).unwrap();
    assert_eq!(json["OCC_CODE"], "15-1252");
    assert_eq!(json["A_MEDIAN"], 138_110.0);
}

#[test]
fn test_wage_distribution_from_demo_sample() {
    let store = demo_store();
    let points = store.wage_distribution_for_occ("11-1011").unwrap();
    assert_eq!(points.len(), 5);
    assert_eq!(points[2].annual_wage, 206_680.0);
    assert!(points[3].annual_wage.is_nan(), "suppressed P75 stays absent");

    let json = serde_json::to_value(&points).unwrap();
    assert!(json[4]["ANNUAL_WAGE"].is_null());
}

#[test]
fn test_geography_queries_from_demo_sample() {
    let store = demo_store();

    let states = store
        .top_geographies_for_occ("15-1252", GeoLevel::State, 2)
        .unwrap();
    let titles: Vec<&str> = states.iter().filter_map(|g| g.area_title.as_deref()).collect();
    assert_eq!(titles, vec!["California", "Washington"]);

    let metros = store
        .top_geographies_for_occ("15-1252", GeoLevel::Msa, 1)
        .unwrap();
    assert_eq!(
        metros[0].area_title.as_deref(),
        Some("San Jose-Sunnyvale-Santa Clara, CA")
    );

    let concentration = store
        .employment_concentration_for_occ("15-1252", GeoLevel::State, 10)
        .unwrap();
    assert_eq!(concentration[0].area_title.as_deref(), Some("Washington"));
    assert_eq!(concentration[0].location_quotient, 2.59);
    assert_eq!(concentration.len(), 5);
}

#[test]
fn test_concentration_approximated_without_published_quotients() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings {
        data_dir: dir.path().to_path_buf(),
        sample_dir: dir.path().to_path_buf(),
        ..Settings::default()
    }
    .with_local_file(DatasetKind::National, "testdata/national.csv")
    .with_local_file(DatasetKind::State, "testdata/state_textual.csv");
    let store = OewsStore::from_settings(settings);

    let areas = store
        .employment_concentration_for_occ("15-1252", GeoLevel::State, 10)
        .unwrap();
    let titles: Vec<&str> = areas.iter().filter_map(|a| a.area_title.as_deref()).collect();
    assert_eq!(titles, vec!["Washington", "California", "Ohio"]);
    assert!((areas[0].location_quotient - 2.0).abs() < 1e-9);
}

#[test]
fn test_industry_mix_from_demo_sample() {
    let store = demo_store();
    let mix = store.industry_mix_for_occ("15-1252", 3).unwrap();
    assert_eq!(mix.len(), 3);
    assert_eq!(
        mix[0].industry,
        "Professional, Scientific, and Technical Services"
    );
    assert_eq!(mix[0].share_pct, Some(39.61));
    assert!(store.industry_mix_for_occ("99-9999", 3).unwrap().is_empty());
}

#[test]
fn test_all_snapshots_cover_the_listing() {
    let store = demo_store();
    let listing = store.occupation_list_az().unwrap();
    let snapshots = store.all_snapshots().unwrap();

    assert_eq!(listing.len(), snapshots.len());
    assert_eq!(listing[0].occ_title.as_deref(), Some("Chief Executives"));
    let codes: Vec<&str> = snapshots.iter().map(|s| s.occ_code.as_str()).collect();
    let listed: Vec<&str> = listing.iter().map(|l| l.occ_code.as_str()).collect();
    assert_eq!(codes, listed);
}

#[test]
fn test_normalized_table_round_trips_through_dataframe() {
    let store = demo_store();
    let table = store.load(DatasetKind::State).unwrap();
    let df = table.to_dataframe().unwrap();
    let again = hiresight::OewsTable::from_frame(DatasetKind::State, &df).unwrap();
    assert_eq!(table.rows(), again.rows());
}
