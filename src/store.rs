//! OEWS Store
//! Loader, per-kind table cache and national crosswalk wired to the queries.

use log::debug;
use rayon::prelude::*;
use std::sync::{Arc, OnceLock};

use crate::config::Settings;
use crate::data::{DatasetKind, LoaderError, OewsTable, SingleFlightCache, TableLoader};
use crate::query::{self, Crosswalk, GeoLevel};

/// Process-lifetime access point for OEWS tables and the queries over them.
///
/// Each table kind is loaded at most once; concurrent first requests for a
/// kind wait for the same load. A failed load is retried on the next request.
pub struct OewsStore {
    loader: TableLoader,
    tables: SingleFlightCache<DatasetKind, OewsTable>,
    crosswalk: SingleFlightCache<(), Crosswalk>,
}

impl OewsStore {
    pub fn new(loader: TableLoader) -> Self {
        Self {
            loader,
            tables: SingleFlightCache::new(),
            crosswalk: SingleFlightCache::new(),
        }
    }

    pub fn from_settings(settings: Settings) -> Self {
        Self::new(TableLoader::from_settings(settings))
    }

    pub fn from_env() -> Self {
        Self::from_settings(Settings::from_env())
    }

    /// Shared store configured from the environment on first use.
    pub fn global() -> &'static OewsStore {
        static STORE: OnceLock<OewsStore> = OnceLock::new();
        STORE.get_or_init(OewsStore::from_env)
    }

    pub fn settings(&self) -> &Settings {
        self.loader.settings()
    }

    /// The materialized table for a kind, loading it on first use.
    pub fn load(&self, kind: DatasetKind) -> Result<Arc<OewsTable>, LoaderError> {
        self.tables.get_or_try_init(&kind, || {
            debug!("Cache miss for {kind} table");
            self.loader.load(kind)
        })
    }

    /// Same as [`OewsStore::load`], with the kind given by name.
    pub fn load_named(&self, name: &str) -> Result<Arc<OewsTable>, LoaderError> {
        let kind: DatasetKind = name.parse()?;
        self.load(kind)
    }

    pub fn is_loaded(&self, kind: DatasetKind) -> bool {
        self.tables.is_cached(&kind)
    }

    pub fn national_crosswalk(&self) -> Result<Arc<Crosswalk>, LoaderError> {
        self.crosswalk.get_or_try_init(&(), || {
            let national = self.load(DatasetKind::National)?;
            Ok(Crosswalk::from_national(&national))
        })
    }

    pub fn top_occupations_by_employment(
        &self,
        k: usize,
    ) -> Result<Vec<query::OccupationSummary>, LoaderError> {
        let crosswalk = self.national_crosswalk()?;
        Ok(query::top_occupations_by_employment(&crosswalk, k))
    }

    pub fn top_occupations_by_median_wage(
        &self,
        k: usize,
    ) -> Result<Vec<query::WageRanking>, LoaderError> {
        let crosswalk = self.national_crosswalk()?;
        Ok(query::top_occupations_by_median_wage(&crosswalk, k))
    }

    pub fn top_occupations_by_p90_wage(
        &self,
        k: usize,
    ) -> Result<Vec<query::WageRanking>, LoaderError> {
        let crosswalk = self.national_crosswalk()?;
        Ok(query::top_occupations_by_p90_wage(&crosswalk, k))
    }

    pub fn occupation_list_az(&self) -> Result<Vec<query::OccupationListing>, LoaderError> {
        let crosswalk = self.national_crosswalk()?;
        Ok(query::occupation_list_az(&crosswalk))
    }

    pub fn us_median_wage(&self) -> Result<f64, LoaderError> {
        let crosswalk = self.national_crosswalk()?;
        Ok(query::us_median_wage(&crosswalk))
    }

    pub fn snapshot_for_occ(
        &self,
        code: &str,
    ) -> Result<Option<query::OccupationSnapshot>, LoaderError> {
        let crosswalk = self.national_crosswalk()?;
        Ok(query::snapshot_for_occ(&crosswalk, code))
    }

    pub fn wage_distribution_for_occ(
        &self,
        code: &str,
    ) -> Result<Vec<query::WagePoint>, LoaderError> {
        let crosswalk = self.national_crosswalk()?;
        Ok(query::wage_distribution_for_occ(&crosswalk, code))
    }

    pub fn top_geographies_for_occ(
        &self,
        code: &str,
        level: GeoLevel,
        n: usize,
    ) -> Result<Vec<query::GeographyWage>, LoaderError> {
        let table = self.load(level.dataset())?;
        Ok(query::top_geographies_for_occ(&table, code, level, n))
    }

    /// Needs the national crosswalk only when the area table lacks quotients.
    pub fn employment_concentration_for_occ(
        &self,
        code: &str,
        level: GeoLevel,
        n: usize,
    ) -> Result<Vec<query::GeographyConcentration>, LoaderError> {
        let table = self.load(level.dataset())?;
        let rows = query::filter_level(&table, code, level);
        let crosswalk = if rows.iter().any(|r| r.loc_quotient.is_some()) {
            Arc::new(Crosswalk::default())
        } else {
            self.national_crosswalk()?
        };
        Ok(query::employment_concentration_for_occ(
            &table, &crosswalk, code, level, n,
        ))
    }

    pub fn industry_mix_for_occ(
        &self,
        code: &str,
        n: usize,
    ) -> Result<Vec<query::IndustryShare>, LoaderError> {
        let table = self.load(DatasetKind::NatSector)?;
        Ok(query::industry_mix_for_occ(&table, code, n))
    }

    /// Snapshot of every listed occupation, in list order.
    pub fn all_snapshots(&self) -> Result<Vec<query::OccupationSnapshot>, LoaderError> {
        let crosswalk = self.national_crosswalk()?;
        let us_median = query::us_median_wage(&crosswalk);
        let rows = query::listed_rows(&crosswalk);

        let snapshots = rows
            .par_iter()
            .map(|row| query::snapshot_from_row(row, us_median))
            .collect();
        Ok(snapshots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_store_is_shared() {
        let a = OewsStore::global();
        let b = OewsStore::global();
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn test_unknown_name_is_rejected_before_loading() {
        let store = OewsStore::from_settings(Settings::default());
        let err = store.load_named("county").unwrap_err();
        assert!(matches!(err, LoaderError::UnknownDataset(_)));
        assert!(DatasetKind::ALL.iter().all(|k| !store.is_loaded(*k)));
    }

    #[test]
    fn test_snapshots_follow_each_listed_title() {
        let dir = tempfile::tempdir().unwrap();
        let national = dir.path().join("national.csv");
        std::fs::write(
            &national,
            "OCC_CODE,OCC_TITLE,O_GROUP,A_MEDIAN\n\
             00-0000,All Occupations,total,50000\n\
             15-1252,Software Developers,detailed,130000\n\
             15-1252,Software Engineers,detailed,140000\n",
        )
        .unwrap();
        let settings = Settings {
            data_dir: dir.path().to_path_buf(),
            sample_dir: dir.path().to_path_buf(),
            ..Settings::default()
        }
        .with_local_file(DatasetKind::National, national);
        let store = OewsStore::from_settings(settings);

        let snapshots = store.all_snapshots().unwrap();
        let pairs: Vec<(&str, f64)> = snapshots
            .iter()
            .map(|s| (s.occ_title.as_str(), s.median_wage))
            .collect();
        assert_eq!(
            pairs,
            vec![("Software Developers", 130_000.0), ("Software Engineers", 140_000.0)]
        );
        assert_eq!(snapshots.len(), store.occupation_list_az().unwrap().len());
    }
}
