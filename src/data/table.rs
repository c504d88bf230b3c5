//! Table Model Module
//! Dataset kinds, the typed observation row, and the materialized table.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

use super::processor::{DataProcessor, ProcessorError};
use crate::soc;
use crate::stats::StatsCalculator;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown table kind: {0}")]
pub struct UnknownDatasetError(pub String);

/// One of the OEWS table families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    National,
    State,
    Msa,
    NatSector,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 4] = [
        DatasetKind::National,
        DatasetKind::State,
        DatasetKind::Msa,
        DatasetKind::NatSector,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DatasetKind::National => "national",
            DatasetKind::State => "state",
            DatasetKind::Msa => "msa",
            DatasetKind::NatSector => "natsector",
        }
    }

    /// File name of the 2024 edition spreadsheet inside the data directory.
    pub fn edition_file(self) -> &'static str {
        match self {
            DatasetKind::National => "national_M2024_dl.xlsx",
            DatasetKind::State => "state_M2024_dl.xlsx",
            DatasetKind::Msa => "MSA_M2024_dl.xlsx",
            DatasetKind::NatSector => "natsector_M2024_dl.xlsx",
        }
    }

    /// Environment variable holding the remote URL override.
    pub fn url_env_var(self) -> &'static str {
        match self {
            DatasetKind::National => "OEWS_URL_NATIONAL",
            DatasetKind::State => "OEWS_URL_STATE",
            DatasetKind::Msa => "OEWS_URL_MSA",
            DatasetKind::NatSector => "OEWS_URL_NATSECT",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DatasetKind {
    type Err = UnknownDatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DatasetKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownDatasetError(s.to_string()))
    }
}

/// Where a materialized table came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "tier", content = "location", rename_all = "lowercase")]
pub enum TableSource {
    Local(PathBuf),
    Remote(String),
    Sample(PathBuf),
    /// Built in memory, e.g. by tests or re-normalization.
    Memory,
}

/// Percentile points of the published wage distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Percentile {
    P10,
    P25,
    P50,
    P75,
    P90,
}

impl Percentile {
    pub const ALL: [Percentile; 5] = [
        Percentile::P10,
        Percentile::P25,
        Percentile::P50,
        Percentile::P75,
        Percentile::P90,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Percentile::P10 => "P10",
            Percentile::P25 => "P25",
            Percentile::P50 => "P50",
            Percentile::P75 => "P75",
            Percentile::P90 => "P90",
        }
    }
}

/// A single normalized row of an OEWS table.
///
/// Every field is optional because column presence varies across dataset
/// kinds and editions. Derived fields are filled once by the normalization pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationRow {
    pub occ_code: Option<String>,
    pub soc_canonical: Option<String>,
    pub occ_title: Option<String>,
    pub o_group: Option<String>,

    pub area: Option<String>,
    pub area_title: Option<String>,
    pub area_type: Option<String>,
    pub area_type_numeric: Option<i64>,

    pub naics: Option<String>,
    pub naics_title: Option<String>,

    pub tot_emp: Option<f64>,
    pub emp_prse: Option<f64>,
    pub jobs_1000: Option<f64>,
    pub loc_quotient: Option<f64>,
    pub pct_total: Option<f64>,
    pub pct_rpt: Option<f64>,

    pub h_mean: Option<f64>,
    pub a_mean: Option<f64>,
    pub mean_prse: Option<f64>,
    pub h_pct10: Option<f64>,
    pub h_pct25: Option<f64>,
    pub h_median: Option<f64>,
    pub h_pct75: Option<f64>,
    pub h_pct90: Option<f64>,
    pub a_pct10: Option<f64>,
    pub a_pct25: Option<f64>,
    pub a_median: Option<f64>,
    pub a_pct75: Option<f64>,
    pub a_pct90: Option<f64>,

    pub a_median_annual: Option<f64>,
}

impl ObservationRow {
    /// Fill the derived fields from the raw ones.
    pub fn derive(&mut self) {
        self.soc_canonical = soc::canonicalize(self.occ_code.as_deref());
        self.a_median_annual = StatsCalculator::annual_or_hourly(self.a_median, self.h_median);
    }

    /// Annual wage at a percentile, falling back to the hourly figure.
    pub fn annual_wage(&self, p: Percentile) -> Option<f64> {
        match p {
            Percentile::P10 => StatsCalculator::annual_or_hourly(self.a_pct10, self.h_pct10),
            Percentile::P25 => StatsCalculator::annual_or_hourly(self.a_pct25, self.h_pct25),
            Percentile::P50 => self.a_median_annual,
            Percentile::P75 => StatsCalculator::annual_or_hourly(self.a_pct75, self.h_pct75),
            Percentile::P90 => StatsCalculator::annual_or_hourly(self.a_pct90, self.h_pct90),
        }
    }

    /// Annual mean wage, falling back to the hourly mean.
    pub fn annual_mean(&self) -> Option<f64> {
        StatsCalculator::annual_or_hourly(self.a_mean, self.h_mean)
    }

    pub fn is_all_occupations(&self) -> bool {
        self.soc_canonical
            .as_deref()
            .is_some_and(soc::is_all_occupations)
    }

    pub fn has_code(&self, canonical_code: &str) -> bool {
        self.soc_canonical.as_deref() == Some(canonical_code)
    }
}

/// A fully normalized, immutable OEWS table.
#[derive(Debug, Clone, PartialEq)]
pub struct OewsTable {
    kind: DatasetKind,
    source: TableSource,
    columns: Vec<String>,
    rows: Vec<ObservationRow>,
}

impl OewsTable {
    pub fn new(
        kind: DatasetKind,
        source: TableSource,
        columns: Vec<String>,
        rows: Vec<ObservationRow>,
    ) -> Self {
        Self {
            kind,
            source,
            columns,
            rows,
        }
    }

    /// Normalize an in-memory frame into a table.
    pub fn from_frame(
        kind: DatasetKind,
        df: &polars::prelude::DataFrame,
    ) -> Result<Self, ProcessorError> {
        let normalized = DataProcessor::normalize(df)?;
        Ok(Self::new(
            kind,
            TableSource::Memory,
            normalized.columns,
            normalized.rows,
        ))
    }

    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    pub fn source(&self) -> &TableSource {
        &self.source
    }

    /// Canonical (upper-cased) names of the columns the source carried.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn rows(&self) -> &[ObservationRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The normalized rows as a frame with canonical column names.
    pub fn to_dataframe(&self) -> Result<polars::prelude::DataFrame, ProcessorError> {
        DataProcessor::to_dataframe(&self.rows)
    }

    /// Rows matching a canonical occupation code.
    pub fn rows_for_code<'a, 'c>(
        &'a self,
        canonical_code: &'c str,
    ) -> impl Iterator<Item = &'a ObservationRow> + 'c
    where
        'a: 'c,
    {
        self.rows.iter().filter(move |r| r.has_code(canonical_code))
    }
}
