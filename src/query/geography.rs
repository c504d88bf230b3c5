//! Geography Queries Module
//! Per-occupation comparisons across states or metro areas.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::crosswalk::Crosswalk;
use crate::data::{DatasetKind, ObservationRow, OewsTable};
use crate::soc;
use crate::stats::StatsCalculator;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown geography level: {0} (expected state or msa)")]
pub struct UnknownLevelError(pub String);

/// Geographic granularity of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoLevel {
    State,
    Msa,
}

impl GeoLevel {
    /// Table holding this level.
    pub fn dataset(self) -> DatasetKind {
        match self {
            GeoLevel::State => DatasetKind::State,
            GeoLevel::Msa => DatasetKind::Msa,
        }
    }

    /// Numeric `AREA_TYPE` published for this level.
    pub fn area_type_code(self) -> i64 {
        match self {
            GeoLevel::State => 2,
            GeoLevel::Msa => 4,
        }
    }

    /// Whether a textual area type names this level.
    pub fn matches_text(self, area_type: &str) -> bool {
        let text = area_type.to_lowercase();
        match self {
            GeoLevel::State => text.contains("state"),
            GeoLevel::Msa => ["metro", "metropolitan", "micro", "nonmetro"]
                .iter()
                .any(|needle| text.contains(needle)),
        }
    }
}

impl fmt::Display for GeoLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeoLevel::State => f.write_str("state"),
            GeoLevel::Msa => f.write_str("msa"),
        }
    }
}

impl FromStr for GeoLevel {
    type Err = UnknownLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "state" => Ok(GeoLevel::State),
            "msa" | "metro" => Ok(GeoLevel::Msa),
            _ => Err(UnknownLevelError(s.to_string())),
        }
    }
}

/// One area in a wage comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeographyWage {
    #[serde(rename = "AREA_TITLE")]
    pub area_title: Option<String>,
    #[serde(rename = "A_MEDIAN")]
    pub median_wage: f64,
    #[serde(rename = "TOT_EMP")]
    pub employment: Option<f64>,
    #[serde(rename = "LOC_QUOTIENT")]
    pub location_quotient: Option<f64>,
}

/// One area in an employment concentration ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeographyConcentration {
    #[serde(rename = "AREA_TITLE")]
    pub area_title: Option<String>,
    #[serde(rename = "LOC_QUOTIENT")]
    pub location_quotient: f64,
    #[serde(rename = "TOT_EMP")]
    pub employment: Option<f64>,
    #[serde(rename = "A_MEDIAN")]
    pub median_wage: Option<f64>,
}

/// Rows of `table` for one occupation at one geography level.
///
/// Uses the numeric area type when any candidate row carries one, else the
/// textual area type when the table has that column, else no level filter.
pub fn filter_level<'a>(
    table: &'a OewsTable,
    code: &str,
    level: GeoLevel,
) -> Vec<&'a ObservationRow> {
    let code = soc::canonical(code);
    let candidates: Vec<&ObservationRow> = table.rows_for_code(&code).collect();

    if candidates.iter().any(|r| r.area_type_numeric.is_some()) {
        let target = level.area_type_code();
        candidates
            .into_iter()
            .filter(|r| r.area_type_numeric == Some(target))
            .collect()
    } else if table.has_column("AREA_TYPE") {
        candidates
            .into_iter()
            .filter(|r| r.area_type.as_deref().is_some_and(|t| level.matches_text(t)))
            .collect()
    } else {
        candidates
    }
}

/// Areas with the highest annual median wage for an occupation.
pub fn top_geographies_for_occ(
    table: &OewsTable,
    code: &str,
    level: GeoLevel,
    n: usize,
) -> Vec<GeographyWage> {
    let mut areas: Vec<GeographyWage> = filter_level(table, code, level)
        .into_iter()
        .filter_map(|r| {
            r.a_median_annual.map(|median_wage| GeographyWage {
                area_title: r.area_title.clone(),
                median_wage,
                employment: r.tot_emp,
                location_quotient: r.loc_quotient,
            })
        })
        .collect();

    areas.sort_by(|a, b| StatsCalculator::cmp_desc(Some(a.median_wage), Some(b.median_wage)));
    areas.truncate(n);
    areas
}

/// Areas where an occupation is most concentrated, by location quotient.
///
/// When no area row carries a location quotient it is approximated as the
/// area's jobs per thousand over the national jobs per thousand.
pub fn employment_concentration_for_occ(
    table: &OewsTable,
    crosswalk: &Crosswalk,
    code: &str,
    level: GeoLevel,
    n: usize,
) -> Vec<GeographyConcentration> {
    let rows = filter_level(table, code, level);
    if rows.is_empty() {
        return Vec::new();
    }

    let quotient: Box<dyn Fn(&ObservationRow) -> Option<f64>> =
        if rows.iter().any(|r| r.loc_quotient.is_some()) {
            Box::new(|r: &ObservationRow| r.loc_quotient)
        } else {
            match crosswalk
                .find(code)
                .and_then(|r| r.jobs_1000)
                .filter(|v| *v > 0.0)
            {
                Some(national) => {
                    Box::new(move |r: &ObservationRow| r.jobs_1000.map(|j| j / national))
                }
                None => return Vec::new(),
            }
        };

    let mut areas: Vec<GeographyConcentration> = rows
        .into_iter()
        .filter_map(|r| {
            quotient(r).map(|location_quotient| GeographyConcentration {
                area_title: r.area_title.clone(),
                location_quotient,
                employment: r.tot_emp,
                median_wage: r.a_median_annual,
            })
        })
        .collect();

    areas.sort_by(|a, b| {
        StatsCalculator::cmp_desc(Some(a.location_quotient), Some(b.location_quotient))
    });
    areas.truncate(n);
    areas
}
