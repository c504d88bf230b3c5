//! Occupation Queries Module
//! Rankings, the A-Z list, snapshots and wage distributions over the crosswalk.

use serde::Serialize;
use std::collections::HashSet;

use super::crosswalk::Crosswalk;
use crate::data::{ObservationRow, Percentile};
use crate::stats::StatsCalculator;

/// One entry of an employment ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccupationSummary {
    #[serde(rename = "OCC_CODE")]
    pub occ_code: String,
    #[serde(rename = "OCC_TITLE")]
    pub occ_title: Option<String>,
    #[serde(rename = "TOT_EMP")]
    pub employment: Option<f64>,
    #[serde(rename = "A_MEDIAN")]
    pub median_wage: Option<f64>,
    #[serde(rename = "A_MEAN")]
    pub mean_wage: Option<f64>,
}

/// One entry of the alphabetical occupation picker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct OccupationListing {
    #[serde(rename = "OCC_CODE")]
    pub occ_code: String,
    #[serde(rename = "OCC_TITLE")]
    pub occ_title: Option<String>,
}

/// One entry of a wage ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WageRanking {
    #[serde(rename = "OCC_CODE")]
    pub occ_code: String,
    #[serde(rename = "OCC_TITLE")]
    pub occ_title: Option<String>,
    #[serde(rename = "ANNUAL_WAGE")]
    pub annual_wage: f64,
}

/// Headline figures for one occupation. Absent values are NaN.
#[derive(Debug, Clone, Serialize)]
pub struct OccupationSnapshot {
    #[serde(rename = "OCC_CODE")]
    pub occ_code: String,
    #[serde(rename = "OCC_TITLE")]
    pub occ_title: String,
    #[serde(rename = "A_MEDIAN")]
    pub median_wage: f64,
    #[serde(rename = "P10_P90")]
    pub wage_range: (f64, f64),
    #[serde(rename = "A_MEAN")]
    pub mean_wage: f64,
    #[serde(rename = "TOT_EMP")]
    pub employment: f64,
    #[serde(rename = "RELATIVE_WAGE")]
    pub relative_wage: f64,
}

/// One point of the percentile wage distribution.
#[derive(Debug, Clone, Serialize)]
pub struct WagePoint {
    #[serde(rename = "PERCENTILE")]
    pub percentile: &'static str,
    #[serde(rename = "ANNUAL_WAGE")]
    pub annual_wage: f64,
}

fn code_of(row: &ObservationRow) -> String {
    row.soc_canonical.clone().unwrap_or_default()
}

/// Occupations with the most national employment.
pub fn top_occupations_by_employment(crosswalk: &Crosswalk, k: usize) -> Vec<OccupationSummary> {
    let mut rows: Vec<&ObservationRow> = crosswalk.occupations().collect();
    rows.sort_by(|a, b| StatsCalculator::cmp_desc(a.tot_emp, b.tot_emp));

    rows.into_iter()
        .take(k)
        .map(|r| OccupationSummary {
            occ_code: code_of(r),
            occ_title: r.occ_title.clone(),
            employment: r.tot_emp,
            median_wage: r.a_median_annual,
            mean_wage: r.annual_mean(),
        })
        .collect()
}

/// Distinct (code, title) pairs sorted by title.
pub fn occupation_list_az(crosswalk: &Crosswalk) -> Vec<OccupationListing> {
    listed_rows(crosswalk)
        .into_iter()
        .map(|r| OccupationListing {
            occ_code: code_of(r),
            occ_title: r.occ_title.clone(),
        })
        .collect()
}

/// The first row of each distinct (code, title) pair, in listing order.
pub fn listed_rows(crosswalk: &Crosswalk) -> Vec<&ObservationRow> {
    let mut seen = HashSet::new();
    let mut rows: Vec<&ObservationRow> = crosswalk
        .occupations()
        .filter(|r| seen.insert((r.soc_canonical.as_deref(), r.occ_title.as_deref())))
        .collect();

    // Untitled rows sort last
    rows.sort_by(|a, b| match (&a.occ_title, &b.occ_title) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.soc_canonical.cmp(&b.soc_canonical),
    });
    rows
}

/// National annual median wage for all occupations.
///
/// Falls back to the median of the individual occupation medians, then NaN.
pub fn us_median_wage(crosswalk: &Crosswalk) -> f64 {
    if let Some(median) = crosswalk.all_occupations().and_then(|r| r.a_median_annual) {
        return median;
    }
    StatsCalculator::median(crosswalk.occupations().map(|r| r.a_median_annual))
}

/// Highest-paying occupations by annual median wage.
pub fn top_occupations_by_median_wage(crosswalk: &Crosswalk, k: usize) -> Vec<WageRanking> {
    rank_by_wage(crosswalk, k, |r| r.a_median_annual)
}

/// Highest-paying occupations by annual 90th-percentile wage.
pub fn top_occupations_by_p90_wage(crosswalk: &Crosswalk, k: usize) -> Vec<WageRanking> {
    rank_by_wage(crosswalk, k, |r| r.annual_wage(Percentile::P90))
}

fn rank_by_wage<F>(crosswalk: &Crosswalk, k: usize, wage: F) -> Vec<WageRanking>
where
    F: Fn(&ObservationRow) -> Option<f64>,
{
    let mut ranked: Vec<WageRanking> = crosswalk
        .occupations()
        .filter_map(|r| {
            wage(r).map(|annual_wage| WageRanking {
                occ_code: code_of(r),
                occ_title: r.occ_title.clone(),
                annual_wage,
            })
        })
        .collect();
    ranked.sort_by(|a, b| StatsCalculator::cmp_desc(Some(a.annual_wage), Some(b.annual_wage)));
    ranked.truncate(k);
    ranked
}

/// Snapshot of one occupation; `None` when the code is not in the crosswalk.
pub fn snapshot_for_occ(crosswalk: &Crosswalk, code: &str) -> Option<OccupationSnapshot> {
    let row = crosswalk.find(code)?;
    Some(snapshot_from_row(row, us_median_wage(crosswalk)))
}

/// Snapshot of a crosswalk row against a known national median.
pub fn snapshot_from_row(row: &ObservationRow, us_median: f64) -> OccupationSnapshot {
    let baseline = Some(us_median).filter(|m| !m.is_nan());
    OccupationSnapshot {
        occ_code: code_of(row),
        occ_title: row.occ_title.clone().unwrap_or_default(),
        median_wage: StatsCalculator::or_nan(row.a_median_annual),
        wage_range: (
            StatsCalculator::or_nan(row.annual_wage(Percentile::P10)),
            StatsCalculator::or_nan(row.annual_wage(Percentile::P90)),
        ),
        mean_wage: StatsCalculator::or_nan(row.annual_mean()),
        employment: StatsCalculator::or_nan(row.tot_emp),
        relative_wage: StatsCalculator::relative_ratio(row.a_median_annual, baseline),
    }
}

/// P10, P25, P50, P75, P90 annual wages; empty when the code is unknown.
pub fn wage_distribution_for_occ(crosswalk: &Crosswalk, code: &str) -> Vec<WagePoint> {
    let Some(row) = crosswalk.find(code) else {
        return Vec::new();
    };

    Percentile::ALL
        .into_iter()
        .map(|p| WagePoint {
            percentile: p.label(),
            annual_wage: StatsCalculator::or_nan(row.annual_wage(p)),
        })
        .collect()
}
