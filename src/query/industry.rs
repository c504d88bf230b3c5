//! Industry Mix Module
//! Sector shares of an occupation's national employment.

use serde::Serialize;

use crate::data::{ObservationRow, OewsTable};
use crate::soc;
use crate::stats::StatsCalculator;

const SECTOR_PREFIX: &str = "Sector: ";

/// Share of an occupation's employment in one industry sector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndustryShare {
    #[serde(rename = "INDUSTRY")]
    pub industry: String,
    #[serde(rename = "SHARE_PCT")]
    pub share_pct: Option<f64>,
}

/// Industries employing an occupation, largest share first.
///
/// Uses the published `PCT_TOTAL` when any row carries it, otherwise each
/// row's share of the occupation's summed employment.
pub fn industry_mix_for_occ(table: &OewsTable, code: &str, n: usize) -> Vec<IndustryShare> {
    let code = soc::canonical(code);
    let rows: Vec<&ObservationRow> = table.rows_for_code(&code).collect();
    if rows.is_empty() {
        return Vec::new();
    }

    let shares: Vec<Option<f64>> = if rows.iter().any(|r| r.pct_total.is_some()) {
        rows.iter().map(|r| r.pct_total).collect()
    } else {
        let employment: Vec<Option<f64>> = rows.iter().map(|r| r.tot_emp).collect();
        StatsCalculator::share_percentages(&employment)
    };

    let mut mix: Vec<IndustryShare> = rows
        .iter()
        .zip(shares)
        .map(|(row, share_pct)| IndustryShare {
            industry: industry_label(row),
            share_pct,
        })
        .collect();

    mix.sort_by(|a, b| StatsCalculator::cmp_desc(a.share_pct, b.share_pct));
    mix.truncate(n);
    mix
}

fn industry_label(row: &ObservationRow) -> String {
    match (&row.naics_title, &row.naics) {
        (Some(title), _) => title.replace(SECTOR_PREFIX, ""),
        (None, Some(naics)) => naics.clone(),
        (None, None) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DatasetKind;
    use polars::prelude::*;

    fn natsector(pct_total: [&str; 4]) -> OewsTable {
        let df = df!(
            "OCC_CODE" => &["15-1252", "15-1252", "15-1252", "29-1141"],
            "NAICS" => &["51", "54", "52", "62"],
            "NAICS_TITLE" => &["Sector: Information", "Sector: Professional Services", "", "Sector: Health Care"],
            "TOT_EMP" => &["200000", "500000", "300000", "2000000"],
            "PCT_TOTAL" => &pct_total
        )
        .unwrap();
        OewsTable::from_frame(DatasetKind::NatSector, &df).unwrap()
    }

    #[test]
    fn test_published_share_is_used() {
        let mix = industry_mix_for_occ(&natsector(["12.5", "40.0", "", "90.0"]), "15-1252", 10);
        assert_eq!(mix[0].industry, "Professional Services");
        assert_eq!(mix[0].share_pct, Some(40.0));
        assert_eq!(mix[1].industry, "Information");
        assert_eq!(mix[2].industry, "52", "falls back to the NAICS code");
        assert_eq!(mix[2].share_pct, None);
    }

    #[test]
    fn test_share_derived_from_employment() {
        let mix = industry_mix_for_occ(&natsector(["", "", "", ""]), "151252", 10);
        let total: f64 = mix.iter().filter_map(|s| s.share_pct).sum();
        assert!((total - 100.0).abs() < 1e-9);
        assert_eq!(mix[0].industry, "Professional Services");
        assert_eq!(mix[0].share_pct, Some(50.0));
        assert_eq!(mix[1].share_pct, Some(30.0));
    }

    #[test]
    fn test_limit_and_unknown_code() {
        let table = natsector(["", "", "", ""]);
        assert_eq!(industry_mix_for_occ(&table, "15-1252", 2).len(), 2);
        assert!(industry_mix_for_occ(&table, "99-9999", 10).is_empty());
    }

    #[test]
    fn test_shares_serialize_with_column_names() {
        let mix = industry_mix_for_occ(&natsector(["12.5", "40.0", "", "90.0"]), "15-1252", 10);
        let json = serde_json::to_value(&mix).unwrap();
        assert_eq!(json[0]["INDUSTRY"], "Professional Services");
        assert_eq!(json[0]["SHARE_PCT"], 40.0);
        assert!(json[2]["SHARE_PCT"].is_null());
        assert!(json[0].get("industry").is_none());
    }
}
