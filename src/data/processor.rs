//! Data Processor Module
//! Normalizes raw OEWS frames into typed observation rows, and back.

use log::debug;
use polars::prelude::*;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

use super::table::ObservationRow;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Text columns, trimmed on load.
pub const TEXT_COLUMNS: [&str; 8] = [
    "OCC_CODE",
    "OCC_TITLE",
    "O_GROUP",
    "AREA",
    "AREA_TITLE",
    "AREA_TYPE",
    "NAICS",
    "NAICS_TITLE",
];

/// Wage and employment columns coerced to numbers on load.
pub const NUMERIC_COLUMNS: [&str; 19] = [
    "TOT_EMP",
    "EMP_PRSE",
    "JOBS_1000",
    "LOC_QUOTIENT",
    "PCT_TOTAL",
    "PCT_RPT",
    "H_MEAN",
    "A_MEAN",
    "MEAN_PRSE",
    "H_PCT10",
    "H_PCT25",
    "H_MEDIAN",
    "H_PCT75",
    "H_PCT90",
    "A_PCT10",
    "A_PCT25",
    "A_MEDIAN",
    "A_PCT75",
    "A_PCT90",
];

/// Alternate location-quotient header used by some editions.
pub const LOC_QUOTIENT_ALIAS: &str = "LOC_Q";

pub const SOC_CANON: &str = "SOC_CANON";
pub const AREA_TYPE_NUM: &str = "AREA_TYPE_NUM";
pub const A_MEDIAN_ANNUAL: &str = "A_MEDIAN_ANNUAL";

const DERIVED_COLUMNS: [&str; 3] = [SOC_CANON, AREA_TYPE_NUM, A_MEDIAN_ANNUAL];

/// Result of normalizing one raw frame.
#[derive(Debug)]
pub struct Normalized {
    pub columns: Vec<String>,
    pub rows: Vec<ObservationRow>,
}

/// Handles the normalization pass shared by every source tier.
pub struct DataProcessor;

impl DataProcessor {
    /// Normalize a raw frame.
    ///
    /// Headers are matched case-insensitively, text is trimmed, numeric columns
    /// are coerced with unparseable cells treated as absent, `LOC_Q` is aliased
    /// onto `LOC_QUOTIENT`, and the derived fields are filled. Blank rows are
    /// dropped.
    pub fn normalize(df: &DataFrame) -> Result<Normalized, ProcessorError> {
        let headers = Self::header_index(df);
        let height = df.height();
        let mut rows = vec![ObservationRow::default(); height];

        for name in TEXT_COLUMNS {
            let Some(values) = Self::text_values(df, &headers, name)? else {
                continue;
            };
            for (row, value) in rows.iter_mut().zip(values) {
                set_text(row, name, value);
            }
        }

        for name in NUMERIC_COLUMNS {
            let Some(values) = Self::numeric_values(df, &headers, name)? else {
                continue;
            };
            for (row, value) in rows.iter_mut().zip(values) {
                set_numeric(row, name, value);
            }
        }

        let aliased = !headers.contains_key("LOC_QUOTIENT")
            && headers.contains_key(LOC_QUOTIENT_ALIAS);
        if aliased {
            debug!("Aliasing {LOC_QUOTIENT_ALIAS} onto LOC_QUOTIENT");
            if let Some(values) = Self::numeric_values(df, &headers, LOC_QUOTIENT_ALIAS)? {
                for (row, value) in rows.iter_mut().zip(values) {
                    row.loc_quotient = value;
                }
            }
        }

        for row in rows.iter_mut() {
            row.area_type_numeric = row.area_type.as_deref().and_then(parse_area_type);
            row.derive();
        }

        let blank = ObservationRow::default();
        rows.retain(|row| *row != blank);

        let columns = Self::present_columns(df, &headers, aliased);
        debug!(
            "Normalized {} of {} rows across {} columns",
            rows.len(),
            height,
            columns.len()
        );

        Ok(Normalized { columns, rows })
    }

    /// Re-emit normalized rows as a frame with canonical column names.
    pub fn to_dataframe(rows: &[ObservationRow]) -> Result<DataFrame, ProcessorError> {
        let mut columns: Vec<Column> = Vec::with_capacity(
            TEXT_COLUMNS.len() + NUMERIC_COLUMNS.len() + DERIVED_COLUMNS.len(),
        );

        for name in TEXT_COLUMNS {
            let values: Vec<Option<&str>> = rows.iter().map(|r| get_text(r, name)).collect();
            columns.push(Column::new(name.into(), values));
        }
        for name in NUMERIC_COLUMNS {
            let values: Vec<Option<f64>> = rows.iter().map(|r| get_numeric(r, name)).collect();
            columns.push(Column::new(name.into(), values));
        }

        let soc: Vec<Option<&str>> = rows.iter().map(|r| r.soc_canonical.as_deref()).collect();
        let area_type: Vec<Option<i64>> = rows.iter().map(|r| r.area_type_numeric).collect();
        let median: Vec<Option<f64>> = rows.iter().map(|r| r.a_median_annual).collect();
        columns.push(Column::new(SOC_CANON.into(), soc));
        columns.push(Column::new(AREA_TYPE_NUM.into(), area_type));
        columns.push(Column::new(A_MEDIAN_ANNUAL.into(), median));

        Ok(DataFrame::new(columns)?)
    }

    /// Map canonical header names to the frame's actual names. First wins.
    fn header_index(df: &DataFrame) -> HashMap<String, String> {
        let mut index = HashMap::new();
        for name in df.get_column_names() {
            let actual = name.to_string();
            index.entry(canonical_header(&actual)).or_insert(actual);
        }
        index
    }

    fn present_columns(
        df: &DataFrame,
        headers: &HashMap<String, String>,
        aliased: bool,
    ) -> Vec<String> {
        let mut columns: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| canonical_header(s.as_str()))
            .filter(|c| !DERIVED_COLUMNS.contains(&c.as_str()))
            .collect();
        let mut seen = HashSet::new();
        columns.retain(|c| seen.insert(c.clone()));

        if aliased {
            columns.push("LOC_QUOTIENT".to_string());
        }
        if headers.contains_key("AREA_TYPE") {
            columns.push(AREA_TYPE_NUM.to_string());
        }
        if headers.contains_key("OCC_CODE") {
            columns.push(SOC_CANON.to_string());
        }
        if headers.contains_key("A_MEDIAN") || headers.contains_key("H_MEDIAN") {
            columns.push(A_MEDIAN_ANNUAL.to_string());
        }
        columns
    }

    /// Trimmed text of a column, `None` if the frame lacks it.
    fn text_values(
        df: &DataFrame,
        headers: &HashMap<String, String>,
        name: &str,
    ) -> Result<Option<Vec<Option<String>>>, ProcessorError> {
        let Some(actual) = headers.get(name) else {
            return Ok(None);
        };

        let column = df.column(actual)?.cast(&DataType::String)?;
        let values = column
            .str()?
            .into_iter()
            .map(|v| {
                v.map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            })
            .collect();

        Ok(Some(values))
    }

    /// Numeric coercion of a column, `None` if the frame lacks it.
    fn numeric_values(
        df: &DataFrame,
        headers: &HashMap<String, String>,
        name: &str,
    ) -> Result<Option<Vec<Option<f64>>>, ProcessorError> {
        let values = Self::text_values(df, headers, name)?.map(|texts| {
            texts
                .into_iter()
                .map(|v| v.as_deref().and_then(parse_number))
                .collect()
        });
        Ok(values)
    }
}

/// Upper-cased, trimmed header without a byte-order mark.
pub fn canonical_header(name: &str) -> String {
    name.trim_start_matches('\u{feff}').trim().to_uppercase()
}

/// Parse a published number; suppression markers and junk become `None`.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '$')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_area_type(raw: &str) -> Option<i64> {
    parse_number(raw)
        .filter(|v| v.fract() == 0.0)
        .map(|v| v as i64)
}

fn set_text(row: &mut ObservationRow, column: &str, value: Option<String>) {
    match column {
        "OCC_CODE" => row.occ_code = value,
        "OCC_TITLE" => row.occ_title = value,
        "O_GROUP" => row.o_group = value,
        "AREA" => row.area = value,
        "AREA_TITLE" => row.area_title = value,
        "AREA_TYPE" => row.area_type = value,
        "NAICS" => row.naics = value,
        "NAICS_TITLE" => row.naics_title = value,
        _ => {}
    }
}

fn get_text<'a>(row: &'a ObservationRow, column: &str) -> Option<&'a str> {
    match column {
        "OCC_CODE" => row.occ_code.as_deref(),
        "OCC_TITLE" => row.occ_title.as_deref(),
        "O_GROUP" => row.o_group.as_deref(),
        "AREA" => row.area.as_deref(),
        "AREA_TITLE" => row.area_title.as_deref(),
        "AREA_TYPE" => row.area_type.as_deref(),
        "NAICS" => row.naics.as_deref(),
        "NAICS_TITLE" => row.naics_title.as_deref(),
        _ => None,
    }
}

fn set_numeric(row: &mut ObservationRow, column: &str, value: Option<f64>) {
    match column {
        "TOT_EMP" => row.tot_emp = value,
        "EMP_PRSE" => row.emp_prse = value,
        "JOBS_1000" => row.jobs_1000 = value,
        "LOC_QUOTIENT" => row.loc_quotient = value,
        "PCT_TOTAL" => row.pct_total = value,
        "PCT_RPT" => row.pct_rpt = value,
        "H_MEAN" => row.h_mean = value,
        "A_MEAN" => row.a_mean = value,
        "MEAN_PRSE" => row.mean_prse = value,
        "H_PCT10" => row.h_pct10 = value,
        "H_PCT25" => row.h_pct25 = value,
        "H_MEDIAN" => row.h_median = value,
        "H_PCT75" => row.h_pct75 = value,
        "H_PCT90" => row.h_pct90 = value,
        "A_PCT10" => row.a_pct10 = value,
        "A_PCT25" => row.a_pct25 = value,
        "A_MEDIAN" => row.a_median = value,
        "A_PCT75" => row.a_pct75 = value,
        "A_PCT90" => row.a_pct90 = value,
        _ => {}
    }
}

fn get_numeric(row: &ObservationRow, column: &str) -> Option<f64> {
    match column {
        "TOT_EMP" => row.tot_emp,
        "EMP_PRSE" => row.emp_prse,
        "JOBS_1000" => row.jobs_1000,
        "LOC_QUOTIENT" => row.loc_quotient,
        "PCT_TOTAL" => row.pct_total,
        "PCT_RPT" => row.pct_rpt,
        "H_MEAN" => row.h_mean,
        "A_MEAN" => row.a_mean,
        "MEAN_PRSE" => row.mean_prse,
        "H_PCT10" => row.h_pct10,
        "H_PCT25" => row.h_pct25,
        "H_MEDIAN" => row.h_median,
        "H_PCT75" => row.h_pct75,
        "H_PCT90" => row.h_pct90,
        "A_PCT10" => row.a_pct10,
        "A_PCT25" => row.a_pct25,
        "A_MEDIAN" => row.a_median,
        "A_PCT75" => row.a_pct75,
        "A_PCT90" => row.a_pct90,
        _ => None,
    }
}
