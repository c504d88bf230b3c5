//! OEWS Table Loader Module
//! Resolves a dataset kind to a source file, reads it with Polars or calamine,
//! and normalizes it into an `OewsTable`.

use calamine::{open_workbook_auto, Data, Range, Reader};
use log::{info, warn};
use polars::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::fetch::{FetchError, HttpFetcher, RemoteFetcher};
use super::processor::{DataProcessor, ProcessorError};
use super::table::{DatasetKind, OewsTable, TableSource, UnknownDatasetError};
use crate::config::Settings;

/// Extensions read as spreadsheets; everything else is read as CSV.
const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Failure of a single resolution tier. Logged, never surfaced.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to load CSV: {0}")]
    Csv(#[from] PolarsError),
    #[error("Failed to read spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),
    #[error("Spreadsheet has no worksheet with a header row: {0}")]
    EmptyWorkbook(PathBuf),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Processor(#[from] ProcessorError),
}

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error(transparent)]
    UnknownDataset(#[from] UnknownDatasetError),
    #[error(
        "Missing OEWS source for '{kind}'. Commit Excel to `{local}`, or set {url_var}, \
         or enable DEMO_MODE=true and commit `{sample}`."
    )]
    MissingSource {
        kind: DatasetKind,
        local: String,
        url_var: &'static str,
        sample: String,
    },
}

/// Resolves and reads OEWS tables: local file, then remote URL, then the
/// bundled sample in demo mode.
pub struct TableLoader {
    settings: Settings,
    fetcher: Box<dyn RemoteFetcher>,
}

impl TableLoader {
    pub fn new(settings: Settings, fetcher: Box<dyn RemoteFetcher>) -> Self {
        Self { settings, fetcher }
    }

    /// Loader using the blocking HTTP fetcher for remote URLs.
    pub fn from_settings(settings: Settings) -> Self {
        let fetcher = HttpFetcher::new(settings.fetch_timeout);
        Self::new(settings, Box::new(fetcher))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Load a table by name.
    pub fn load_named(&self, name: &str) -> Result<OewsTable, LoaderError> {
        let kind: DatasetKind = name.parse()?;
        self.load(kind)
    }

    /// Resolve and load one table. The first tier that reads and normalizes wins.
    pub fn load(&self, kind: DatasetKind) -> Result<OewsTable, LoaderError> {
        let local = self.settings.local_path(kind);
        if local.exists() {
            let source = TableSource::Local(local.clone());
            match read_table_file(&local).and_then(|df| normalize(kind, &df, source)) {
                Ok(table) => return Ok(Self::loaded(table)),
                Err(e) => warn!("Local {kind} table {} unusable: {e}", local.display()),
            }
        }

        if let Some(url) = self.settings.remote_url(kind) {
            let source = TableSource::Remote(url.to_string());
            match self.read_remote(url).and_then(|df| normalize(kind, &df, source)) {
                Ok(table) => return Ok(Self::loaded(table)),
                Err(e) => warn!("Remote {kind} table {url} unusable: {e}"),
            }
        }

        let sample = self.settings.sample_path(kind);
        if self.settings.demo_mode && sample.exists() {
            let source = TableSource::Sample(sample.clone());
            let result = read_csv(&sample)
                .map_err(SourceError::from)
                .and_then(|df| normalize(kind, &df, source));
            match result {
                Ok(table) => return Ok(Self::loaded(table)),
                Err(e) => warn!("Sample {kind} table {} unusable: {e}", sample.display()),
            }
        }

        Err(LoaderError::MissingSource {
            kind,
            local: local.display().to_string(),
            url_var: kind.url_env_var(),
            sample: sample.display().to_string(),
        })
    }

    /// Fetch once, persist to a temporary file, and parse by URL extension.
    fn read_remote(&self, url: &str) -> Result<DataFrame, SourceError> {
        let bytes = self.fetcher.fetch(url)?;
        let suffix = if url.to_lowercase().ends_with(".xlsx") {
            ".xlsx"
        } else {
            ".csv"
        };

        let mut file = tempfile::Builder::new()
            .prefix("oews_")
            .suffix(suffix)
            .tempfile()?;
        file.write_all(&bytes)?;
        file.flush()?;

        read_table_file(file.path())
    }

    fn loaded(table: OewsTable) -> OewsTable {
        info!(
            "Loaded {} table from {:?}: {} rows, {} columns",
            table.kind(),
            table.source(),
            table.len(),
            table.columns().len()
        );
        table
    }
}

fn normalize(
    kind: DatasetKind,
    df: &DataFrame,
    source: TableSource,
) -> Result<OewsTable, SourceError> {
    let normalized = DataProcessor::normalize(df)?;
    Ok(OewsTable::new(kind, source, normalized.columns, normalized.rows))
}

/// Read a table file, choosing the reader by extension.
pub fn read_table_file(path: &Path) -> Result<DataFrame, SourceError> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase();

    if SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
        read_spreadsheet(path)
    } else {
        Ok(read_csv(path)?)
    }
}

/// Read a CSV file with every column as text; coercion happens in normalization.
pub fn read_csv(path: &Path) -> Result<DataFrame, PolarsError> {
    LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_ignore_errors(true)
        .finish()?
        .collect()
}

/// Read the first worksheet of a workbook.
pub fn read_spreadsheet(path: &Path) -> Result<DataFrame, SourceError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SourceError::EmptyWorkbook(path.to_path_buf()))??;

    range_to_dataframe(&range).ok_or_else(|| SourceError::EmptyWorkbook(path.to_path_buf()))?
}

/// Convert a worksheet range into a text frame, using the first row as header.
///
/// Returns `None` when the range has no header row.
pub fn range_to_dataframe(range: &Range<Data>) -> Option<Result<DataFrame, SourceError>> {
    let mut rows = range.rows();
    let header = rows.next()?;

    let names: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| cell_text(cell).unwrap_or_else(|| format!("column_{i}")))
        .collect();

    let mut values: Vec<Vec<Option<String>>> =
        vec![Vec::with_capacity(range.height()); names.len()];
    for row in rows {
        for (i, column) in values.iter_mut().enumerate() {
            column.push(row.get(i).and_then(cell_text));
        }
    }

    let columns: Vec<Column> = names
        .into_iter()
        .zip(values)
        .map(|(name, v)| Column::new(name.into(), v))
        .collect();

    Some(DataFrame::new(columns).map_err(SourceError::from))
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        other => Some(other.to_string()),
    }
}
