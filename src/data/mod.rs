//! Data module - OEWS table loading, normalization and caching

mod cache;
mod fetch;
mod loader;
mod processor;
mod table;

pub use cache::SingleFlightCache;
pub use fetch::{FetchError, HttpFetcher, RemoteFetcher};
pub use loader::{
    range_to_dataframe, read_csv, read_spreadsheet, read_table_file, LoaderError, SourceError,
    TableLoader,
};
pub use processor::{canonical_header, parse_number, DataProcessor, Normalized, ProcessorError};
pub use table::{
    DatasetKind, ObservationRow, OewsTable, Percentile, TableSource, UnknownDatasetError,
};
