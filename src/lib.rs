//! HireSight - OEWS labor-market data loading and occupation queries
//!
//! Loads Occupational Employment and Wage Statistics tables from local
//! spreadsheets, remote URLs or bundled samples, normalizes them into typed
//! rows, and answers per-occupation wage, geography and industry queries.

pub mod config;
pub mod data;
pub mod logging;
pub mod query;
pub mod soc;
pub mod stats;
pub mod store;

pub use config::Settings;
pub use data::{DatasetKind, LoaderError, ObservationRow, OewsTable, TableLoader};
pub use query::{Crosswalk, GeoLevel};
pub use store::OewsStore;
