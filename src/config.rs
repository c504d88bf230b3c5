//! Configuration Module
//! Environment-style settings for locating the OEWS tables.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::data::DatasetKind;

/// Timeout applied to every remote table fetch.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEMO_MODE_VAR: &str = "DEMO_MODE";
pub const DATA_DIR_VAR: &str = "OEWS_DATA_DIR";
pub const SAMPLE_DIR_VAR: &str = "OEWS_SAMPLE_DIR";

/// Where each dataset may be found, in resolution order.
#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    /// Directory holding the edition spreadsheets.
    pub data_dir: PathBuf,
    /// Directory holding the bundled `<kind>.csv` samples.
    pub sample_dir: PathBuf,
    /// Allow falling back to the bundled samples.
    pub demo_mode: bool,
    /// Remote URL overrides; empty values are never stored.
    pub remote_urls: BTreeMap<DatasetKind, String>,
    /// Per-kind local file overrides (otherwise the edition file in `data_dir`).
    pub local_files: BTreeMap<DatasetKind, PathBuf>,
    #[serde(skip)]
    pub fetch_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            sample_dir: PathBuf::from("sample_data"),
            demo_mode: false,
            remote_urls: BTreeMap::new(),
            local_files: BTreeMap::new(),
            fetch_timeout: FETCH_TIMEOUT,
        }
    }
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();

        if let Some(dir) = lookup(DATA_DIR_VAR).filter(|v| !v.trim().is_empty()) {
            settings.data_dir = PathBuf::from(dir.trim());
        }
        if let Some(dir) = lookup(SAMPLE_DIR_VAR).filter(|v| !v.trim().is_empty()) {
            settings.sample_dir = PathBuf::from(dir.trim());
        }
        settings.demo_mode = lookup(DEMO_MODE_VAR).is_some_and(|v| parse_flag(&v));

        for kind in DatasetKind::ALL {
            if let Some(url) = lookup(kind.url_env_var()) {
                let url = url.trim();
                if !url.is_empty() {
                    settings.remote_urls.insert(kind, url.to_string());
                }
            }
        }

        settings
    }

    pub fn local_path(&self, kind: DatasetKind) -> PathBuf {
        self.local_files
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| self.data_dir.join(kind.edition_file()))
    }

    pub fn sample_path(&self, kind: DatasetKind) -> PathBuf {
        self.sample_dir.join(format!("{}.csv", kind.name()))
    }

    pub fn remote_url(&self, kind: DatasetKind) -> Option<&str> {
        self.remote_urls.get(&kind).map(String::as_str)
    }

    pub fn with_local_file(mut self, kind: DatasetKind, path: impl Into<PathBuf>) -> Self {
        self.local_files.insert(kind, path.into());
        self
    }

    pub fn with_remote_url(mut self, kind: DatasetKind, url: impl Into<String>) -> Self {
        self.remote_urls.insert(kind, url.into());
        self
    }
}

/// Boolean-ish environment flag.
fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let settings = Settings::from_lookup(|_| None);
        assert!(!settings.demo_mode);
        assert!(settings.remote_urls.is_empty());
        assert_eq!(
            settings.local_path(DatasetKind::Msa),
            PathBuf::from("data/MSA_M2024_dl.xlsx")
        );
        assert_eq!(
            settings.sample_path(DatasetKind::NatSector),
            PathBuf::from("sample_data/natsector.csv")
        );
        assert_eq!(settings.fetch_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_demo_flag_values() {
        for on in ["1", "true", "TRUE", "yes", " Yes "] {
            let settings = Settings::from_lookup(lookup_from(&[(DEMO_MODE_VAR, on)]));
            assert!(settings.demo_mode, "{on:?} should enable demo mode");
        }
        for off in ["0", "false", "", "on"] {
            let settings = Settings::from_lookup(lookup_from(&[(DEMO_MODE_VAR, off)]));
            assert!(!settings.demo_mode, "{off:?} should not enable demo mode");
        }
    }

    #[test]
    fn test_remote_urls_skip_blank_values() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("OEWS_URL_NATIONAL", "https://example.org/national.csv"),
            ("OEWS_URL_STATE", "   "),
            ("OEWS_URL_NATSECT", "https://example.org/natsector.xlsx"),
        ]));
        assert_eq!(
            settings.remote_url(DatasetKind::National),
            Some("https://example.org/national.csv")
        );
        assert_eq!(settings.remote_url(DatasetKind::State), None);
        assert_eq!(settings.remote_url(DatasetKind::Msa), None);
        assert_eq!(
            settings.remote_url(DatasetKind::NatSector),
            Some("https://example.org/natsector.xlsx")
        );
    }

    #[test]
    fn test_directory_overrides() {
        let settings = Settings::from_lookup(lookup_from(&[
            (DATA_DIR_VAR, "/srv/oews"),
            (SAMPLE_DIR_VAR, "fixtures"),
        ]));
        assert_eq!(
            settings.local_path(DatasetKind::National),
            PathBuf::from("/srv/oews/national_M2024_dl.xlsx")
        );
        assert_eq!(
            settings.sample_path(DatasetKind::State),
            PathBuf::from("fixtures/state.csv")
        );

        let settings = settings.with_local_file(DatasetKind::State, "/tmp/state.csv");
        assert_eq!(
            settings.local_path(DatasetKind::State),
            PathBuf::from("/tmp/state.csv")
        );
    }
}
