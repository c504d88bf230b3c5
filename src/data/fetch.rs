//! Remote Fetch Module
//! Downloads table files from a configured URL.

use reqwest::blocking::Client;
use std::time::Duration;
use thiserror::Error;

use crate::config::FETCH_TIMEOUT;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Request to {url} returned status {status}")]
    Status { url: String, status: u16 },
}

/// Fetches the raw bytes of a remote table file.
pub trait RemoteFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Blocking HTTP fetcher with a bounded timeout and no retries.
pub struct HttpFetcher {
    timeout: Duration,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(FETCH_TIMEOUT)
    }
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl RemoteFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        // Built per call: a fetch happens at most once per dataset kind
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(FetchError::Client)?;

        let request_error = |source: reqwest::Error| FetchError::Request {
            url: url.to_string(),
            source,
        };

        let response = client.get(url).send().map_err(request_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().map_err(request_error)?;
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_is_a_request_error() {
        let err = HttpFetcher::default().fetch("not a url").unwrap_err();
        assert!(matches!(err, FetchError::Request { ref url, .. } if url == "not a url"));
    }

    #[test]
    fn test_refused_connection_is_a_request_error() {
        let fetcher = HttpFetcher::new(Duration::from_secs(2));
        let err = fetcher.fetch("http://127.0.0.1:9/national.csv").unwrap_err();
        assert!(err.to_string().starts_with("Request to http://127.0.0.1:9/national.csv failed"));
    }
}
