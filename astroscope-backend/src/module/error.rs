//! Upstream fetch errors shared by the Celestrak and NASA clients

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid catalog group '{0}'")]
    InvalidGroup(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("HTTP request to {source_name} failed: {error}")]
    Http {
        source_name: &'static str,
        #[source]
        error: reqwest::Error,
    },

    #[error("{source_name} returned HTTP {status}: {message}")]
    Status {
        source_name: &'static str,
        status: u16,
        message: String,
    },

    #[error("{source_name} returned no data: {message}")]
    NoData {
        source_name: &'static str,
        message: String,
    },

    #[error("failed to parse {source_name} response: {error}")]
    Parse {
        source_name: &'static str,
        #[source]
        error: serde_json::Error,
    },
}

impl FetchError {
    pub(crate) fn http(source_name: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |error| FetchError::Http { source_name, error }
    }

    pub(crate) fn parse(source_name: &'static str) -> impl FnOnce(serde_json::Error) -> Self {
        move |error| FetchError::Parse { source_name, error }
    }

    /// True when the request itself was rejected before reaching the upstream API
    pub fn is_invalid_request(&self) -> bool {
        matches!(self, FetchError::InvalidGroup(_) | FetchError::InvalidRequest(_))
    }
}
