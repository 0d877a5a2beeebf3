//! Error types for the I/O edges of the dashboard.
//!
//! The series pipeline itself has no error type: bad input degrades to
//! empty or absent data.

use std::path::PathBuf;

use thiserror::Error;

/// Failures fetching an indicator from the remote API.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Non-2xx response.
    #[error("HTTP error: {0}")]
    Http(u16),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("response body is not JSON: {0}")]
    Decode(String),
    /// The client was started in offline mode.
    #[error("offline mode, no requests issued")]
    Offline,
    #[error("fetch worker has shut down")]
    WorkerGone,
}

impl FetchError {
    /// Transport failures and 5xx responses are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Http(code) => *code >= 500,
            FetchError::Transport(_) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("cannot parse config {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },
    #[error("year domain {first}..={last} is empty")]
    EmptyDomain { first: i32, last: i32 },
    #[error("indicator list is empty")]
    NoIndicators,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot write {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("cannot serialize export: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum MapDataError {
    #[error("cannot read boundaries {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("invalid GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_classification() {
        assert!(FetchError::Http(503).is_retryable());
        assert!(!FetchError::Http(404).is_retryable());
        assert!(!FetchError::Decode("eof".into()).is_retryable());
        assert!(!FetchError::Offline.is_retryable());
    }

    #[test]
    fn test_display() {
        assert_eq!(FetchError::Http(500).to_string(), "HTTP error: 500");
        let err = ConfigError::EmptyDomain { first: 2021, last: 2011 };
        assert_eq!(err.to_string(), "year domain 2021..=2011 is empty");
    }
}
