//! World Bank indicator API client.
//!
//! API documentation: https://datahelpdesk.worldbank.org/knowledgebase/articles/898581
//!
//! Responses are returned undecoded beyond JSON; shaping them is the job of
//! `series::normalize`.

use std::thread;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::error::FetchError;
use crate::series::YearWindow;

/// Years requested from the API: one year or an inclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum YearSpan {
    Single(i32),
    Range(YearWindow),
}

impl YearSpan {
    /// The `date=` query value.
    pub fn query(&self) -> String {
        match self {
            YearSpan::Single(year) => year.to_string(),
            YearSpan::Range(w) => format!("{}:{}", w.start, w.end),
        }
    }
}

/// Identifies one API request; also the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub indicator: String,
    pub entities: Vec<String>,
    pub span: YearSpan,
}

impl RequestKey {
    pub fn new(indicator: &str, entities: &[&str], span: YearSpan) -> Self {
        Self {
            indicator: indicator.to_string(),
            entities: entities.iter().map(|e| e.to_string()).collect(),
            span,
        }
    }
}

/// Builds the indicator URL for `key`.
///
/// ```text
/// {base}/country/MY;SG/indicator/NE.EXP.GNFS.ZS?format=json&date=2011:2021&per_page=1000
/// ```
pub fn build_indicator_url(base_url: &str, key: &RequestKey, per_page: u32) -> String {
    format!(
        "{}/country/{}/indicator/{}?format=json&date={}&per_page={}",
        base_url.trim_end_matches('/'),
        key.entities.join(";"),
        key.indicator,
        key.span.query(),
        per_page
    )
}

/// Anything that can produce the raw payload for a request.
pub trait IndicatorSource: Send + Sync {
    fn fetch(&self, key: &RequestKey) -> Result<Value, FetchError>;
}

pub struct WorldBankClient {
    http: reqwest::blocking::Client,
    api: ApiConfig,
}

impl WorldBankClient {
    pub fn new(api: &ApiConfig) -> Result<Self, FetchError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .user_agent(concat!("indicator-atlas/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, api: api.clone() })
    }

    fn fetch_once(&self, url: &str) -> Result<Value, FetchError> {
        let response = self.http.get(url).header("Accept", "application/json").send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http(status.as_u16()));
        }

        let body = response.text()?;
        serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

impl IndicatorSource for WorldBankClient {
    fn fetch(&self, key: &RequestKey) -> Result<Value, FetchError> {
        let url = build_indicator_url(&self.api.base_url, key, self.api.per_page);
        debug!(%url, "fetching indicator");
        with_retry(self.api.retries, Duration::from_millis(self.api.backoff_ms), || {
            self.fetch_once(&url)
        })
    }
}

/// Source used with `--offline`: every request fails without touching the
/// network.
pub struct OfflineSource;

impl IndicatorSource for OfflineSource {
    fn fetch(&self, _key: &RequestKey) -> Result<Value, FetchError> {
        Err(FetchError::Offline)
    }
}

/// Runs `attempt` up to `retries + 1` times, sleeping `backoff * n` before
/// the n-th retry. Only retryable errors are retried.
pub fn with_retry<T>(
    retries: u32,
    backoff: Duration,
    mut attempt: impl FnMut() -> Result<T, FetchError>,
) -> Result<T, FetchError> {
    let mut tries = 0;
    loop {
        match attempt() {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && tries < retries => {
                tries += 1;
                warn!(attempt = tries, error = %err, "retrying request");
                thread::sleep(backoff * tries);
            }
            Err(err) => return Err(err),
        }
    }
}
