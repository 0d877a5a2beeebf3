//! Dashboard configuration, read from an optional TOML file.
//!
//! ```toml
//! [api]
//! base_url = "https://api.worldbank.org/v2"
//! retries = 2
//!
//! [dashboard]
//! first_year = 2011
//! last_year = 2021
//! change = "percent"
//!
//! [[indicators]]
//! code = "NE.EXP.GNFS.ZS"
//! label = "Exports of goods and services (% of GDP)"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::countries::{self, Indicator};
use crate::error::ConfigError;
use crate::series::{ChangeMode, YearWindow};

pub const DEFAULT_CONFIG_PATH: &str = "indicator-atlas.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Extra attempts after the first failure.
    pub retries: u32,
    pub backoff_ms: u64,
    pub per_page: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.worldbank.org/v2".to_string(),
            timeout_secs: 20,
            retries: 2,
            backoff_ms: 500,
            per_page: 1000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub first_year: i32,
    pub last_year: i32,
    pub default_year: i32,
    pub default_indicator: String,
    /// Applied uniformly to every view and the export.
    pub change: ChangeMode,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            first_year: 2011,
            last_year: 2021,
            default_year: 2021,
            default_indicator: countries::FDI_INFLOWS.to_string(),
            change: ChangeMode::Absolute,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Where the optional `asean.geojson` boundaries live.
    pub data_dir: PathBuf,
    pub export_dir: PathBuf,
    pub log_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            export_dir: PathBuf::from("."),
            log_file: PathBuf::from("indicator-atlas.log"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub dashboard: DashboardConfig,
    pub paths: PathsConfig,
    pub indicators: Vec<Indicator>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            dashboard: DashboardConfig::default(),
            paths: PathsConfig::default(),
            indicators: countries::default_indicators(),
        }
    }
}

impl Config {
    /// Loads `path`, or the defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validated()
    }

    /// Checks the year domain and clamps the defaults into it.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        let d = &mut self.dashboard;
        if d.first_year > d.last_year {
            return Err(ConfigError::EmptyDomain { first: d.first_year, last: d.last_year });
        }
        if self.indicators.is_empty() {
            return Err(ConfigError::NoIndicators);
        }
        d.default_year = d.default_year.clamp(d.first_year, d.last_year);
        if !self.indicators.iter().any(|i| i.code == d.default_indicator) {
            d.default_indicator = self.indicators[0].code.clone();
        }
        Ok(self)
    }

    pub fn domain(&self) -> YearWindow {
        YearWindow::new(self.dashboard.first_year, self.dashboard.last_year)
    }

    pub fn find_indicator(&self, code: &str) -> Option<&Indicator> {
        self.indicators.iter().find(|i| i.code == code)
    }
}
