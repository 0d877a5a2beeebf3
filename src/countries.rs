//! Country registry and indicator catalogue.
//!
//! The dashboard tracks a fixed, closed set of ASEAN members. This module is
//! the single source of truth for their codes, labels and colours; every
//! other module refers to countries through the short code.

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// A tracked country.
#[derive(Debug)]
pub struct Country {
    /// World Bank short code, e.g. "MY". Canonical key everywhere.
    pub code: &'static str,
    /// Display label. Never used as a key.
    pub name: &'static str,
    /// Capital latitude, used for map markers when no boundaries are loaded.
    pub latitude: f64,
    pub longitude: f64,
    /// Line/marker colour in the charts.
    pub color: Color,
}

pub const COUNTRIES: &[Country] = &[
    Country { code: "MY", name: "Malaysia",    latitude: 3.139,  longitude: 101.687, color: Color::Rgb(0x33, 0x66, 0xCC) },
    Country { code: "ID", name: "Indonesia",   latitude: -6.208, longitude: 106.846, color: Color::Rgb(0xDC, 0x39, 0x12) },
    Country { code: "SG", name: "Singapore",   latitude: 1.352,  longitude: 103.820, color: Color::Rgb(0xFF, 0x99, 0x00) },
    Country { code: "TH", name: "Thailand",    latitude: 13.756, longitude: 100.502, color: Color::Rgb(0x10, 0x96, 0x18) },
    Country { code: "MM", name: "Myanmar",     latitude: 19.763, longitude: 96.079,  color: Color::Rgb(0x99, 0x00, 0x99) },
    Country { code: "VN", name: "Vietnam",     latitude: 21.028, longitude: 105.834, color: Color::Rgb(0x00, 0x99, 0xC6) },
    Country { code: "BN", name: "Brunei",      latitude: 4.903,  longitude: 114.940, color: Color::Rgb(0xDD, 0x44, 0x77) },
    Country { code: "LA", name: "Lao PDR",     latitude: 17.975, longitude: 102.633, color: Color::Rgb(0x66, 0xAA, 0x00) },
    Country { code: "KH", name: "Cambodia",    latitude: 11.556, longitude: 104.928, color: Color::Rgb(0xB8, 0x2E, 0x2E) },
    Country { code: "PH", name: "Philippines", latitude: 14.600, longitude: 120.984, color: Color::Rgb(0x31, 0x63, 0x95) },
];

/// Codes of every tracked country, in registry order.
pub fn all_codes() -> Vec<&'static str> {
    COUNTRIES.iter().map(|c| c.code).collect()
}

/// Looks up a country by short code.
pub fn find_country(code: &str) -> Option<&'static Country> {
    COUNTRIES.iter().find(|c| c.code == code)
}

/// Translates a display name to its short code (case-insensitive).
pub fn code_for_name(name: &str) -> Option<&'static str> {
    COUNTRIES
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
        .map(|c| c.code)
}

/// Display label for a code, falling back to the code itself.
pub fn label(code: &str) -> &str {
    find_country(code).map(|c| c.name).unwrap_or(code)
}

// ---------------------------------------------------------------------------
// Indicators
// ---------------------------------------------------------------------------

/// A remote statistical series. The code is opaque; it is only ever used as
/// a lookup key against the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indicator {
    pub code: String,
    pub label: String,
}

impl Indicator {
    pub fn new(code: &str, label: &str) -> Self {
        Self { code: code.to_string(), label: label.to_string() }
    }
}

pub const FDI_INFLOWS: &str = "BX.KLT.DINV.WD.GD.ZS";
pub const EXPORTS: &str = "NE.EXP.GNFS.ZS";
pub const TRADE: &str = "NE.TRD.GNFS.ZS";
pub const HYDRO: &str = "EG.ELC.HYRO.ZS";
pub const GDP_PER_CAPITA: &str = "NY.GDP.PCAP.CD";
pub const POPULATION: &str = "SP.POP.TOTL";

/// Scatter axes: GDP per capita (x), exports (y), population (marker size).
pub const SCATTER_AXES: [&str; 3] = [GDP_PER_CAPITA, EXPORTS, POPULATION];

pub fn default_indicators() -> Vec<Indicator> {
    vec![
        Indicator::new(FDI_INFLOWS, "Foreign direct investment, net inflows (% of GDP)"),
        Indicator::new(EXPORTS, "Exports of goods and services (% of GDP)"),
        Indicator::new(TRADE, "Trade (% of GDP)"),
        Indicator::new(HYDRO, "Hydroelectricity (% of total electricity output)"),
        Indicator::new(GDP_PER_CAPITA, "GDP per capita (current US$)"),
        Indicator::new(POPULATION, "Population, total"),
    ]
}
