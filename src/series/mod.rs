//! Indicator series transform.
//!
//! Every view goes through the same pipeline:
//!
//! ```text
//! raw payload ─ normalize ─> observations ─ build ─> dense Series
//!             ─ filter ─> windowed Series ─ summary / sort / join ─> views
//! ```
//!
//! All stages are pure functions over owned values. Missing data is carried
//! as `None` from the payload to the view and is never coerced to zero.

pub mod builder;
pub mod filter;
pub mod join;
pub mod normalize;
pub mod sort;
pub mod summary;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use builder::build_series;
pub use filter::filter_range;
pub use join::{join_indicators, JoinedRecord};
pub use normalize::{normalize, EntityKey};
pub use sort::{sort_rows, SortDirection, SortKey, SortState, TableRow};
pub use summary::{summarize, ChangeMode, Summary};

/// One (entity, year, value) triple read out of an API payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub entity: String,
    pub year: i32,
    pub value: Option<f64>,
}

/// Inclusive year window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YearWindow {
    pub start: i32,
    pub end: i32,
}

impl YearWindow {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, year: i32) -> bool {
        year >= self.start && year <= self.end
    }

    /// Years of the window in ascending order. Empty when `start > end`.
    pub fn years(&self) -> Vec<i32> {
        (self.start..=self.end).collect()
    }
}

/// Year → value for one entity. `None` marks an explicit gap.
pub type YearValues = BTreeMap<i32, Option<f64>>;

/// One entity's entry in a [`Series`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesRow {
    pub code: String,
    pub values: YearValues,
}

/// Dense entity × year table.
///
/// Every row holds an entry for every year in `years`, present or not.
/// Rows keep the order of the entity set they were built from.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Series {
    pub years: Vec<i32>,
    pub rows: Vec<SeriesRow>,
}

impl Series {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty() || self.rows.is_empty()
    }

    pub fn row(&self, code: &str) -> Option<&SeriesRow> {
        self.rows.iter().find(|r| r.code == code)
    }

    /// Value at (entity, year). Outer `None` means the pair is outside the
    /// series; inner `None` means the series holds an explicit gap there.
    pub fn get(&self, code: &str, year: i32) -> Option<Option<f64>> {
        self.row(code)?.values.get(&year).copied()
    }

    /// Value at (entity, year), flattening "outside" and "gap" together.
    pub fn value(&self, code: &str, year: i32) -> Option<f64> {
        self.get(code, year).flatten()
    }

    pub fn codes(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.code.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_years_inclusive() {
        assert_eq!(YearWindow::new(2011, 2013).years(), vec![2011, 2012, 2013]);
        assert!(YearWindow::new(2014, 2013).years().is_empty());
    }

    #[test]
    fn test_get_distinguishes_gap_from_outside() {
        let mut values = YearValues::new();
        values.insert(2011, None);
        let series = Series {
            years: vec![2011],
            rows: vec![SeriesRow { code: "MY".into(), values }],
        };
        assert_eq!(series.get("MY", 2011), Some(None));
        assert_eq!(series.get("MY", 2012), None);
        assert_eq!(series.get("SG", 2011), None);
    }
}
