use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::{Summary, YearValues};

/// One table row: a country's windowed values plus their summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub code: String,
    pub country: String,
    pub values: YearValues,
    pub summary: Summary,
}

/// Column a table can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    Country,
    Year(i32),
    Average,
    Minimum,
    Maximum,
    Change,
}

impl SortKey {
    fn numeric(self, row: &TableRow) -> Option<f64> {
        match self {
            SortKey::Country => None,
            SortKey::Year(year) => row.values.get(&year).copied().flatten(),
            SortKey::Average => row.summary.average,
            SortKey::Minimum => row.summary.minimum,
            SortKey::Maximum => row.summary.maximum,
            SortKey::Change => row.summary.change,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortState {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortState {
    /// Same key flips the direction; a new key starts ascending.
    pub fn select(&mut self, key: SortKey) {
        if self.key == key {
            self.direction = self.direction.flipped();
        } else {
            self.key = key;
            self.direction = SortDirection::Ascending;
        }
    }
}

/// Returns `rows` ordered by `state`.
///
/// Stable on ties. Rows lacking a value for the key always go last, in
/// either direction.
pub fn sort_rows(rows: &[TableRow], state: SortState) -> Vec<TableRow> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| compare(a, b, state));
    sorted
}

fn compare(a: &TableRow, b: &TableRow, state: SortState) -> Ordering {
    let directed = |ord: Ordering| match state.direction {
        SortDirection::Ascending => ord,
        SortDirection::Descending => ord.reverse(),
    };

    if state.key == SortKey::Country {
        return directed(collate(&a.country, &b.country));
    }

    match (state.key.numeric(a), state.key.numeric(b)) {
        (Some(x), Some(y)) => directed(x.total_cmp(&y)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Case-insensitive ordering with a case-sensitive tiebreak, so "lao pdr"
/// and "Lao PDR" land together but still order deterministically.
fn collate(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(country: &str, value: Option<f64>) -> TableRow {
        let mut values = YearValues::new();
        values.insert(2021, value);
        TableRow {
            code: country.to_string(),
            country: country.to_string(),
            values,
            summary: Summary { average: value, minimum: value, maximum: value, change: None },
        }
    }

    fn names(rows: &[TableRow]) -> Vec<&str> {
        rows.iter().map(|r| r.country.as_str()).collect()
    }

    #[test]
    fn test_absent_sorts_last_both_directions() {
        let rows = vec![row("B", None), row("A", Some(5.0)), row("C", Some(1.0))];
        let mut state = SortState::default();
        state.select(SortKey::Year(2021));
        assert_eq!(names(&sort_rows(&rows, state)), vec!["C", "A", "B"]);
        state.select(SortKey::Year(2021));
        assert_eq!(state.direction, SortDirection::Descending);
        assert_eq!(names(&sort_rows(&rows, state)), vec!["A", "C", "B"]);
    }

    #[test]
    fn test_country_sort_case_insensitive() {
        let rows = vec![row("vietnam", None), row("Brunei", None), row("Malaysia", None)];
        let sorted = sort_rows(&rows, SortState::default());
        assert_eq!(names(&sorted), vec!["Brunei", "Malaysia", "vietnam"]);
    }

    #[test]
    fn test_ties_are_stable() {
        let rows = vec![row("X", Some(1.0)), row("Y", Some(1.0)), row("Z", Some(1.0))];
        let state = SortState { key: SortKey::Average, direction: SortDirection::Descending };
        assert_eq!(names(&sort_rows(&rows, state)), vec!["X", "Y", "Z"]);
    }

    #[test]
    fn test_new_key_resets_to_ascending() {
        let mut state = SortState { key: SortKey::Maximum, direction: SortDirection::Descending };
        state.select(SortKey::Change);
        assert_eq!(state, SortState { key: SortKey::Change, direction: SortDirection::Ascending });
    }

    #[test]
    fn test_summary_key_with_missing_change() {
        let rows = vec![row("A", Some(2.0)), row("B", Some(1.0))];
        let state = SortState { key: SortKey::Change, direction: SortDirection::Ascending };
        // No change values at all: original order.
        assert_eq!(names(&sort_rows(&rows, state)), vec!["A", "B"]);
    }
}
