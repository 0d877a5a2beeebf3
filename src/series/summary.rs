use serde::{Deserialize, Serialize};

use super::YearValues;

/// How "change" is measured between the first and last year in scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeMode {
    /// `last - first`
    #[default]
    Absolute,
    /// `(last - first) / first * 100`; absent when `first` is zero.
    Percent,
}

/// Aggregate statistics over one entity's values in a year window.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Summary {
    pub average: Option<f64>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub change: Option<f64>,
}

/// Summarizes `values` over `years` (ascending, as displayed).
///
/// Average, minimum and maximum only see present values. Change is taken
/// strictly between the values at `years[0]` and `years[last]`; a gap at
/// either end leaves it absent. No present values at all means an
/// all-absent summary.
pub fn summarize(values: &YearValues, years: &[i32], mode: ChangeMode) -> Summary {
    let present: Vec<f64> = years
        .iter()
        .filter_map(|y| values.get(y).copied().flatten())
        .collect();

    if present.is_empty() {
        return Summary::default();
    }

    let average = present.iter().sum::<f64>() / present.len() as f64;
    let minimum = present.iter().copied().fold(f64::INFINITY, f64::min);
    let maximum = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let endpoint = |year: Option<&i32>| year.and_then(|y| values.get(y).copied().flatten());
    let change = match (endpoint(years.first()), endpoint(years.last())) {
        (Some(first), Some(last)) => change_between(first, last, mode),
        _ => None,
    };

    Summary {
        average: Some(average),
        minimum: Some(minimum),
        maximum: Some(maximum),
        change,
    }
}

/// Change from `first` to `last`. Never yields NaN or infinity.
pub fn change_between(first: f64, last: f64, mode: ChangeMode) -> Option<f64> {
    let change = match mode {
        ChangeMode::Absolute => last - first,
        ChangeMode::Percent => {
            if first == 0.0 {
                return None;
            }
            (last - first) / first * 100.0
        }
    };
    change.is_finite().then_some(change)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn values(pairs: &[(i32, Option<f64>)]) -> YearValues {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_stats_ignore_gaps() {
        let v = values(&[(2011, Some(10.0)), (2012, Some(20.0)), (2013, None), (2014, Some(30.0))]);
        let s = summarize(&v, &[2011, 2012, 2013, 2014], ChangeMode::Absolute);
        assert_relative_eq!(s.average.unwrap(), 20.0);
        assert_relative_eq!(s.minimum.unwrap(), 10.0);
        assert_relative_eq!(s.maximum.unwrap(), 30.0);
        assert_relative_eq!(s.change.unwrap(), 20.0);
    }

    #[test]
    fn test_absolute_change_uses_window_endpoints() {
        let v = values(&[(2011, Some(5.0)), (2012, None), (2013, Some(15.0))]);
        let s = summarize(&v, &[2011, 2012, 2013], ChangeMode::Absolute);
        assert_relative_eq!(s.change.unwrap(), 10.0);
    }

    #[test]
    fn test_change_absent_when_endpoint_missing() {
        let v = values(&[(2011, Some(5.0)), (2012, Some(7.0)), (2013, None)]);
        let s = summarize(&v, &[2011, 2012, 2013], ChangeMode::Absolute);
        assert!(s.change.is_none());
        assert_relative_eq!(s.average.unwrap(), 6.0);
    }

    #[test]
    fn test_percent_change() {
        let v = values(&[(2011, Some(50.0)), (2012, Some(75.0))]);
        let s = summarize(&v, &[2011, 2012], ChangeMode::Percent);
        assert_relative_eq!(s.change.unwrap(), 50.0);
    }

    #[test]
    fn test_percent_change_from_zero_is_absent() {
        let v = values(&[(2011, Some(0.0)), (2012, Some(3.0))]);
        let s = summarize(&v, &[2011, 2012], ChangeMode::Percent);
        assert!(s.change.is_none());
        assert_relative_eq!(s.maximum.unwrap(), 3.0);
    }

    #[test]
    fn test_all_absent() {
        let v = values(&[(2011, None), (2012, None)]);
        assert_eq!(summarize(&v, &[2011, 2012], ChangeMode::Absolute), Summary::default());
        assert_eq!(summarize(&v, &[], ChangeMode::Absolute), Summary::default());
    }

    #[test]
    fn test_only_years_in_scope_count() {
        let v = values(&[(2011, Some(100.0)), (2012, Some(2.0)), (2013, Some(4.0))]);
        let s = summarize(&v, &[2012, 2013], ChangeMode::Absolute);
        assert_relative_eq!(s.maximum.unwrap(), 4.0);
        assert_relative_eq!(s.change.unwrap(), 2.0);
    }
}
