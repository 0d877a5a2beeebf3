use super::{Series, SeriesRow, YearWindow};

/// Restricts a series to `window` and, when given, to `allow`.
///
/// The source is left untouched. An empty year intersection gives
/// [`Series::empty`]; an allow-list matching nothing gives a series with
/// no rows.
pub fn filter_range(series: &Series, window: YearWindow, allow: Option<&[&str]>) -> Series {
    let years: Vec<i32> = series.years.iter().copied().filter(|y| window.contains(*y)).collect();
    if years.is_empty() {
        return Series::empty();
    }

    let rows = series
        .rows
        .iter()
        .filter(|row| allow.is_none_or(|codes| codes.contains(&row.code.as_str())))
        .map(|row| SeriesRow {
            code: row.code.clone(),
            values: row
                .values
                .iter()
                .filter(|(year, _)| window.contains(**year))
                .map(|(year, value)| (*year, *value))
                .collect(),
        })
        .collect();

    Series { years, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{build_series, Observation};

    fn sample() -> Series {
        let obs = vec![
            Observation { entity: "MY".into(), year: 2011, value: Some(1.0) },
            Observation { entity: "MY".into(), year: 2015, value: Some(5.0) },
            Observation { entity: "SG".into(), year: 2021, value: Some(9.0) },
        ];
        build_series(&obs, &["MY", "SG", "TH"], YearWindow::new(2011, 2021))
    }

    #[test]
    fn test_window_and_allow_list() {
        let filtered = filter_range(&sample(), YearWindow::new(2014, 2016), Some(&["MY"]));
        assert_eq!(filtered.years, vec![2014, 2015, 2016]);
        assert_eq!(filtered.codes(), vec!["MY"]);
        assert_eq!(filtered.value("MY", 2015), Some(5.0));
        assert_eq!(filtered.get("MY", 2011), None);
    }

    #[test]
    fn test_window_outside_domain_is_empty() {
        let filtered = filter_range(&sample(), YearWindow::new(1990, 2000), None);
        assert!(filtered.is_empty());
        assert!(filtered.rows.is_empty());
    }

    #[test]
    fn test_window_clipped_to_domain() {
        let filtered = filter_range(&sample(), YearWindow::new(2019, 2030), None);
        assert_eq!(filtered.years, vec![2019, 2020, 2021]);
        assert_eq!(filtered.rows.len(), 3);
    }

    #[test]
    fn test_source_is_not_mutated() {
        let source = sample();
        let before = source.clone();
        let _ = filter_range(&source, YearWindow::new(2012, 2012), Some(&[]));
        assert_eq!(source, before);
    }

    #[test]
    fn test_empty_allow_list_keeps_no_rows() {
        let filtered = filter_range(&sample(), YearWindow::new(2011, 2021), Some(&[]));
        assert!(filtered.rows.is_empty());
        assert!(filtered.is_empty());
    }
}
