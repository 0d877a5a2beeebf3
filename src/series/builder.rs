use std::collections::HashMap;

use super::{Observation, Series, SeriesRow, YearValues, YearWindow};

/// Builds a dense series over `entities` × `domain`.
///
/// Observations outside either set are dropped. A repeated (entity, year)
/// keeps the later observation. Pairs with no observation are explicit
/// gaps.
pub fn build_series(observations: &[Observation], entities: &[&str], domain: YearWindow) -> Series {
    let years = domain.years();

    let mut table: HashMap<&str, YearValues> = entities
        .iter()
        .map(|code| (*code, years.iter().map(|y| (*y, None)).collect()))
        .collect();

    for obs in observations {
        if !domain.contains(obs.year) {
            continue;
        }
        if let Some(values) = table.get_mut(obs.entity.as_str()) {
            values.insert(obs.year, obs.value);
        }
    }

    let mut rows = Vec::with_capacity(entities.len());
    for code in entities {
        // Duplicate codes in the entity list collapse to their first position.
        if let Some(values) = table.remove(code) {
            rows.push(SeriesRow { code: code.to_string(), values });
        }
    }

    Series { years, rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(entity: &str, year: i32, value: Option<f64>) -> Observation {
        Observation { entity: entity.to_string(), year, value }
    }

    const DOMAIN: YearWindow = YearWindow { start: 2011, end: 2013 };

    #[test]
    fn test_dense_for_entities_without_observations() {
        let series = build_series(&[obs("MY", 2012, Some(3.0))], &["MY", "SG"], DOMAIN);
        assert_eq!(series.years, vec![2011, 2012, 2013]);
        let sg = series.row("SG").unwrap();
        assert_eq!(sg.values.len(), 3);
        assert!(sg.values.values().all(Option::is_none));
        assert_eq!(series.get("MY", 2011), Some(None));
        assert_eq!(series.value("MY", 2012), Some(3.0));
    }

    #[test]
    fn test_drops_unknown_entities_and_years() {
        let series = build_series(
            &[obs("XX", 2012, Some(1.0)), obs("MY", 2030, Some(1.0))],
            &["MY"],
            DOMAIN,
        );
        assert_eq!(series.codes(), vec!["MY"]);
        assert!(series.row("MY").unwrap().values.values().all(Option::is_none));
        assert!(series.row("MY").unwrap().values.get(&2030).is_none());
    }

    #[test]
    fn test_later_duplicate_wins() {
        let series = build_series(
            &[obs("MY", 2011, Some(1.0)), obs("MY", 2011, Some(2.0)), obs("MY", 2012, Some(5.0)), obs("MY", 2012, None)],
            &["MY"],
            DOMAIN,
        );
        assert_eq!(series.value("MY", 2011), Some(2.0));
        assert_eq!(series.get("MY", 2012), Some(None));
    }

    #[test]
    fn test_rows_follow_entity_order() {
        let series = build_series(&[], &["TH", "MY", "ID"], DOMAIN);
        assert_eq!(series.codes(), vec!["TH", "MY", "ID"]);
    }
}
