use approx::assert_relative_eq;
use serde_json::{json, Value};

use indicator_atlas::countries;
use indicator_atlas::series::{
    build_series, filter_range, join_indicators, normalize, sort_rows, summarize, ChangeMode, EntityKey, Series,
    SortDirection, SortKey, SortState, TableRow, YearValues, YearWindow,
};
use indicator_atlas::views;

const DOMAIN: YearWindow = YearWindow { start: 2011, end: 2021 };

fn record(id: &str, name: &str, year: i32, value: Value) -> Value {
    json!({
        "indicator": { "id": "NE.EXP.GNFS.ZS", "value": "Exports of goods and services (% of GDP)" },
        "country": { "id": id, "value": name },
        "countryiso3code": "",
        "date": year.to_string(),
        "value": value,
        "unit": "",
        "obs_status": "",
        "decimal": 1
    })
}

fn payload(records: Vec<Value>) -> Value {
    json!([{ "page": 1, "pages": 1, "per_page": 1000, "total": records.len() }, records])
}

fn exports() -> Value {
    payload(vec![
        record("MY", "Malaysia", 2011, json!(10.0)),
        record("MY", "Malaysia", 2012, json!(20.0)),
        record("MY", "Malaysia", 2013, Value::Null),
        record("MY", "Malaysia", 2014, json!(30.0)),
        record("SG", "Singapore", 2011, json!(5.0)),
        record("SG", "Singapore", 2013, json!(15.0)),
        record("TH", "Thailand", 2021, json!(58.2)),
    ])
}

fn all_codes() -> Vec<&'static str> {
    countries::all_codes()
}

#[test]
fn test_entities_without_observations_are_absent_not_zero() {
    let obs = normalize(&exports(), EntityKey::Code);
    let series = build_series(&obs, &all_codes(), DOMAIN);

    assert_eq!(series.rows.len(), countries::COUNTRIES.len());
    let vn = series.row("VN").unwrap();
    assert_eq!(vn.values.len(), DOMAIN.years().len());
    assert!(vn.values.values().all(Option::is_none));
    assert_eq!(series.get("MY", 2013), Some(None));
}

#[test]
fn test_name_keyed_payload_lands_on_the_same_codes() {
    let by_code = build_series(&normalize(&exports(), EntityKey::Code), &all_codes(), DOMAIN);
    let by_name = build_series(&normalize(&exports(), EntityKey::Name), &all_codes(), DOMAIN);
    assert_eq!(by_code, by_name);
}

#[test]
fn test_full_window_filter_is_identity() {
    let direct = build_series(&normalize(&exports(), EntityKey::Code), &all_codes(), DOMAIN);
    let filtered = filter_range(&direct, DOMAIN, None);
    assert_eq!(filtered, direct);

    let everyone = all_codes();
    assert_eq!(filter_range(&direct, DOMAIN, Some(&everyone)), direct);
}

#[test]
fn test_filter_is_idempotent() {
    let series = build_series(&normalize(&exports(), EntityKey::Code), &all_codes(), DOMAIN);
    let window = YearWindow::new(2012, 2014);
    let allow = ["MY", "SG"];
    let once = filter_range(&series, window, Some(&allow));
    let twice = filter_range(&once, window, Some(&allow));
    assert_eq!(once, twice);
    assert_eq!(once.years, vec![2012, 2013, 2014]);
    assert_eq!(once.codes(), vec!["MY", "SG"]);
}

#[test]
fn test_window_outside_domain_is_empty() {
    let series = build_series(&normalize(&exports(), EntityKey::Code), &all_codes(), DOMAIN);
    let filtered = filter_range(&series, YearWindow::new(2030, 2035), None);
    assert!(filtered.is_empty());
    assert_eq!(filtered, Series::empty());
}

#[test]
fn test_observations_outside_domain_are_dropped() {
    let data = payload(vec![record("MY", "Malaysia", 1999, json!(1.0)), record("MY", "Malaysia", 2011, json!(2.0))]);
    let series = build_series(&normalize(&data, EntityKey::Code), &["MY"], DOMAIN);
    assert_eq!(series.get("MY", 1999), None);
    assert_eq!(series.value("MY", 2011), Some(2.0));
}

#[test]
fn test_summary_over_gappy_window() {
    let series = build_series(&normalize(&exports(), EntityKey::Code), &["MY", "SG"], DOMAIN);
    let window = YearWindow::new(2011, 2014);
    let filtered = filter_range(&series, window, None);

    let my = summarize(&filtered.row("MY").unwrap().values, &filtered.years, ChangeMode::Absolute);
    assert_relative_eq!(my.average.unwrap(), 20.0);
    assert_relative_eq!(my.minimum.unwrap(), 10.0);
    assert_relative_eq!(my.maximum.unwrap(), 30.0);
    assert_relative_eq!(my.change.unwrap(), 20.0);

    let sg_window = filter_range(&series, YearWindow::new(2011, 2013), None);
    let sg = summarize(&sg_window.row("SG").unwrap().values, &sg_window.years, ChangeMode::Absolute);
    assert_relative_eq!(sg.change.unwrap(), 10.0);
}

#[test]
fn test_percent_change_from_zero_is_absent() {
    let mut values = YearValues::new();
    values.insert(2011, Some(0.0));
    values.insert(2012, Some(8.0));
    let s = summarize(&values, &[2011, 2012], ChangeMode::Percent);
    assert_eq!(s.change, None);
}

fn table_row(name: &str, value: Option<f64>) -> TableRow {
    let mut values = YearValues::new();
    values.insert(2021, value);
    TableRow {
        code: name.to_string(),
        country: name.to_string(),
        summary: summarize(&values, &[2021], ChangeMode::Absolute),
        values,
    }
}

#[test]
fn test_absent_sorts_last_both_ways() {
    let rows = vec![table_row("B", None), table_row("A", Some(5.0))];
    for direction in [SortDirection::Ascending, SortDirection::Descending] {
        let sorted = sort_rows(&rows, SortState { key: SortKey::Year(2021), direction });
        let names: Vec<&str> = sorted.iter().map(|r| r.country.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }
}

#[test]
fn test_join_drops_entity_missing_one_indicator() {
    let x = payload(vec![record("MY", "Malaysia", 2021, json!(11000.0)), record("SG", "Singapore", 2021, json!(72794.0))]);
    let y = payload(vec![record("MY", "Malaysia", 2021, json!(69.0)), record("SG", "Singapore", 2021, json!(185.0))]);
    let z = payload(vec![record("MY", "Malaysia", 2021, json!(33_573_874.0)), record("SG", "Singapore", 2021, Value::Null)]);

    let codes = all_codes();
    let build = |p: &Value| build_series(&normalize(p, EntityKey::Code), &codes, DOMAIN);
    let joined = join_indicators(&build(&x), &build(&y), &build(&z), 2021);

    assert_eq!(joined.len(), 1);
    assert_eq!(joined[0].code, "MY");
    assert_relative_eq!(joined[0].z, 33_573_874.0);
}

#[test]
fn test_table_view_end_to_end() {
    let series = build_series(&normalize(&exports(), EntityKey::Code), &all_codes(), DOMAIN);
    let sort = SortState { key: SortKey::Average, direction: SortDirection::Descending };
    let view = views::build_table(&series, YearWindow::new(2011, 2014), ChangeMode::Absolute, "", sort);

    assert_eq!(view.years, vec![2011, 2012, 2013, 2014]);
    assert_eq!(view.rows[0].code, "MY");
    assert_eq!(view.rows[1].code, "SG");
    // Everyone else has no data in the window and trails.
    assert!(view.rows[2..].iter().all(|r| r.summary.average.is_none()));

    let searched = views::build_table(&series, DOMAIN, ChangeMode::Absolute, "sing", sort);
    assert_eq!(searched.rows.len(), 1);
    assert_eq!(searched.rows[0].country, "Singapore");
}
