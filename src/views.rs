//! View models: what each tab draws, computed from pipeline output.
//!
//! Nothing here touches the terminal, so every view can be checked in
//! tests without a backend.

use crate::countries;
use crate::series::{
    filter_range, sort_rows, summarize, ChangeMode, JoinedRecord, Series, SortState, TableRow, YearWindow,
};

/// Number of colour classes on the choropleth.
pub const MAP_CLASSES: usize = 5;

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub years: Vec<i32>,
    pub rows: Vec<TableRow>,
}

/// Rows for every entity in `series`, windowed, summarized, searched and
/// sorted, in that order.
pub fn build_table(series: &Series, window: YearWindow, mode: ChangeMode, search: &str, sort: SortState) -> TableView {
    let windowed = filter_range(series, window, None);
    let years = windowed.years.clone();
    let needle = search.trim().to_lowercase();

    let rows: Vec<TableRow> = windowed
        .rows
        .into_iter()
        .map(|row| {
            let summary = summarize(&row.values, &years, mode);
            TableRow {
                country: countries::label(&row.code).to_string(),
                code: row.code,
                values: row.values,
                summary,
            }
        })
        .filter(|row| needle.is_empty() || row.country.to_lowercase().contains(&needle))
        .collect();

    TableView { rows: sort_rows(&rows, sort), years }
}

// ---------------------------------------------------------------------------
// Line chart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub code: String,
    /// (year, value); gap years are left out.
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineView {
    pub lines: Vec<LineSeries>,
    pub x_bounds: [f64; 2],
    /// `None` when no selected country has a present value in the window.
    pub y_bounds: Option<[f64; 2]>,
}

pub fn build_lines(series: &Series, window: YearWindow, selected: &[&str]) -> LineView {
    let windowed = filter_range(series, window, Some(selected));

    let lines: Vec<LineSeries> = windowed
        .rows
        .iter()
        .map(|row| LineSeries {
            code: row.code.clone(),
            points: row
                .values
                .iter()
                .filter_map(|(year, value)| value.map(|v| (*year as f64, v)))
                .collect(),
        })
        .collect();

    let x_bounds = match (windowed.years.first(), windowed.years.last()) {
        (Some(first), Some(last)) => [*first as f64, *last as f64],
        _ => [window.start as f64, window.end as f64],
    };
    let y_bounds = value_bounds(lines.iter().flat_map(|l| l.points.iter().map(|p| p.1)));

    LineView { lines, x_bounds, y_bounds }
}

// ---------------------------------------------------------------------------
// Bar chart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub code: String,
    pub value: Option<f64>,
}

/// One bar per selected country at `year`, in series order.
pub fn build_bars(series: &Series, year: i32, selected: &[&str]) -> Vec<Bar> {
    filter_range(series, YearWindow::new(year, year), Some(selected))
        .rows
        .into_iter()
        .map(|row| Bar { value: row.values.get(&year).copied().flatten(), code: row.code })
        .collect()
}

// ---------------------------------------------------------------------------
// Choropleth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
    pub code: String,
    pub value: Option<f64>,
    /// 0..MAP_CLASSES, `None` for no data.
    pub class: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapLegend {
    pub entries: Vec<MapEntry>,
    pub bounds: Option<[f64; 2]>,
}

/// Classifies every entity's value at `year` into equal-width classes
/// between the present minimum and maximum.
pub fn build_choropleth(series: &Series, year: i32) -> MapLegend {
    let values: Vec<(String, Option<f64>)> = series
        .rows
        .iter()
        .map(|row| (row.code.clone(), row.values.get(&year).copied().flatten()))
        .collect();
    let bounds = value_bounds(values.iter().filter_map(|(_, v)| *v));

    let entries = values
        .into_iter()
        .map(|(code, value)| MapEntry {
            class: value.zip(bounds).map(|(v, b)| classify(v, b)),
            code,
            value,
        })
        .collect();

    MapLegend { entries, bounds }
}

fn classify(value: f64, [min, max]: [f64; 2]) -> usize {
    let span = max - min;
    if span <= 0.0 {
        return 0;
    }
    let class = ((value - min) / span * MAP_CLASSES as f64) as usize;
    class.min(MAP_CLASSES - 1)
}

// ---------------------------------------------------------------------------
// Scatter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub code: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// z relative to the largest z in the set, in (0, 1].
    pub size: f64,
}

/// Scales marker sizes for joined scatter records.
pub fn scatter_points(records: &[JoinedRecord]) -> Vec<ScatterPoint> {
    let max_z = records.iter().map(|r| r.z.abs()).fold(0.0_f64, f64::max);
    records
        .iter()
        .map(|r| ScatterPoint {
            code: r.code.clone(),
            x: r.x,
            y: r.y,
            z: r.z,
            size: if max_z > 0.0 { r.z.abs() / max_z } else { 1.0 },
        })
        .collect()
}

fn value_bounds(values: impl Iterator<Item = f64>) -> Option<[f64; 2]> {
    values.fold(None, |acc, v| match acc {
        None => Some([v, v]),
        Some([lo, hi]) => Some([lo.min(v), hi.max(v)]),
    })
}
