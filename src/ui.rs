use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line as TextLine, Span},
    widgets::{
        canvas::{Canvas, Circle},
        Axis, Bar, BarChart, BarGroup, Block, Borders, Cell, Chart, Dataset, GraphType, List, ListItem,
        ListState, Paragraph, Row, Table, Tabs, Wrap,
    },
    Frame,
};

use crate::countries;
use crate::format::{format_compact, format_compact_opt, format_value};
use crate::map_draw::{self, class_color, CLASS_COLORS};
use crate::series::{SortKey, SortState};
use crate::state::{AppState, InputMode, Load, Tab};
use crate::views;

pub fn draw(f: &mut Frame, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(4),
        ])
        .split(f.area());

    draw_header(f, state, rows[0]);
    draw_tabs(f, state, rows[1]);

    let tab = state.dashboard.tab;
    let body = if tab.uses_country_selection() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(40), Constraint::Length(22)])
            .split(rows[2]);
        draw_country_selector(f, state, cols[1]);
        cols[0]
    } else {
        rows[2]
    };

    match tab {
        Tab::Table => draw_table(f, state, body),
        Tab::Line => draw_lines(f, state, body),
        Tab::Bar => draw_bars(f, state, body),
        Tab::Map => draw_map(f, state, body),
        Tab::Scatter => draw_scatter(f, state, body),
    }

    draw_footer(f, state, rows[3]);
}

fn draw_header(f: &mut Frame, state: &AppState, area: Rect) {
    let d = &state.dashboard;
    let indicator = state.indicator().map(|i| i.label.as_str()).unwrap_or(d.indicator.as_str());
    let line = TextLine::from(vec![
        Span::styled(indicator.to_string(), Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(format!("   years {}–{}   year {}", d.year_range.start, d.year_range.end, d.selected_year)),
    ]);
    let header = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title(" ASEAN indicators "));
    f.render_widget(header, area);
}

fn draw_tabs(f: &mut Frame, state: &AppState, area: Rect) {
    let titles: Vec<String> = Tab::ALL.iter().enumerate().map(|(i, t)| format!("{} {}", i + 1, t.title())).collect();
    let tabs = Tabs::new(titles)
        .select(state.dashboard.tab.index())
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, area);
}

fn draw_country_selector(f: &mut Frame, state: &AppState, area: Rect) {
    let items: Vec<ListItem> = countries::COUNTRIES
        .iter()
        .map(|c| {
            let on = state.dashboard.selected_countries.iter().any(|s| s == c.code);
            let mark = if on { "[x]" } else { "[ ]" };
            ListItem::new(TextLine::from(vec![
                Span::raw(format!("{} ", mark)),
                Span::styled(c.name, Style::default().fg(c.color)),
            ]))
        })
        .collect();
    let mut list_state = ListState::default();
    list_state.select(Some(state.cursor));
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Countries"))
        .highlight_symbol(">> ")
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    f.render_stateful_widget(list, area, &mut list_state);
}

/// Loading / failure placeholder. Returns true if the caller should stop.
fn draw_load_state<T>(f: &mut Frame, load: &Load<T>, title: &str, area: Rect) -> bool {
    let text = match load {
        Load::Ready(_) => return false,
        Load::Idle | Load::Loading => "Loading data...".to_string(),
        Load::Failed(e) => format!("Error loading data: {}", e),
    };
    let style = match load {
        Load::Failed(_) => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::Gray),
    };
    let p = Paragraph::new(text)
        .style(style)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .wrap(Wrap { trim: true });
    f.render_widget(p, area);
    true
}

fn draw_empty(f: &mut Frame, title: &str, area: Rect) {
    let p = Paragraph::new("No data for the current selection")
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL).title(title.to_string()));
    f.render_widget(p, area);
}

fn header_cell(label: String, key: SortKey, sort: SortState) -> Cell<'static> {
    if sort.key == key {
        Cell::from(format!("{} {}", label, sort.direction.arrow())).style(Style::default().fg(Color::Yellow))
    } else {
        Cell::from(label)
    }
}

fn draw_table(f: &mut Frame, state: &AppState, area: Rect) {
    if draw_load_state(f, &state.table, "Table", area) {
        return;
    }
    let Some(view) = state.table_view() else {
        return;
    };
    let sort = state.dashboard.sort;

    let mut header = vec![header_cell("Country".to_string(), SortKey::Country, sort)];
    header.extend(view.years.iter().map(|y| header_cell(y.to_string(), SortKey::Year(*y), sort)));
    header.push(header_cell("Avg".to_string(), SortKey::Average, sort));
    header.push(header_cell("Min".to_string(), SortKey::Minimum, sort));
    header.push(header_cell("Max".to_string(), SortKey::Maximum, sort));
    header.push(header_cell("Change".to_string(), SortKey::Change, sort));

    let rows: Vec<Row> = view
        .rows
        .iter()
        .map(|row| {
            let mut cells = vec![Cell::from(row.country.clone())];
            cells.extend(view.years.iter().map(|y| Cell::from(format_value(row.values.get(y).copied().flatten()))));
            cells.push(Cell::from(format_value(row.summary.average)));
            cells.push(Cell::from(format_value(row.summary.minimum)));
            cells.push(Cell::from(format_value(row.summary.maximum)));
            cells.push(Cell::from(format_value(row.summary.change)));
            Row::new(cells)
        })
        .collect();

    let mut widths = vec![Constraint::Length(13)];
    widths.extend(view.years.iter().map(|_| Constraint::Length(9)));
    widths.extend([Constraint::Length(9); 4]);

    let search = if state.dashboard.search.is_empty() {
        String::new()
    } else {
        format!(" search: \"{}\" ", state.dashboard.search)
    };
    let table = Table::new(rows, widths)
        .header(Row::new(header).style(Style::default().add_modifier(Modifier::BOLD)))
        .block(Block::default().borders(Borders::ALL).title(format!("Table{}", search)));
    f.render_widget(table, area);
}

fn draw_lines(f: &mut Frame, state: &AppState, area: Rect) {
    if draw_load_state(f, &state.selection, "Line chart", area) {
        return;
    }
    let Load::Ready(series) = &state.selection else {
        return;
    };
    let view = views::build_lines(series, state.dashboard.year_range, &state.dashboard.selected_codes());
    let Some([lo, hi]) = view.y_bounds else {
        draw_empty(f, "Line chart", area);
        return;
    };
    let pad = ((hi - lo) * 0.05).max(0.01);

    let datasets: Vec<Dataset> = view
        .lines
        .iter()
        .map(|line| {
            let color = countries::find_country(&line.code).map(|c| c.color).unwrap_or(Color::White);
            Dataset::default()
                .name(countries::label(&line.code).to_string())
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(color))
                .data(&line.points)
        })
        .collect();

    let [x0, x1] = view.x_bounds;
    let chart = Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title("Line chart"))
        .x_axis(
            Axis::default()
                .title("Year")
                .bounds([x0, x1.max(x0 + 1.0)])
                .labels(vec![format!("{}", x0), format!("{}", x1)]),
        )
        .y_axis(
            Axis::default()
                .bounds([lo - pad, hi + pad])
                .labels(vec![format_compact(lo), format_compact((lo + hi) / 2.0), format_compact(hi)]),
        );
    f.render_widget(chart, area);
}

fn draw_bars(f: &mut Frame, state: &AppState, area: Rect) {
    if draw_load_state(f, &state.selection, "Bar chart", area) {
        return;
    }
    let Load::Ready(series) = &state.selection else {
        return;
    };
    let year = state.dashboard.selected_year;
    let bars = views::build_bars(series, year, &state.dashboard.selected_codes());
    if bars.iter().all(|b| b.value.is_none()) {
        draw_empty(f, "Bar chart", area);
        return;
    }

    // BarChart wants u64; scale so the largest bar has three significant digits.
    let max = bars.iter().filter_map(|b| b.value).fold(0.0_f64, |m, v| m.max(v.abs()));
    let scale = if max > 0.0 { 1000.0 / max } else { 1.0 };

    let widget_bars: Vec<Bar> = bars
        .iter()
        .map(|b| {
            let color = countries::find_country(&b.code).map(|c| c.color).unwrap_or(Color::White);
            Bar::default()
                .value(b.value.map(|v| (v.max(0.0) * scale).round() as u64).unwrap_or(0))
                .text_value(format_compact_opt(b.value))
                .label(TextLine::from(b.code.clone()))
                .style(Style::default().fg(color))
        })
        .collect();

    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(format!("Bar chart, {}", year)))
        .bar_width(7)
        .bar_gap(2)
        .data(BarGroup::default().bars(&widget_bars));
    f.render_widget(chart, area);
}

fn draw_map(f: &mut Frame, state: &AppState, area: Rect) {
    if draw_load_state(f, &state.table, "Map", area) {
        return;
    }
    let Load::Ready(series) = &state.table else {
        return;
    };
    let year = state.dashboard.selected_year;
    let legend = views::build_choropleth(series, year);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(30), Constraint::Length(26)])
        .split(area);

    let title = format!("Map, {}", year);
    match &state.map {
        Some(map) => map.render(f, cols[0], &title, &legend),
        None => map_draw::render_markers(f, cols[0], &title, &legend),
    }

    let mut lines: Vec<TextLine> = Vec::new();
    if let Some([lo, hi]) = legend.bounds {
        let step = (hi - lo) / CLASS_COLORS.len() as f64;
        for (i, color) in CLASS_COLORS.iter().enumerate() {
            let from = lo + step * i as f64;
            lines.push(TextLine::from(vec![
                Span::styled("██ ", Style::default().fg(*color)),
                Span::raw(format!("{} – {}", format_compact(from), format_compact(from + step))),
            ]));
        }
    }
    lines.push(TextLine::from(vec![
        Span::styled("██ ", Style::default().fg(map_draw::NO_DATA_COLOR)),
        Span::raw("no data"),
    ]));
    lines.push(TextLine::from(""));
    for entry in &legend.entries {
        lines.push(TextLine::from(vec![
            Span::styled(format!("{:<12}", countries::label(&entry.code)), Style::default().fg(class_color(entry.class))),
            Span::raw(format_compact_opt(entry.value)),
        ]));
    }
    let legend_widget = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Legend"));
    f.render_widget(legend_widget, cols[1]);
}

fn draw_scatter(f: &mut Frame, state: &AppState, area: Rect) {
    if draw_load_state(f, &state.scatter, "Scatter", area) {
        return;
    }
    let Load::Ready(records) = &state.scatter else {
        return;
    };
    let points = views::scatter_points(records);
    if points.is_empty() {
        draw_empty(f, "Scatter", area);
        return;
    }

    let bounds = |vals: Vec<f64>| {
        let lo = vals.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = vals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let pad = ((hi - lo) * 0.1).max(hi.abs() * 0.05).max(1.0);
        [lo - pad, hi + pad]
    };
    let x_bounds = bounds(points.iter().map(|p| p.x).collect());
    let y_bounds = bounds(points.iter().map(|p| p.y).collect());
    let max_radius = (x_bounds[1] - x_bounds[0]) * 0.04;

    let title = format!(
        "Scatter {}: x = GDP per capita ({}–{}), y = exports % GDP ({}–{}), size = population",
        state.dashboard.selected_year,
        format_compact(x_bounds[0]),
        format_compact(x_bounds[1]),
        format_compact(y_bounds[0]),
        format_compact(y_bounds[1]),
    );
    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .marker(Marker::Braille)
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(|ctx| {
            for p in &points {
                let color = countries::find_country(&p.code).map(|c| c.color).unwrap_or(Color::White);
                let radius = (max_radius * p.size.sqrt()).max(max_radius * 0.15);
                ctx.draw(&Circle { x: p.x, y: p.y, radius, color });
                ctx.print(p.x, p.y, TextLine::from(p.code.clone()));
            }
        });
    f.render_widget(canvas, area);
}

fn draw_footer(f: &mut Frame, state: &AppState, area: Rect) {
    let title = match state.input_mode {
        InputMode::Search => format!("Search: {}_", state.dashboard.search),
        InputMode::Normal => "Keys".to_string(),
    };
    let p = Paragraph::new(state.status.as_str())
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: true });
    f.render_widget(p, area);
}
