use std::collections::HashMap;
use std::path::PathBuf;

use crossterm::event::KeyCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    countries::{self, Indicator, SCATTER_AXES},
    data::DataDir,
    export,
    fetch::{Fetcher, IndicatorSource, Job, Reply, RequestKey, Slot, YearSpan},
    map_draw::MapView,
    series::{build_series, join_indicators, normalize, EntityKey, JoinedRecord, Series, SortKey, SortState, YearWindow},
    views,
};

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tab {
    #[default]
    Table,
    Line,
    Bar,
    Map,
    Scatter,
}

impl Tab {
    pub const ALL: [Tab; 5] = [Tab::Table, Tab::Line, Tab::Bar, Tab::Map, Tab::Scatter];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Table => "Table",
            Tab::Line => "Line chart",
            Tab::Bar => "Bar chart",
            Tab::Map => "Map",
            Tab::Scatter => "Scatter",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    fn offset(self, by: isize) -> Tab {
        let n = Self::ALL.len() as isize;
        Self::ALL[(self.index() as isize + by).rem_euclid(n) as usize]
    }

    /// The map and the table always show every country.
    pub fn uses_country_selection(self) -> bool {
        matches!(self, Tab::Line | Tab::Bar | Tab::Scatter)
    }
}

/// Everything the user has chosen. Views only ever read it; changes go
/// through [`DashboardState::apply`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardState {
    pub tab: Tab,
    /// Registry order, no duplicates.
    pub selected_countries: Vec<String>,
    pub selected_year: i32,
    pub indicator: String,
    pub year_range: YearWindow,
    pub search: String,
    pub sort: SortState,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    SetTab(Tab),
    NextTab,
    PrevTab,
    ToggleCountry(String),
    SelectAllCountries,
    ClearCountries,
    ShiftYear(i32),
    SetIndicator(String),
    NextIndicator,
    SetYearRange(YearWindow),
    ShiftRangeStart(i32),
    ShiftRangeEnd(i32),
    SetSearch(String),
    SortBy(SortKey),
    Refresh,
}

/// Which fetches an intent invalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Refetch {
    pub table: bool,
    pub selection: bool,
    pub scatter: bool,
    /// Bypass the response cache.
    pub refresh: bool,
}

impl Refetch {
    const ALL: Refetch = Refetch { table: true, selection: true, scatter: true, refresh: false };

    pub fn any(&self) -> bool {
        self.table || self.selection || self.scatter
    }
}

impl DashboardState {
    pub fn new(config: &Config) -> Self {
        let domain = config.domain();
        Self {
            tab: Tab::Table,
            selected_countries: countries::all_codes().into_iter().map(String::from).collect(),
            selected_year: config.dashboard.default_year,
            indicator: config.dashboard.default_indicator.clone(),
            year_range: domain,
            search: String::new(),
            sort: SortState::default(),
        }
    }

    pub fn selected_codes(&self) -> Vec<&str> {
        self.selected_countries.iter().map(String::as_str).collect()
    }

    /// Applies `intent` within `domain`, returning the fetches it makes
    /// stale.
    pub fn apply(&mut self, intent: Intent, domain: YearWindow, indicators: &[Indicator]) -> Refetch {
        match intent {
            Intent::SetTab(tab) => self.tab = tab,
            Intent::NextTab => self.tab = self.tab.offset(1),
            Intent::PrevTab => self.tab = self.tab.offset(-1),
            Intent::ToggleCountry(code) => {
                if countries::find_country(&code).is_none() {
                    return Refetch::default();
                }
                if self.selected_countries.contains(&code) {
                    self.selected_countries.retain(|c| *c != code);
                } else {
                    self.selected_countries.push(code);
                    let order = countries::all_codes();
                    self.selected_countries
                        .sort_by_key(|c| order.iter().position(|o| *o == c.as_str()).unwrap_or(usize::MAX));
                }
                return Refetch { selection: true, scatter: true, ..Refetch::default() };
            }
            Intent::SelectAllCountries => {
                self.selected_countries = countries::all_codes().into_iter().map(String::from).collect();
                return Refetch { selection: true, scatter: true, ..Refetch::default() };
            }
            Intent::ClearCountries => {
                self.selected_countries.clear();
                return Refetch { selection: true, scatter: true, ..Refetch::default() };
            }
            Intent::ShiftYear(by) => {
                let year = (self.selected_year + by).clamp(domain.start, domain.end);
                if year != self.selected_year {
                    self.selected_year = year;
                    return Refetch { scatter: true, ..Refetch::default() };
                }
            }
            Intent::SetIndicator(code) => {
                if code != self.indicator && indicators.iter().any(|i| i.code == code) {
                    self.indicator = code;
                    return Refetch { table: true, selection: true, ..Refetch::default() };
                }
            }
            Intent::NextIndicator => {
                if let Some(pos) = indicators.iter().position(|i| i.code == self.indicator) {
                    let next = &indicators[(pos + 1) % indicators.len()];
                    return self.apply(Intent::SetIndicator(next.code.clone()), domain, indicators);
                }
                if let Some(first) = indicators.first() {
                    return self.apply(Intent::SetIndicator(first.code.clone()), domain, indicators);
                }
            }
            Intent::SetYearRange(window) => {
                self.year_range = clamp_window(window, domain);
                self.keep_sort_visible();
            }
            Intent::ShiftRangeStart(by) => {
                let start = (self.year_range.start + by).min(self.year_range.end);
                self.year_range = clamp_window(YearWindow::new(start, self.year_range.end), domain);
                self.keep_sort_visible();
            }
            Intent::ShiftRangeEnd(by) => {
                let end = (self.year_range.end + by).max(self.year_range.start);
                self.year_range = clamp_window(YearWindow::new(self.year_range.start, end), domain);
                self.keep_sort_visible();
            }
            Intent::SetSearch(term) => self.search = term,
            Intent::SortBy(key) => {
                let key = self.visible_key(key);
                self.sort.select(key);
            }
            Intent::Refresh => return Refetch { refresh: true, ..Refetch::ALL },
        }
        Refetch::default()
    }
}

impl DashboardState {
    /// Year columns outside the table window are not shown, so a year key
    /// is pulled onto the nearest visible column.
    fn visible_key(&self, key: SortKey) -> SortKey {
        match key {
            SortKey::Year(year) => SortKey::Year(year.clamp(self.year_range.start, self.year_range.end)),
            other => other,
        }
    }

    fn keep_sort_visible(&mut self) {
        self.sort.key = self.visible_key(self.sort.key);
    }
}

/// Clamps into `domain` and restores `start <= end`.
fn clamp_window(window: YearWindow, domain: YearWindow) -> YearWindow {
    let start = window.start.clamp(domain.start, domain.end);
    let end = window.end.clamp(domain.start, domain.end);
    YearWindow::new(start.min(end), start.max(end))
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

/// Load state of one view's data.
#[derive(Debug, Clone, PartialEq)]
pub enum Load<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
}

pub struct AppState {
    pub config: Config,
    pub dashboard: DashboardState,
    pub table: Load<Series>,
    pub selection: Load<Series>,
    pub scatter: Load<Vec<JoinedRecord>>,
    pub map: Option<MapView>,
    /// Cursor in the country selector.
    pub cursor: usize,
    pub input_mode: InputMode,
    pub status: String,
    fetcher: Fetcher,
    generations: HashMap<Slot, u64>,
}

impl AppState {
    const HELP_TEXT: &'static str = "\
Tab/1-5: view  i: indicator  ←/→: year  [ ]: range start  { }: range end
↑/↓ space: countries  a/x: all/none  c y v n m g: sort  /: search  e: export  r: refresh  q: quit";

    pub fn new(config: Config, source: Box<dyn IndicatorSource>) -> Self {
        let data = DataDir::new(&config.paths.data_dir);
        let map = match data.load_boundaries() {
            Ok(Some(raw)) => match MapView::new(raw) {
                Ok(view) => {
                    info!(features = view.feature_count(), "boundaries loaded");
                    Some(view)
                }
                Err(e) => {
                    warn!(error = %e, "boundaries unusable, falling back to markers");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "cannot load boundaries");
                None
            }
        };

        Self {
            dashboard: DashboardState::new(&config),
            config,
            table: Load::Idle,
            selection: Load::Idle,
            scatter: Load::Idle,
            map,
            cursor: 0,
            input_mode: InputMode::Normal,
            status: Self::HELP_TEXT.to_string(),
            fetcher: Fetcher::new(source),
            generations: HashMap::new(),
        }
    }

    pub fn indicator(&self) -> Option<&Indicator> {
        self.config.find_indicator(&self.dashboard.indicator)
    }

    /// Issues every fetch; called once at startup.
    pub fn start(&mut self) {
        self.issue(Refetch::ALL);
    }

    pub fn dispatch(&mut self, intent: Intent) {
        debug!(?intent, "dispatch");
        let domain = self.config.domain();
        let refetch = self.dashboard.apply(intent, domain, &self.config.indicators);
        if refetch.any() {
            self.issue(refetch);
        }
    }

    fn next_generation(&mut self, slot: Slot) -> u64 {
        let generation = self.generations.entry(slot).or_insert(0);
        *generation += 1;
        *generation
    }

    fn issue(&mut self, refetch: Refetch) {
        let domain = self.config.domain();
        let refresh = refetch.refresh;

        if refetch.table {
            let generation = self.next_generation(Slot::Table);
            let key = RequestKey::new(&self.dashboard.indicator, &countries::all_codes(), YearSpan::Range(domain));
            self.table = Load::Loading;
            self.fetcher.submit(Job::Series { slot: Slot::Table, generation, key, refresh });
        }

        if refetch.selection {
            let generation = self.next_generation(Slot::Selection);
            if self.dashboard.selected_countries.is_empty() {
                self.selection = Load::Ready(Series::empty());
            } else {
                let key = RequestKey::new(&self.dashboard.indicator, &self.dashboard.selected_codes(), YearSpan::Range(domain));
                self.selection = Load::Loading;
                self.fetcher.submit(Job::Series { slot: Slot::Selection, generation, key, refresh });
            }
        }

        if refetch.scatter {
            let generation = self.next_generation(Slot::Scatter);
            if self.dashboard.selected_countries.is_empty() {
                self.scatter = Load::Ready(Vec::new());
            } else {
                let codes = self.dashboard.selected_codes();
                let span = YearSpan::Single(self.dashboard.selected_year);
                let keys = SCATTER_AXES.map(|code| RequestKey::new(code, &codes, span));
                self.scatter = Load::Loading;
                self.fetcher.submit(Job::Joined { slot: Slot::Scatter, generation, keys, refresh });
            }
        }
    }

    /// Drains finished fetches. Replies older than the latest request for
    /// their slot are dropped.
    pub fn poll_replies(&mut self) {
        while let Some(reply) = self.fetcher.try_recv() {
            self.accept(reply);
        }
    }

    fn accept(&mut self, reply: Reply) {
        let latest = self.generations.get(&reply.slot()).copied().unwrap_or(0);
        if reply.generation() != latest {
            debug!(slot = ?reply.slot(), generation = reply.generation(), latest, "stale reply dropped");
            return;
        }

        let domain = self.config.domain();
        match reply {
            Reply::Series { slot: Slot::Table, result, .. } => {
                self.table = match result {
                    Ok(payload) => {
                        let obs = normalize(&payload, EntityKey::Code);
                        Load::Ready(build_series(&obs, &countries::all_codes(), domain))
                    }
                    Err(e) => Load::Failed(e.to_string()),
                };
            }
            Reply::Series { slot: _, result, .. } => {
                self.selection = match result {
                    Ok(payload) => {
                        let obs = normalize(&payload, EntityKey::Code);
                        Load::Ready(build_series(&obs, &self.dashboard.selected_codes(), domain))
                    }
                    Err(e) => Load::Failed(e.to_string()),
                };
            }
            Reply::Joined { result, .. } => {
                self.scatter = match result {
                    Ok([x, y, z]) => {
                        let year = self.dashboard.selected_year;
                        let codes = self.dashboard.selected_codes();
                        let window = YearWindow::new(year, year);
                        let build = |payload: &serde_json::Value| build_series(&normalize(payload, EntityKey::Code), &codes, window);
                        Load::Ready(join_indicators(&build(&x), &build(&y), &build(&z), year))
                    }
                    Err(e) => Load::Failed(e.to_string()),
                };
            }
        }
    }

    /// Table as currently shown.
    pub fn table_view(&self) -> Option<views::TableView> {
        match &self.table {
            Load::Ready(series) => Some(views::build_table(
                series,
                self.dashboard.year_range,
                self.config.dashboard.change,
                &self.dashboard.search,
                self.dashboard.sort,
            )),
            _ => None,
        }
    }

    fn export(&mut self) {
        let Some(view) = self.table_view() else {
            self.status = "Nothing to export yet".to_string();
            return;
        };
        let Some(indicator) = self.indicator().cloned() else {
            return;
        };
        let doc = export::ExportDocument::new(indicator, self.config.dashboard.change, &self.dashboard, view.rows);
        let path: PathBuf = self.config.paths.export_dir.join(export::EXPORT_FILE_NAME);
        self.status = match export::write_json(&path, &doc) {
            Ok(()) => format!("Exported {} rows to {}", doc.rows.len(), path.display()),
            Err(e) => format!("Export failed: {}", e),
        };
    }

    /// Returns true when the user asked to quit.
    pub fn handle_input(&mut self, key: KeyCode) -> bool {
        if self.input_mode == InputMode::Search {
            self.handle_search_input(key);
            return false;
        }

        let n = countries::COUNTRIES.len();
        match key {
            KeyCode::Char('q') => return true,
            KeyCode::Tab => self.dispatch(Intent::NextTab),
            KeyCode::BackTab => self.dispatch(Intent::PrevTab),
            KeyCode::Char(c @ '1'..='5') => {
                let idx = c as usize - '1' as usize;
                self.dispatch(Intent::SetTab(Tab::ALL[idx]));
            }
            KeyCode::Char('i') => self.dispatch(Intent::NextIndicator),
            KeyCode::Left => self.dispatch(Intent::ShiftYear(-1)),
            KeyCode::Right => self.dispatch(Intent::ShiftYear(1)),
            KeyCode::Char('[') => self.dispatch(Intent::ShiftRangeStart(-1)),
            KeyCode::Char(']') => self.dispatch(Intent::ShiftRangeStart(1)),
            KeyCode::Char('{') => self.dispatch(Intent::ShiftRangeEnd(-1)),
            KeyCode::Char('}') => self.dispatch(Intent::ShiftRangeEnd(1)),
            KeyCode::Up => if self.cursor > 0 { self.cursor -= 1 },
            KeyCode::Down => if self.cursor + 1 < n { self.cursor += 1 },
            KeyCode::Char(' ') => {
                let code = countries::COUNTRIES[self.cursor.min(n - 1)].code.to_string();
                self.dispatch(Intent::ToggleCountry(code));
            }
            KeyCode::Char('a') => self.dispatch(Intent::SelectAllCountries),
            KeyCode::Char('x') => self.dispatch(Intent::ClearCountries),
            // Table sort; pressing the same key again flips the direction.
            KeyCode::Char('c') => self.dispatch(Intent::SortBy(SortKey::Country)),
            KeyCode::Char('y') => self.dispatch(Intent::SortBy(SortKey::Year(self.dashboard.selected_year))),
            KeyCode::Char('v') => self.dispatch(Intent::SortBy(SortKey::Average)),
            KeyCode::Char('n') => self.dispatch(Intent::SortBy(SortKey::Minimum)),
            KeyCode::Char('m') => self.dispatch(Intent::SortBy(SortKey::Maximum)),
            KeyCode::Char('g') => self.dispatch(Intent::SortBy(SortKey::Change)),
            KeyCode::Char('/') => {
                self.input_mode = InputMode::Search;
                self.status = "Search: type a country name, Enter to keep, Esc to clear".to_string();
            }
            KeyCode::Char('e') => self.export(),
            KeyCode::Char('r') => self.dispatch(Intent::Refresh),
            KeyCode::Esc => self.status = Self::HELP_TEXT.to_string(),
            _ => {}
        }
        false
    }

    fn handle_search_input(&mut self, key: KeyCode) {
        let mut term = self.dashboard.search.clone();
        match key {
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                self.status = Self::HELP_TEXT.to_string();
                return;
            }
            KeyCode::Esc => {
                term.clear();
                self.input_mode = InputMode::Normal;
                self.status = Self::HELP_TEXT.to_string();
            }
            KeyCode::Backspace => {
                term.pop();
            }
            KeyCode::Char(c) => term.push(c),
            _ => return,
        }
        self.dispatch(Intent::SetSearch(term));
    }
}
