use crate::logging::SharedLogBuffer;
use crate::tasks::{TaskEvent, TaskRunner};
use crossterm::event::{Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracker_application::dashboard::{DashboardRequest, DashboardSnapshot};
use tracker_domain::services::catalog::TickerCatalog;
use tracker_domain::value_objects::period::Period;
use tracker_domain::value_objects::ticker::TickerSymbol;
use tracker_domain::value_objects::warning::DashboardWarning;
use tracker_domain::value_objects::window::HistoryWindow;

const PAGE: usize = 10;

#[derive(Debug, Clone, Default)]
pub struct TextInput {
    pub value: String,
    pub cursor: usize,
}

impl TextInput {
    pub fn insert_char(&mut self, ch: char) {
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    pub fn backspace(&mut self) {
        let Some(prev) = self.value[..self.cursor].chars().next_back() else {
            return;
        };
        self.cursor -= prev.len_utf8();
        self.value.remove(self.cursor);
    }

    pub fn delete(&mut self) {
        if self.cursor >= self.value.len() {
            return;
        }
        self.value.remove(self.cursor);
    }

    pub fn move_left(&mut self) {
        if let Some(prev) = self.value[..self.cursor].chars().next_back() {
            self.cursor -= prev.len_utf8();
        }
    }

    pub fn move_right(&mut self) {
        if let Some(next) = self.value[self.cursor..].chars().next() {
            self.cursor += next.len_utf8();
        }
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Tickers,
    /// Typing edits the ticker filter.
    Filter,
    Table,
    Logs,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Self::Tickers | Self::Filter => Self::Table,
            Self::Table => Self::Logs,
            Self::Logs => Self::Tickers,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Tickers | Self::Filter => Self::Logs,
            Self::Table => Self::Tickers,
            Self::Logs => Self::Table,
        }
    }
}

pub struct App {
    pub logs: SharedLogBuffer,
    pub log_scroll: usize,
    task_runner: TaskRunner,

    pub catalog: TickerCatalog,
    pub catalog_loading: bool,
    pub catalog_warning: Option<DashboardWarning>,
    pub filter: TextInput,
    /// Index into the filtered ticker list.
    pub selected: usize,
    pub focus: Focus,

    pub period: Period,
    /// Date range from the command line; cleared once the user picks a period.
    pub range: Option<HistoryWindow>,
    /// Symbol of the most recent load request.
    pub current: Option<TickerSymbol>,

    pub snapshot: Option<DashboardSnapshot>,
    pub table_scroll: usize,
    in_flight: Option<DashboardRequest>,
    pending: Option<DashboardRequest>,

    pub dirty: bool,
    spinner: usize,
    seen_logs: u64,
}

impl App {
    pub fn new(
        task_runner: TaskRunner,
        logs: SharedLogBuffer,
        initial_symbol: Option<TickerSymbol>,
        window: HistoryWindow,
    ) -> Self {
        let (period, range) = match window.as_period() {
            Some(period) => (period, None),
            None => (Period::default(), Some(window)),
        };
        Self {
            logs,
            log_scroll: 0,
            task_runner,
            catalog: TickerCatalog::default(),
            catalog_loading: false,
            catalog_warning: None,
            filter: TextInput::default(),
            selected: 0,
            focus: Focus::Tickers,
            period,
            range,
            current: initial_symbol,
            snapshot: None,
            table_scroll: 0,
            in_flight: None,
            pending: None,
            dirty: true,
            spinner: 0,
            seen_logs: 0,
        }
    }

    /// Kicks off the catalog load and, when a symbol was given up front, its dashboard.
    pub fn start(&mut self) {
        self.catalog_loading = true;
        self.task_runner.load_catalog();
        if let Some(symbol) = self.current.clone() {
            self.request_load(symbol);
        }
    }

    pub fn spawn_input_reader(&self, tx: tokio::sync::mpsc::UnboundedSender<TaskEvent>) {
        std::thread::spawn(move || {
            while let Ok(event) = crossterm::event::read() {
                if tx.send(TaskEvent::Input(event)).is_err() {
                    break;
                }
            }
        });
    }

    pub fn on_tick(&mut self) {
        if self.is_loading() {
            self.spinner = (self.spinner + 1) % 4;
            self.dirty = true;
        }
        let generation = self.logs.lock().generation();
        if generation != self.seen_logs {
            self.seen_logs = generation;
            self.dirty = true;
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some() || self.catalog_loading
    }

    pub fn spinner_char(&self) -> char {
        ['|', '/', '-', '\\'][self.spinner % 4]
    }

    pub fn window(&self) -> HistoryWindow {
        self.range
            .unwrap_or_else(|| HistoryWindow::period(self.period))
    }

    pub fn filtered(&self) -> Vec<&TickerSymbol> {
        self.catalog.filter(&self.filter.value)
    }

    pub fn selected_symbol(&self) -> Option<TickerSymbol> {
        self.filtered().get(self.selected).map(|s| (*s).clone())
    }

    pub fn in_flight(&self) -> Option<&DashboardRequest> {
        self.in_flight.as_ref()
    }

    pub fn pending(&self) -> Option<&DashboardRequest> {
        self.pending.as_ref()
    }

    pub fn on_event(&mut self, event: TaskEvent) -> Result<bool, String> {
        match event {
            TaskEvent::Input(ct) => self.on_input(ct),
            TaskEvent::CatalogLoaded { catalog, warning } => {
                self.on_catalog(catalog, warning);
                Ok(false)
            }
            TaskEvent::SnapshotReady(snapshot) => {
                self.on_snapshot(*snapshot);
                Ok(false)
            }
        }
    }

    fn on_catalog(&mut self, catalog: TickerCatalog, warning: Option<DashboardWarning>) {
        self.catalog_loading = false;
        self.catalog = catalog;
        self.catalog_warning = warning;
        self.selected = 0;
        match self.current.clone() {
            Some(symbol) => {
                let found = self.filtered().iter().position(|s| **s == symbol);
                self.selected = found.unwrap_or(0);
            }
            None => {
                if let Some(first) = self.selected_symbol() {
                    self.request_load(first);
                }
            }
        }
        self.dirty = true;
    }

    fn on_snapshot(&mut self, snapshot: DashboardSnapshot) {
        self.in_flight = None;
        self.snapshot = Some(snapshot);
        self.table_scroll = 0;
        if let Some(next) = self.pending.take() {
            self.start_load(next);
        }
        self.dirty = true;
    }

    /// Starts a load, or queues it behind the one in flight. Only the latest queued
    /// request survives.
    pub fn request_load(&mut self, symbol: TickerSymbol) {
        let request = DashboardRequest::new(symbol.clone(), self.window());
        self.current = Some(symbol);
        if self.in_flight.is_some() {
            tracing::debug!(symbol = %request.symbol, window = %request.window, "queued load");
            if self.pending.replace(request).is_some() {
                metrics::counter!("tracker.tui.superseded_requests").increment(1);
            }
        } else {
            self.start_load(request);
        }
        self.dirty = true;
    }

    fn start_load(&mut self, request: DashboardRequest) {
        tracing::info!(symbol = %request.symbol, window = %request.window, "loading dashboard");
        self.in_flight = Some(request.clone());
        self.task_runner.load_dashboard(request);
    }

    fn reload(&mut self) {
        if let Some(symbol) = self.current.clone() {
            self.request_load(symbol);
        }
    }

    fn change_period(&mut self, next: Period) {
        if next == self.period && self.range.is_none() {
            return;
        }
        self.period = next;
        self.range = None;
        self.reload();
        self.dirty = true;
    }

    fn on_input(&mut self, event: CtEvent) -> Result<bool, String> {
        match event {
            CtEvent::Key(key) if key.kind == KeyEventKind::Press => self.on_key(key),
            CtEvent::Resize(_, _) => {
                self.dirty = true;
                Ok(false)
            }
            _ => Ok(false),
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> Result<bool, String> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(true);
        }
        self.dirty = true;
        if self.focus == Focus::Filter {
            self.handle_filter_keys(key);
            return Ok(false);
        }

        match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char('/') => self.focus = Focus::Filter,
            KeyCode::Char('r') => self.reload(),
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.prev(),
            KeyCode::Left => self.change_period(self.period.prev()),
            KeyCode::Right => self.change_period(self.period.next()),
            KeyCode::Esc => {
                self.filter.clear();
                self.selected = 0;
            }
            KeyCode::Enter => self.load_selected(),
            KeyCode::Up => self.scroll_up(1),
            KeyCode::Down => self.scroll_down(1),
            KeyCode::PageUp => self.page(true),
            KeyCode::PageDown => self.page(false),
            _ => {}
        }
        Ok(false)
    }

    fn handle_filter_keys(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                self.focus = Focus::Tickers;
                self.load_selected();
            }
            KeyCode::Esc => self.focus = Focus::Tickers,
            KeyCode::Backspace => {
                self.filter.backspace();
                self.selected = 0;
            }
            KeyCode::Delete => {
                self.filter.delete();
                self.selected = 0;
            }
            KeyCode::Left => self.filter.move_left(),
            KeyCode::Right => self.filter.move_right(),
            KeyCode::Up => self.move_selection(false),
            KeyCode::Down => self.move_selection(true),
            KeyCode::Char(ch) if !ch.is_whitespace() => {
                self.filter.insert_char(ch.to_ascii_uppercase());
                self.selected = 0;
            }
            _ => {}
        }
    }

    fn load_selected(&mut self) {
        if let Some(symbol) = self.selected_symbol() {
            self.request_load(symbol);
        }
    }

    fn move_selection(&mut self, down: bool) {
        let len = self.filtered().len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        self.selected = if down {
            (self.selected + 1).min(len - 1)
        } else {
            self.selected.saturating_sub(1)
        };
    }

    fn table_rows(&self) -> usize {
        self.snapshot
            .as_ref()
            .map(|s| s.table.rows().len())
            .unwrap_or(0)
    }

    fn scroll_up(&mut self, by: usize) {
        match self.focus {
            Focus::Tickers | Focus::Filter => self.move_selection(false),
            Focus::Table => self.table_scroll = self.table_scroll.saturating_sub(by),
            Focus::Logs => {
                let max = self.logs.lock().len().saturating_sub(1);
                self.log_scroll = (self.log_scroll + by).min(max);
            }
        }
    }

    fn scroll_down(&mut self, by: usize) {
        match self.focus {
            Focus::Tickers | Focus::Filter => self.move_selection(true),
            Focus::Table => {
                let max = self.table_rows().saturating_sub(1);
                self.table_scroll = (self.table_scroll + by).min(max);
            }
            Focus::Logs => self.log_scroll = self.log_scroll.saturating_sub(by),
        }
    }

    fn page(&mut self, up: bool) {
        if self.focus == Focus::Tickers {
            // Paging from the list scrolls the table.
            let max = self.table_rows().saturating_sub(1);
            self.table_scroll = if up {
                self.table_scroll.saturating_sub(PAGE)
            } else {
                (self.table_scroll + PAGE).min(max)
            };
            return;
        }
        if up {
            self.scroll_up(PAGE);
        } else {
            self.scroll_down(PAGE);
        }
    }
}
