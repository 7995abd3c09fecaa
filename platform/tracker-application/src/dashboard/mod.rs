use serde::Serialize;
use std::time::Instant;
use tracker_domain::repositories::market_data::MarketDataRepository;
use tracker_domain::services::chart::{build_chart, ChartView};
use tracker_domain::services::period_resolver::{resolve_request, HistoryRequest};
use tracker_domain::services::table::{format_table, FormatOptions, TableView};
use tracker_domain::value_objects::price::PriceSeries;
use tracker_domain::value_objects::profile::TickerProfile;
use tracker_domain::value_objects::ticker::TickerSymbol;
use tracker_domain::value_objects::warning::DashboardWarning;
use tracker_domain::value_objects::window::HistoryWindow;

/// One user selection: a ticker plus the window to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardRequest {
    pub symbol: TickerSymbol,
    pub window: HistoryWindow,
}

impl DashboardRequest {
    pub fn new(symbol: TickerSymbol, window: impl Into<HistoryWindow>) -> Self {
        Self {
            symbol,
            window: window.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardOptions {
    pub load_profile: bool,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self { load_profile: true }
    }
}

/// Everything one fetch-format-render pass produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub request: HistoryRequest,
    /// `None` when the header is skipped.
    pub profile: Option<TickerProfile>,
    pub table: TableView,
    pub chart: ChartView,
    pub warnings: Vec<DashboardWarning>,
    /// Records returned by the provider, before zero-volume filtering.
    pub fetched_rows: usize,
    pub elapsed_ms: u64,
}

impl DashboardSnapshot {
    pub fn symbol(&self) -> &TickerSymbol {
        &self.request.symbol
    }

    pub fn has_data(&self) -> bool {
        !self.table.is_no_data()
    }
}

/// Runs one pass end to end. Provider failures become warnings; this never fails.
pub fn load_dashboard(
    repo: &dyn MarketDataRepository,
    request: &DashboardRequest,
    options: DashboardOptions,
) -> DashboardSnapshot {
    let span = tracing::info_span!(
        "app.dashboard.load",
        symbol = %request.symbol,
        window = %request.window
    );
    let _enter = span.enter();
    let start = Instant::now();

    let history_request = resolve_request(request.symbol.clone(), request.window);
    let mut warnings = Vec::new();

    let profile = if options.load_profile {
        lookup_profile(repo, &request.symbol, &mut warnings)
    } else {
        None
    };

    let series = fetch_history(repo, &history_request, &mut warnings);
    let fetched_rows = series.len();

    let format_options = FormatOptions::for_window(&request.window);
    let table = format_table(&series, &format_options);
    let chart = build_chart(&series, &request.window);
    if let TableView::Rows(formatted) = &table {
        if formatted.dropped_zero_volume > 0 {
            metrics::counter!("tracker.table.dropped_zero_volume")
                .increment(formatted.dropped_zero_volume as u64);
        }
    }
    if table.is_no_data() && fetched_rows > 0 {
        warnings.push(DashboardWarning::HistoryFetch(format!(
            "all {fetched_rows} rows had zero volume"
        )));
    }

    let elapsed_ms = start.elapsed().as_millis() as u64;
    metrics::histogram!("tracker.dashboard.load_ms").record(elapsed_ms as f64);
    tracing::info!(
        interval = history_request.interval.map(|i| i.code()).unwrap_or("default"),
        fetched_rows,
        rows = table.rows().len(),
        warnings = warnings.len(),
        elapsed_ms,
        "dashboard loaded"
    );

    DashboardSnapshot {
        request: history_request,
        profile,
        table,
        chart,
        warnings,
        fetched_rows,
        elapsed_ms,
    }
}

fn lookup_profile(
    repo: &dyn MarketDataRepository,
    symbol: &TickerSymbol,
    warnings: &mut Vec<DashboardWarning>,
) -> Option<TickerProfile> {
    let problem = match repo.load_profile(symbol) {
        Ok(profile) => match profile.missing_field() {
            None => return Some(profile),
            Some(field) => format!("missing {field} for {symbol}"),
        },
        Err(err) => err,
    };
    metrics::counter!("tracker.profile.failures").increment(1);
    tracing::warn!(error = %problem, "skipping ticker header");
    warnings.push(DashboardWarning::MetadataLookup(problem));
    None
}

fn fetch_history(
    repo: &dyn MarketDataRepository,
    request: &HistoryRequest,
    warnings: &mut Vec<DashboardWarning>,
) -> PriceSeries {
    metrics::counter!("tracker.history.requests").increment(1);
    match repo.load_history(request) {
        Ok(series) if series.is_empty() => {
            warnings.push(DashboardWarning::HistoryFetch(
                "no historical data available".to_string(),
            ));
            series
        }
        Ok(series) => series,
        Err(err) => {
            metrics::counter!("tracker.history.failures").increment(1);
            tracing::warn!(error = %err, "history fetch failed");
            warnings.push(DashboardWarning::HistoryFetch(err));
            PriceSeries::empty(request.symbol.clone())
        }
    }
}
