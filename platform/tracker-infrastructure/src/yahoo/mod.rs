mod parse;

pub use parse::{parse_chart_response, parse_profile_response};

use crate::http::{build_client, get_text, HttpSettings};
use chrono::NaiveDate;
use parking_lot::Mutex;
use reqwest::blocking::Client;
use tracker_domain::repositories::market_data::MarketDataRepository;
use tracker_domain::services::period_resolver::{resolve, HistoryRequest};
use tracker_domain::value_objects::price::PriceSeries;
use tracker_domain::value_objects::profile::TickerProfile;
use tracker_domain::value_objects::ticker::TickerSymbol;
use tracker_domain::value_objects::window::HistoryWindow;
use url::Url;

pub const DEFAULT_COOKIE_URL: &str = "https://fc.yahoo.com";

#[derive(Debug, Clone)]
pub struct YahooSettings {
    pub chart_base_url: String,
    pub summary_base_url: String,
    /// Visited once to obtain session cookies before asking for a crumb. `None` skips it.
    pub cookie_url: Option<String>,
    pub http: HttpSettings,
}

/// Yahoo Finance adapter: `v8/finance/chart` for history, `v10/finance/quoteSummary`
/// for the profile header.
///
/// quoteSummary requires a session crumb; it is fetched lazily, cached, and
/// refreshed once when the provider rejects it.
pub struct YahooClient {
    settings: YahooSettings,
    client: Client,
    crumb: Mutex<Option<String>>,
}

impl YahooClient {
    pub fn new(settings: YahooSettings) -> Result<Self, String> {
        for base in [&settings.chart_base_url, &settings.summary_base_url] {
            Url::parse(base).map_err(|err| format!("invalid provider url {base}: {err}"))?;
        }
        let client = build_client(&settings.http)?;
        Ok(Self {
            settings,
            client,
            crumb: Mutex::new(None),
        })
    }

    pub fn chart_url(&self, request: &HistoryRequest) -> Result<String, String> {
        let mut url = endpoint_url(
            &self.settings.chart_base_url,
            &["v8", "finance", "chart", request.symbol.as_str()],
        )?;
        {
            let mut query = url.query_pairs_mut();
            match request.window {
                HistoryWindow::Period { period } => {
                    query.append_pair("range", resolve(period).code);
                }
                HistoryWindow::Range { start, end } => {
                    query.append_pair("period1", &day_start_epoch(start).to_string());
                    query.append_pair("period2", &day_start_epoch(end).to_string());
                }
            }
            if let Some(interval) = request.interval {
                query.append_pair("interval", interval.code());
            }
            query.append_pair("includePrePost", "false");
        }
        Ok(url.to_string())
    }

    fn summary_url(&self, symbol: &TickerSymbol, crumb: &str) -> Result<String, String> {
        let mut url = endpoint_url(
            &self.settings.summary_base_url,
            &["v10", "finance", "quoteSummary", symbol.as_str()],
        )?;
        url.query_pairs_mut()
            .append_pair("modules", "price,assetProfile")
            .append_pair("crumb", crumb);
        Ok(url.to_string())
    }

    fn crumb(&self) -> Result<String, String> {
        if let Some(crumb) = self.crumb.lock().clone() {
            return Ok(crumb);
        }
        if let Some(cookie_url) = &self.settings.cookie_url {
            // The response is usually a 404; only the Set-Cookie matters.
            if let Err(err) = self.client.get(cookie_url).send() {
                tracing::debug!(error = %err, "cookie bootstrap request failed");
            }
        }
        let url = endpoint_url(&self.settings.chart_base_url, &["v1", "test", "getcrumb"])?;
        let body = get_text(&self.client, "getcrumb", url.as_str(), self.settings.http.retries)?;
        let crumb = body.trim();
        if crumb.is_empty() || crumb.len() > 100 || crumb.contains(' ') || crumb.contains('<') {
            return Err("failed to obtain Yahoo crumb: unexpected response".to_string());
        }
        tracing::debug!("obtained Yahoo crumb");
        *self.crumb.lock() = Some(crumb.to_string());
        Ok(crumb.to_string())
    }

    fn invalidate_crumb(&self) {
        *self.crumb.lock() = None;
    }
}

impl MarketDataRepository for YahooClient {
    fn load_history(&self, request: &HistoryRequest) -> Result<PriceSeries, String> {
        let _span = tracing::info_span!(
            "infra.yahoo.history",
            symbol = %request.symbol,
            window = %request.window
        )
        .entered();
        let url = self.chart_url(request)?;
        let body = get_text(&self.client, "chart", &url, self.settings.http.retries)?;
        let series = parse_chart_response(&request.symbol, &body)?;
        tracing::debug!(rows = series.len(), "chart parsed");
        Ok(series)
    }

    fn load_profile(&self, symbol: &TickerSymbol) -> Result<TickerProfile, String> {
        let _span = tracing::info_span!("infra.yahoo.profile", symbol = %symbol).entered();
        let mut refreshed = false;
        loop {
            let crumb = self.crumb()?;
            let url = self.summary_url(symbol, &crumb)?;
            match get_text(&self.client, "quoteSummary", &url, self.settings.http.retries) {
                Ok(body) => return parse_profile_response(symbol, &body),
                Err(err) if err.is_unauthorized() && !refreshed => {
                    tracing::debug!(error = %err, "crumb rejected, refreshing");
                    self.invalidate_crumb();
                    refreshed = true;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

fn endpoint_url(base: &str, segments: &[&str]) -> Result<Url, String> {
    let mut url = Url::parse(base).map_err(|err| format!("invalid provider url {base}: {err}"))?;
    url.path_segments_mut()
        .map_err(|_| format!("provider url cannot be a base: {base}"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn day_start_epoch(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}
