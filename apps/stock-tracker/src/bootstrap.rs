use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracker_application::config::{self, Config, ProviderConfig};
use tracker_domain::repositories::catalog::TickerCatalogSource;
use tracker_domain::repositories::market_data::MarketDataRepository;
use tracker_domain::value_objects::period::Period;
use tracker_domain::value_objects::ticker::TickerSymbol;
use tracker_domain::value_objects::window::HistoryWindow;
use tracker_infrastructure::catalog::{FileTickerCatalog, HttpTickerCatalog};
use tracker_infrastructure::http::HttpSettings;
use tracker_infrastructure::yahoo::{YahooClient, YahooSettings, DEFAULT_COOKIE_URL};

pub const CONFIG_ENV: &str = "STOCK_TRACKER_CONFIG";

pub type SharedMarketData = Arc<dyn MarketDataRepository + Send + Sync>;
pub type SharedCatalogSource = Arc<dyn TickerCatalogSource + Send + Sync>;

/// `--config` wins over the environment; no path means built-in defaults.
pub fn resolve_config_path(cli_path: Option<PathBuf>) -> Option<PathBuf> {
    cli_path.or_else(|| {
        std::env::var(CONFIG_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
    })
}

pub fn load_effective_config(path: Option<&Path>) -> Result<Config, String> {
    match path {
        Some(path) => {
            let config = config::load_config(path)?;
            tracing::info!(config = %path.display(), "config loaded");
            Ok(config)
        }
        None => Ok(Config::default()),
    }
}

pub fn http_settings(provider: &ProviderConfig) -> HttpSettings {
    HttpSettings {
        timeout_ms: provider.timeout_ms,
        retries: provider.retries,
        user_agent: provider.user_agent.clone(),
    }
}

pub fn build_market_data(config: &Config) -> Result<SharedMarketData, String> {
    let provider = &config.provider;
    let client = YahooClient::new(YahooSettings {
        chart_base_url: provider.chart_base_url.clone(),
        summary_base_url: provider.summary_base_url.clone(),
        cookie_url: Some(DEFAULT_COOKIE_URL.to_string()),
        http: http_settings(provider),
    })?;
    let repo: SharedMarketData = Arc::new(client);
    Ok(repo)
}

pub fn build_catalog_source(config: &Config) -> Result<SharedCatalogSource, String> {
    let source: SharedCatalogSource = match &config.catalog.path {
        Some(path) => Arc::new(FileTickerCatalog::new(path)),
        None => Arc::new(HttpTickerCatalog::new(
            config.catalog.url.clone(),
            &http_settings(&config.provider),
        )?),
    };
    Ok(source)
}

/// CLI window flags: `--start/--end` together select a date range, otherwise
/// `--period` (label or code) or the configured default.
pub fn resolve_window(
    period: Option<&str>,
    start: Option<&str>,
    end: Option<&str>,
    default_period: Period,
) -> Result<HistoryWindow, String> {
    match (start, end) {
        (Some(start), Some(end)) => {
            if period.is_some() {
                return Err("--period cannot be combined with --start/--end".to_string());
            }
            HistoryWindow::parse_range(start, end)
        }
        (None, None) => {
            let period = period.map(Period::parse).transpose()?;
            Ok(HistoryWindow::period(period.unwrap_or(default_period)))
        }
        _ => Err("--start and --end must be given together".to_string()),
    }
}

pub fn resolve_symbol(
    cli_symbol: Option<&str>,
    config: &Config,
) -> Result<Option<TickerSymbol>, String> {
    cli_symbol
        .or(config.dashboard.default_symbol.as_deref())
        .map(TickerSymbol::parse)
        .transpose()
}
