use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracker_domain::value_objects::period::Period;

pub const DEFAULT_CATALOG_URL: &str =
    "https://raw.githubusercontent.com/kevinchow999/Stock-Tracker/main/StockTickers.txt";
pub const DEFAULT_CHART_BASE_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_SUMMARY_BASE_URL: &str = "https://query2.finance.yahoo.com";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub provider: ProviderConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct CatalogConfig {
    pub url: String,
    /// Local file; takes precedence over `url` when set.
    pub path: Option<String>,
    /// Used when the catalog cannot be loaded or is empty.
    pub fallback: Vec<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_CATALOG_URL.to_string(),
            path: None,
            fallback: ["AAPL", "MSFT", "GOOGL", "AMZN", "TSLA"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct ProviderConfig {
    pub chart_base_url: String,
    pub summary_base_url: String,
    pub timeout_ms: u64,
    pub retries: u32,
    pub user_agent: String,
    /// Fetch name/summary for the header.
    pub load_profile: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            chart_base_url: DEFAULT_CHART_BASE_URL.to_string(),
            summary_base_url: DEFAULT_SUMMARY_BASE_URL.to_string(),
            timeout_ms: 10_000,
            retries: 1,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            load_profile: true,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct DashboardConfig {
    pub default_symbol: Option<String>,
    pub default_period: Period,
}

impl Config {
    pub fn validate(&self) -> Result<(), String> {
        if self.catalog.path.is_none() && self.catalog.url.trim().is_empty() {
            return Err("catalog.url must not be empty when catalog.path is unset".to_string());
        }
        if self.provider.timeout_ms == 0 {
            return Err("provider.timeout_ms must be > 0".to_string());
        }
        for (key, url) in [
            ("provider.chart_base_url", &self.provider.chart_base_url),
            ("provider.summary_base_url", &self.provider.summary_base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(format!("{key} must be an http(s) URL, got: {url}"));
            }
        }
        if let Some(symbol) = &self.dashboard.default_symbol {
            tracker_domain::value_objects::ticker::TickerSymbol::parse(symbol)
                .map_err(|err| format!("dashboard.default_symbol: {err}"))?;
        }
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config, String> {
    let (config, _source) = load_config_with_source(path)?;
    Ok(config)
}

pub fn load_config_with_source(path: &Path) -> Result<(Config, String), String> {
    let contents = fs::read_to_string(path)
        .map_err(|err| format!("failed to read config {}: {}", path.display(), err))?;
    let config = load_config_from_str(&contents)
        .map_err(|err| format!("invalid config {}: {}", path.display(), err))?;
    Ok((config, contents))
}

pub fn load_config_from_str(contents: &str) -> Result<Config, String> {
    let config: Config =
        toml::from_str(contents).map_err(|err| format!("failed to parse TOML: {err}"))?;
    config.validate()?;
    Ok(config)
}

pub fn to_toml_pretty(config: &Config) -> Result<String, String> {
    toml::to_string_pretty(config)
        .map_err(|err| format!("failed to serialize config as TOML: {err}"))
}
