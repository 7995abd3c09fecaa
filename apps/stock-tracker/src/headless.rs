use crate::bootstrap::{SharedCatalogSource, SharedMarketData};
use tracker_application::catalog::load_catalog_or_fallback;
use tracker_application::config::Config;
use tracker_application::dashboard::{load_dashboard, DashboardOptions, DashboardRequest};
use tracker_application::reporting::{snapshot_to_json, warning_to_json};
use tracker_domain::value_objects::ticker::TickerSymbol;
use tracker_domain::value_objects::window::HistoryWindow;

pub struct HeadlessArgs {
    pub symbol: Option<TickerSymbol>,
    pub window: HistoryWindow,
}

/// One fetch-format-render pass rendered as JSON. Missing data is reported through
/// `warnings`; only an unusable catalog with no symbol to fall back on is an error.
pub fn run_headless(
    config: &Config,
    market_data: SharedMarketData,
    catalog_source: SharedCatalogSource,
    args: HeadlessArgs,
) -> Result<serde_json::Value, String> {
    let (symbol, catalog_warning) = match args.symbol {
        Some(symbol) => (symbol, None),
        None => {
            let (catalog, warning) =
                load_catalog_or_fallback(catalog_source.as_ref(), &config.catalog);
            let first = catalog
                .symbols
                .first()
                .cloned()
                .ok_or_else(|| "no ticker available: pass --symbol".to_string())?;
            (first, warning)
        }
    };

    let request = DashboardRequest::new(symbol, args.window);
    let options = DashboardOptions {
        load_profile: config.provider.load_profile,
    };
    let snapshot = load_dashboard(market_data.as_ref(), &request, options);
    tracing::info!(
        symbol = %snapshot.symbol(),
        has_data = snapshot.has_data(),
        warnings = snapshot.warnings.len(),
        "headless pass complete"
    );

    let mut value = snapshot_to_json(&snapshot);
    if let Some(warning) = catalog_warning {
        if let Some(warnings) = value["warnings"].as_array_mut() {
            warnings.insert(0, warning_to_json(&warning));
        }
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::{run_headless, HeadlessArgs};
    use std::sync::Arc;
    use tracker_application::config::Config;
    use tracker_domain::repositories::catalog::TickerCatalogSource;
    use tracker_domain::repositories::market_data::MarketDataRepository;
    use tracker_domain::services::catalog::TickerCatalog;
    use tracker_domain::services::period_resolver::HistoryRequest;
    use tracker_domain::value_objects::period::Period;
    use tracker_domain::value_objects::price::{PriceRecord, PriceSeries};
    use tracker_domain::value_objects::profile::TickerProfile;
    use tracker_domain::value_objects::ticker::TickerSymbol;
    use tracker_domain::value_objects::window::HistoryWindow;

    struct OneBar;

    impl MarketDataRepository for OneBar {
        fn load_history(&self, request: &HistoryRequest) -> Result<PriceSeries, String> {
            Ok(PriceSeries::new(
                request.symbol.clone(),
                0,
                vec![PriceRecord {
                    timestamp: 1_704_205_800,
                    open: 1.0,
                    high: 2.0,
                    low: 0.5,
                    close: 1.5,
                    volume: 10.0,
                }],
            ))
        }

        fn load_profile(&self, _symbol: &TickerSymbol) -> Result<TickerProfile, String> {
            Ok(TickerProfile {
                long_name: Some("Example Corp".to_string()),
                summary: Some("Makes examples.".to_string()),
            })
        }
    }

    struct Unreachable;

    impl TickerCatalogSource for Unreachable {
        fn load_catalog(&self) -> Result<TickerCatalog, String> {
            Err("failed to fetch ticker catalog: connection refused".to_string())
        }

        fn describe(&self) -> String {
            "unreachable".to_string()
        }
    }

    #[test]
    fn falls_back_to_catalog_symbol_and_reports_the_warning() {
        let value = run_headless(
            &Config::default(),
            Arc::new(OneBar),
            Arc::new(Unreachable),
            HeadlessArgs {
                symbol: None,
                window: HistoryWindow::period(Period::OneYear),
            },
        )
        .expect("json");

        assert_eq!(value["symbol"], "AAPL");
        assert_eq!(value["warnings"][0]["kind"], "catalog");
        assert_eq!(value["table"]["rows"][0][0], "2024/01/02");
        assert_eq!(value["profile"]["long_name"], "Example Corp");
    }

    #[test]
    fn explicit_symbol_skips_the_catalog() {
        let value = run_headless(
            &Config::default(),
            Arc::new(OneBar),
            Arc::new(Unreachable),
            HeadlessArgs {
                symbol: Some(TickerSymbol::parse("msft").expect("symbol")),
                window: HistoryWindow::period(Period::FiveDays),
            },
        )
        .expect("json");

        assert_eq!(value["symbol"], "MSFT");
        assert_eq!(value["warnings"].as_array().map(|w| w.len()), Some(0));
        assert_eq!(value["chart"]["x_mode"], "categorical");
    }

    #[test]
    fn empty_fallback_is_an_error() {
        let mut config = Config::default();
        config.catalog.fallback.clear();
        let err = run_headless(
            &config,
            Arc::new(OneBar),
            Arc::new(Unreachable),
            HeadlessArgs {
                symbol: None,
                window: HistoryWindow::period(Period::OneYear),
            },
        )
        .expect_err("no symbol");
        assert!(err.contains("--symbol"));
    }
}
