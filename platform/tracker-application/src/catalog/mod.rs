use crate::config::CatalogConfig;
use tracker_domain::repositories::catalog::TickerCatalogSource;
use tracker_domain::services::catalog::TickerCatalog;
use tracker_domain::value_objects::ticker::TickerSymbol;
use tracker_domain::value_objects::warning::DashboardWarning;

/// Loads the catalog, substituting the configured fallback symbols when the
/// source fails or yields nothing usable.
pub fn load_catalog_or_fallback(
    source: &dyn TickerCatalogSource,
    config: &CatalogConfig,
) -> (TickerCatalog, Option<DashboardWarning>) {
    let origin = source.describe();
    let span = tracing::info_span!("app.catalog.load", source = %origin);
    let _enter = span.enter();

    let problem = match source.load_catalog() {
        Ok(catalog) if !catalog.is_empty() => {
            tracing::info!(
                symbols = catalog.len(),
                skipped = catalog.skipped,
                "ticker catalog loaded"
            );
            return (catalog, None);
        }
        Ok(catalog) => format!(
            "{origin} contained no valid symbols ({} lines skipped)",
            catalog.skipped
        ),
        Err(err) => err,
    };

    metrics::counter!("tracker.catalog.fallbacks").increment(1);
    tracing::warn!(error = %problem, "using fallback ticker catalog");
    (
        fallback_catalog(&config.fallback),
        Some(DashboardWarning::Catalog(problem)),
    )
}

fn fallback_catalog(symbols: &[String]) -> TickerCatalog {
    let mut skipped = 0;
    let parsed = symbols
        .iter()
        .filter_map(|raw| match TickerSymbol::parse(raw) {
            Ok(symbol) => Some(symbol),
            Err(err) => {
                skipped += 1;
                tracing::warn!(symbol = %raw, error = %err, "ignoring invalid fallback symbol");
                None
            }
        })
        .collect();
    let mut catalog = TickerCatalog::from_symbols(parsed);
    catalog.skipped = skipped;
    catalog
}

#[cfg(test)]
mod tests {
    use super::load_catalog_or_fallback;
    use crate::config::CatalogConfig;
    use tracker_domain::repositories::catalog::TickerCatalogSource;
    use tracker_domain::services::catalog::{parse_catalog, TickerCatalog};
    use tracker_domain::value_objects::warning::DashboardWarning;

    struct StaticSource(Result<TickerCatalog, String>);

    impl TickerCatalogSource for StaticSource {
        fn load_catalog(&self) -> Result<TickerCatalog, String> {
            self.0.clone()
        }

        fn describe(&self) -> String {
            "static".to_string()
        }
    }

    fn config() -> CatalogConfig {
        CatalogConfig {
            fallback: vec!["spy".to_string(), "bad symbol".to_string(), "QQQ".to_string()],
            ..CatalogConfig::default()
        }
    }

    #[test]
    fn loaded_catalog_is_used_as_is() {
        let source = StaticSource(Ok(parse_catalog("AAPL\nMSFT\n")));
        let (catalog, warning) = load_catalog_or_fallback(&source, &config());
        assert_eq!(catalog.len(), 2);
        assert!(warning.is_none());
    }

    #[test]
    fn source_error_falls_back_with_catalog_warning() {
        let source = StaticSource(Err("failed to fetch catalog: timeout".to_string()));
        let (catalog, warning) = load_catalog_or_fallback(&source, &config());
        let names: Vec<&str> = catalog.symbols.iter().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["SPY", "QQQ"]);
        assert_eq!(catalog.skipped, 1);
        assert!(matches!(warning, Some(DashboardWarning::Catalog(msg)) if msg.contains("timeout")));
    }

    #[test]
    fn empty_catalog_falls_back() {
        let source = StaticSource(Ok(parse_catalog("# nothing\n\n")));
        let (catalog, warning) = load_catalog_or_fallback(&source, &config());
        assert_eq!(catalog.len(), 2);
        assert!(matches!(warning, Some(DashboardWarning::Catalog(_))));
    }
}
