use crate::services::catalog::TickerCatalog;

pub trait TickerCatalogSource {
    fn load_catalog(&self) -> Result<TickerCatalog, String>;

    /// Where the catalog comes from, for logs and warnings.
    fn describe(&self) -> String;
}
