use crate::services::period_resolver::HistoryRequest;
use crate::value_objects::price::PriceSeries;
use crate::value_objects::profile::TickerProfile;
use crate::value_objects::ticker::TickerSymbol;

/// External market-data provider.
pub trait MarketDataRepository {
    /// An `Ok` series may be empty when the provider has nothing for the window.
    fn load_history(&self, request: &HistoryRequest) -> Result<PriceSeries, String>;

    fn load_profile(&self, symbol: &TickerSymbol) -> Result<TickerProfile, String>;
}
