use crate::value_objects::interval::Interval;
use crate::value_objects::period::Period;
use crate::value_objects::ticker::TickerSymbol;
use crate::value_objects::window::HistoryWindow;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedPeriod {
    pub code: &'static str,
    /// `None` leaves sampling to the provider's default.
    pub interval: Option<Interval>,
}

pub fn resolve(period: Period) -> ResolvedPeriod {
    let interval = match period {
        Period::OneDay => Some(Interval::OneMinute),
        Period::FiveDays => Some(Interval::OneHour),
        Period::OneMonth => Some(Interval::NinetyMinutes),
        Period::ThreeMonths
        | Period::SixMonths
        | Period::OneYear
        | Period::TwoYears
        | Period::FiveYears
        | Period::TenYears
        | Period::YearToDate
        | Period::Max => None,
    };
    ResolvedPeriod {
        code: period.code(),
        interval,
    }
}

/// A fully resolved provider call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryRequest {
    pub symbol: TickerSymbol,
    pub window: HistoryWindow,
    pub interval: Option<Interval>,
}

pub fn resolve_request(symbol: TickerSymbol, window: HistoryWindow) -> HistoryRequest {
    let interval = match window {
        HistoryWindow::Period { period } => resolve(period).interval,
        HistoryWindow::Range { .. } => Some(Interval::OneDay),
    };
    HistoryRequest {
        symbol,
        window,
        interval,
    }
}

#[cfg(test)]
mod tests {
    use super::{resolve, resolve_request};
    use crate::value_objects::interval::Interval;
    use crate::value_objects::period::Period;
    use crate::value_objects::ticker::TickerSymbol;
    use crate::value_objects::window::HistoryWindow;

    #[test]
    fn every_period_resolves_to_a_code() {
        for period in Period::ALL {
            assert!(!resolve(period).code.is_empty(), "{period}");
        }
    }

    #[test]
    fn short_periods_carry_an_interval() {
        assert_eq!(resolve(Period::OneDay).interval, Some(Interval::OneMinute));
        assert_eq!(resolve(Period::FiveDays).interval, Some(Interval::OneHour));
        assert_eq!(
            resolve(Period::OneMonth).interval,
            Some(Interval::NinetyMinutes)
        );
        for period in Period::ALL.into_iter().filter(|p| !p.is_intraday()) {
            assert_eq!(resolve(period).interval, None, "{period}");
        }
    }

    #[test]
    fn codes_match_the_provider_vocabulary() {
        let codes: Vec<&str> = Period::ALL.iter().map(|p| resolve(*p).code).collect();
        assert_eq!(
            codes,
            vec!["1d", "5d", "1mo", "3mo", "6mo", "1y", "2y", "5y", "10y", "ytd", "max"]
        );
    }

    #[test]
    fn date_ranges_request_daily_bars() {
        let symbol = TickerSymbol::parse("MSFT").expect("symbol");
        let window = HistoryWindow::parse_range("2023-01-01", "2023-12-02").expect("range");
        let request = resolve_request(symbol, window);
        assert_eq!(request.interval, Some(Interval::OneDay));
    }
}
