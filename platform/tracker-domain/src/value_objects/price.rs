use crate::value_objects::ticker::TickerSymbol;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One OHLCV sample; `timestamp` is epoch seconds (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceRecord {
    pub fn average_price(&self) -> f64 {
        (self.open + self.high + self.low + self.close) / 4.0
    }

    pub fn has_volume(&self) -> bool {
        self.volume != 0.0
    }
}

/// Time-ordered samples for one symbol, unique by timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: TickerSymbol,
    utc_offset_seconds: i32,
    records: Vec<PriceRecord>,
}

impl PriceSeries {
    /// Sorts by timestamp; on duplicate timestamps the later record wins.
    pub fn new(symbol: TickerSymbol, utc_offset_seconds: i32, records: Vec<PriceRecord>) -> Self {
        let mut by_ts: BTreeMap<i64, PriceRecord> = BTreeMap::new();
        for record in records {
            by_ts.insert(record.timestamp, record);
        }
        Self {
            symbol,
            utc_offset_seconds,
            records: by_ts.into_values().collect(),
        }
    }

    pub fn empty(symbol: TickerSymbol) -> Self {
        Self {
            symbol,
            utc_offset_seconds: 0,
            records: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &TickerSymbol {
        &self.symbol
    }

    /// Exchange offset used when rendering timestamps.
    pub fn utc_offset_seconds(&self) -> i32 {
        self.utc_offset_seconds
    }

    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
