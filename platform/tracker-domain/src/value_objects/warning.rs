use serde::{Deserialize, Serialize};
use std::fmt;

/// Non-fatal problems surfaced to the user; the pipeline always completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum DashboardWarning {
    /// Name/summary unavailable; the header is skipped.
    MetadataLookup(String),
    /// History failed or came back empty; downstream sees an empty series.
    HistoryFetch(String),
    /// Ticker list unavailable; fallback symbols are in use.
    Catalog(String),
}

impl fmt::Display for DashboardWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MetadataLookup(msg) => {
                write!(f, "an error occurred while fetching ticker information: {msg}")
            }
            Self::HistoryFetch(msg) => write!(f, "no historical data: {msg}"),
            Self::Catalog(msg) => write!(f, "ticker catalog unavailable: {msg}"),
        }
    }
}
