use serde::{Deserialize, Serialize};

/// Descriptive fields shown above the data. Either may be missing upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerProfile {
    pub long_name: Option<String>,
    pub summary: Option<String>,
}

impl TickerProfile {
    /// Returns the first required field that is absent or blank.
    pub fn missing_field(&self) -> Option<&'static str> {
        let blank = |v: &Option<String>| v.as_deref().map(str::trim).unwrap_or("").is_empty();
        if blank(&self.long_name) {
            Some("longName")
        } else if blank(&self.summary) {
            Some("longBusinessSummary")
        } else {
            None
        }
    }
}
