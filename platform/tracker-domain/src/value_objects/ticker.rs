use serde::{Deserialize, Serialize};
use std::fmt;

const MAX_SYMBOL_LEN: usize = 16;

/// Uppercase instrument identifier as understood by the data provider
/// (`AAPL`, `BRK-B`, `^GSPC`, `EURUSD=X`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TickerSymbol(String);

impl TickerSymbol {
    pub fn parse(value: &str) -> Result<Self, String> {
        let normalized = value.trim().to_uppercase();
        if normalized.is_empty() {
            return Err("empty ticker symbol".to_string());
        }
        if normalized.len() > MAX_SYMBOL_LEN {
            return Err(format!(
                "ticker symbol too long ({} > {MAX_SYMBOL_LEN}): {value}",
                normalized.len()
            ));
        }
        if let Some(bad) = normalized
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=')))
        {
            return Err(format!("invalid character {bad:?} in ticker symbol: {value}"));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TickerSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TickerSymbol {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TickerSymbol> for String {
    fn from(value: TickerSymbol) -> Self {
        value.0
    }
}
