use crate::value_objects::period::Period;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What span of history to request: a named period or an explicit date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HistoryWindow {
    Period { period: Period },
    /// `[start, end)` in calendar days, exchange-local.
    Range { start: NaiveDate, end: NaiveDate },
}

impl HistoryWindow {
    pub fn period(period: Period) -> Self {
        Self::Period { period }
    }

    pub fn range(start: NaiveDate, end: NaiveDate) -> Result<Self, String> {
        if start >= end {
            return Err(format!("invalid date range: start {start} must be before end {end}"));
        }
        Ok(Self::Range { start, end })
    }

    pub fn parse_range(start: &str, end: &str) -> Result<Self, String> {
        let start = parse_date(start)?;
        let end = parse_date(end)?;
        Self::range(start, end)
    }

    pub fn as_period(&self) -> Option<Period> {
        match self {
            Self::Period { period } => Some(*period),
            Self::Range { .. } => None,
        }
    }

    pub fn is_intraday(&self) -> bool {
        self.as_period().is_some_and(Period::is_intraday)
    }
}

impl From<Period> for HistoryWindow {
    fn from(period: Period) -> Self {
        Self::period(period)
    }
}

impl fmt::Display for HistoryWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Period { period } => write!(f, "{period}"),
            Self::Range { start, end } => write!(f, "{start}..{end}"),
        }
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y/%m/%d"))
        .map_err(|err| format!("invalid date {value} (expected YYYY-MM-DD): {err}"))
}

#[cfg(test)]
mod tests {
    use super::HistoryWindow;
    use crate::value_objects::period::Period;

    #[test]
    fn range_requires_start_before_end() {
        assert!(HistoryWindow::parse_range("2023-01-01", "2023-12-02").is_ok());
        assert!(HistoryWindow::parse_range("2023/01/01", "2023/12/02").is_ok());
        assert!(HistoryWindow::parse_range("2023-12-02", "2023-01-01").is_err());
        assert!(HistoryWindow::parse_range("2023-01-01", "2023-01-01").is_err());
        assert!(HistoryWindow::parse_range("yesterday", "2023-01-01").is_err());
    }

    #[test]
    fn only_short_periods_are_intraday() {
        assert!(HistoryWindow::period(Period::OneDay).is_intraday());
        assert!(!HistoryWindow::period(Period::Max).is_intraday());
        let range = HistoryWindow::parse_range("2023-01-01", "2023-01-05").expect("range");
        assert!(!range.is_intraday());
    }
}
