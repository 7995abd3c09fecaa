use crate::value_objects::price::{PriceRecord, PriceSeries};
use crate::value_objects::window::HistoryWindow;
use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::Serialize;

pub const DATETIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S";
pub const DATE_FORMAT: &str = "%Y/%m/%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampStyle {
    DateTime,
    DateOnly,
}

impl TimestampStyle {
    pub fn pattern(self) -> &'static str {
        match self {
            Self::DateTime => DATETIME_FORMAT,
            Self::DateOnly => DATE_FORMAT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FormatOptions {
    pub timestamp_style: TimestampStyle,
    pub drop_zero_volume: bool,
}

impl FormatOptions {
    /// Intraday periods get date+time stamps and lose zero-volume samples.
    pub fn for_window(window: &HistoryWindow) -> Self {
        if window.is_intraday() {
            Self {
                timestamp_style: TimestampStyle::DateTime,
                drop_zero_volume: true,
            }
        } else {
            Self {
                timestamp_style: TimestampStyle::DateOnly,
                drop_zero_volume: false,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Timestamp,
    Open,
    Close,
    Average,
    Low,
    High,
    Volume,
}

/// Display order of the table.
pub const DISPLAY_COLUMNS: [Column; 7] = [
    Column::Timestamp,
    Column::Open,
    Column::Close,
    Column::Average,
    Column::Low,
    Column::High,
    Column::Volume,
];

impl Column {
    pub fn header(self, style: TimestampStyle) -> &'static str {
        match self {
            Self::Timestamp => match style {
                TimestampStyle::DateTime => "Datetime",
                TimestampStyle::DateOnly => "Date",
            },
            Self::Open => "Open",
            Self::Close => "Close",
            Self::Average => "Average Price",
            Self::Low => "Low",
            Self::High => "High",
            Self::Volume => "Volume",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedRow {
    pub timestamp: String,
    pub open: f64,
    pub close: f64,
    pub average: f64,
    pub low: f64,
    pub high: f64,
    pub volume: f64,
}

impl FormattedRow {
    pub fn value(&self, column: Column) -> String {
        match column {
            Column::Timestamp => self.timestamp.clone(),
            Column::Open => format!("{:.2}", self.open),
            Column::Close => format!("{:.2}", self.close),
            Column::Average => format!("{:.2}", self.average),
            Column::Low => format!("{:.2}", self.low),
            Column::High => format!("{:.2}", self.high),
            Column::Volume => format!("{:.0}", self.volume),
        }
    }

    /// Cells in [`DISPLAY_COLUMNS`] order.
    pub fn cells(&self) -> Vec<String> {
        DISPLAY_COLUMNS.iter().map(|c| self.value(*c)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedTable {
    pub timestamp_style: TimestampStyle,
    pub columns: Vec<Column>,
    pub rows: Vec<FormattedRow>,
    pub dropped_zero_volume: usize,
}

impl FormattedTable {
    pub fn headers(&self) -> Vec<&'static str> {
        self.columns
            .iter()
            .map(|c| c.header(self.timestamp_style))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TableView {
    NoData,
    Rows(FormattedTable),
}

impl TableView {
    pub fn rows(&self) -> &[FormattedRow] {
        match self {
            Self::NoData => &[],
            Self::Rows(table) => &table.rows,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData)
    }
}

/// Records the table and chart both display.
pub fn visible_records<'a>(
    series: &'a PriceSeries,
    options: &FormatOptions,
) -> impl Iterator<Item = &'a PriceRecord> + 'a {
    let drop_zero = options.drop_zero_volume;
    series
        .records()
        .iter()
        .filter(move |r| !drop_zero || r.has_volume())
}

pub fn format_table(series: &PriceSeries, options: &FormatOptions) -> TableView {
    let offset = exchange_offset(series.utc_offset_seconds());
    let rows: Vec<FormattedRow> = visible_records(series, options)
        .map(|r| FormattedRow {
            timestamp: format_timestamp(r.timestamp, offset, options.timestamp_style),
            open: r.open,
            close: r.close,
            average: r.average_price(),
            low: r.low,
            high: r.high,
            volume: r.volume,
        })
        .collect();

    if rows.is_empty() {
        return TableView::NoData;
    }

    let dropped_zero_volume = series.len() - rows.len();
    TableView::Rows(FormattedTable {
        timestamp_style: options.timestamp_style,
        columns: DISPLAY_COLUMNS.to_vec(),
        rows,
        dropped_zero_volume,
    })
}

pub fn exchange_offset(utc_offset_seconds: i32) -> FixedOffset {
    FixedOffset::east_opt(utc_offset_seconds).unwrap_or(Utc.fix())
}

pub fn format_timestamp(timestamp: i64, offset: FixedOffset, style: TimestampStyle) -> String {
    format_epoch(timestamp, offset, style.pattern())
}

/// Out-of-range timestamps fall back to the raw epoch value.
pub fn format_epoch(timestamp: i64, offset: FixedOffset, pattern: &str) -> String {
    match DateTime::<Utc>::from_timestamp(timestamp, 0) {
        Some(dt) => dt.with_timezone(&offset).format(pattern).to_string(),
        None => timestamp.to_string(),
    }
}
