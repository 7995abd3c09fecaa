use crate::services::table::{
    exchange_offset, format_epoch, visible_records, FormatOptions, TimestampStyle,
};
use crate::value_objects::period::Period;
use crate::value_objects::price::PriceSeries;
use crate::value_objects::window::HistoryWindow;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum XAxisMode {
    /// x = epoch seconds.
    Time,
    /// x = sample index; closes the overnight and weekend gaps.
    Categorical,
}

impl XAxisMode {
    pub fn for_window(window: &HistoryWindow) -> Self {
        match window.as_period() {
            Some(Period::FiveDays) => Self::Categorical,
            _ => Self::Time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChart {
    pub x_mode: XAxisMode,
    /// `(x, close)` pairs in time order.
    pub points: Vec<(f64, f64)>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    /// First, middle and last sample times.
    pub x_labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChartView {
    NoData,
    Line(LineChart),
}

impl ChartView {
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData)
    }
}

pub fn build_chart(series: &PriceSeries, window: &HistoryWindow) -> ChartView {
    let options = FormatOptions::for_window(window);
    let x_mode = XAxisMode::for_window(window);
    let records: Vec<_> = visible_records(series, &options).collect();
    if records.is_empty() {
        return ChartView::NoData;
    }

    let points: Vec<(f64, f64)> = records
        .iter()
        .enumerate()
        .map(|(idx, r)| {
            let x = match x_mode {
                XAxisMode::Time => r.timestamp as f64,
                XAxisMode::Categorical => idx as f64,
            };
            (x, r.close)
        })
        .collect();

    let label_style = match options.timestamp_style {
        TimestampStyle::DateTime => LABEL_DATETIME,
        TimestampStyle::DateOnly => LABEL_DATE,
    };
    let offset = exchange_offset(series.utc_offset_seconds());
    let mid = records.len() / 2;
    let x_labels = [0, mid, records.len() - 1]
        .iter()
        .map(|idx| format_epoch(records[*idx].timestamp, offset, label_style))
        .collect();

    ChartView::Line(LineChart {
        x_mode,
        x_bounds: x_bounds(&points),
        y_bounds: y_bounds(&points),
        points,
        x_labels,
    })
}

const LABEL_DATETIME: &str = "%m/%d %H:%M";
const LABEL_DATE: &str = "%Y/%m/%d";

pub fn x_bounds(points: &[(f64, f64)]) -> [f64; 2] {
    let x_min = points.first().map(|p| p.0).unwrap_or(0.0);
    let mut x_max = points.last().map(|p| p.0).unwrap_or(x_min + 1.0);
    if x_max <= x_min {
        x_max = x_min + 1.0;
    }
    [x_min, x_max]
}

pub fn y_bounds(points: &[(f64, f64)]) -> [f64; 2] {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for (_, y) in points {
        min = min.min(*y);
        max = max.max(*y);
    }
    if !min.is_finite() || !max.is_finite() {
        return [0.0, 1.0];
    }
    if max <= min {
        return [min - 1.0, max + 1.0];
    }
    let pad = (max - min) * 0.05;
    [min - pad, max + pad]
}

#[cfg(test)]
mod tests {
    use super::{build_chart, y_bounds, ChartView, XAxisMode};
    use crate::value_objects::period::Period;
    use crate::value_objects::price::{PriceRecord, PriceSeries};
    use crate::value_objects::ticker::TickerSymbol;
    use crate::value_objects::window::HistoryWindow;

    fn record(ts: i64, close: f64, volume: f64) -> PriceRecord {
        PriceRecord {
            timestamp: ts,
            open: close,
            high: close,
            low: close,
            close,
            volume,
        }
    }

    fn series(records: Vec<PriceRecord>) -> PriceSeries {
        PriceSeries::new(TickerSymbol::parse("AAPL").expect("symbol"), 0, records)
    }

    #[test]
    fn five_days_uses_sample_index_on_x() {
        let window = HistoryWindow::period(Period::FiveDays);
        // Overnight gap between the second and third sample.
        let s = series(vec![
            record(3_600, 1.0, 10.0),
            record(7_200, 2.0, 10.0),
            record(90_000, 3.0, 10.0),
        ]);
        let ChartView::Line(chart) = build_chart(&s, &window) else {
            panic!("expected line");
        };
        assert_eq!(chart.x_mode, XAxisMode::Categorical);
        let xs: Vec<f64> = chart.points.iter().map(|p| p.0).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0]);
        assert_eq!(chart.x_bounds, [0.0, 2.0]);
        assert_eq!(chart.x_labels.len(), 3);
        assert_eq!(chart.x_labels[0], "01/01 01:00");
    }

    #[test]
    fn other_periods_use_elapsed_time_on_x() {
        let window = HistoryWindow::period(Period::OneYear);
        let s = series(vec![record(0, 1.0, 0.0), record(86_400, 2.0, 5.0)]);
        let ChartView::Line(chart) = build_chart(&s, &window) else {
            panic!("expected line");
        };
        assert_eq!(chart.x_mode, XAxisMode::Time);
        assert_eq!(chart.points, vec![(0.0, 1.0), (86_400.0, 2.0)]);
        assert_eq!(chart.x_labels[2], "1970/01/02");
    }

    #[test]
    fn empty_series_renders_nothing() {
        let window = HistoryWindow::period(Period::FiveDays);
        assert!(build_chart(&series(Vec::new()), &window).is_no_data());
    }

    #[test]
    fn flat_series_gets_a_visible_band() {
        assert_eq!(y_bounds(&[(0.0, 5.0), (1.0, 5.0)]), [4.0, 6.0]);
        let [lo, hi] = y_bounds(&[(0.0, 10.0), (1.0, 20.0)]);
        assert!((lo - 9.5).abs() < 1e-9 && (hi - 20.5).abs() < 1e-9);
    }
}
