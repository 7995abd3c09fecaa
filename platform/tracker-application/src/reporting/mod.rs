use crate::dashboard::DashboardSnapshot;
use serde_json::{json, Value};
use tracker_domain::services::chart::ChartView;
use tracker_domain::services::table::TableView;
use tracker_domain::value_objects::warning::DashboardWarning;

/// Renders a snapshot for headless output. Table cells use the same text as the TUI.
pub fn snapshot_to_json(snapshot: &DashboardSnapshot) -> Value {
    let _span = tracing::debug_span!("app.reporting.snapshot_json").entered();

    let table = match &snapshot.table {
        TableView::NoData => json!({ "status": "no_data" }),
        TableView::Rows(formatted) => json!({
            "status": "rows",
            "headers": formatted.headers(),
            "rows": formatted.rows.iter().map(|row| row.cells()).collect::<Vec<_>>(),
            "dropped_zero_volume": formatted.dropped_zero_volume,
        }),
    };

    let chart = match &snapshot.chart {
        ChartView::NoData => json!({ "status": "no_data" }),
        ChartView::Line(line) => json!({
            "status": "line",
            "x_mode": line.x_mode,
            "points": line.points.len(),
            "x_labels": line.x_labels,
            "y_bounds": line.y_bounds,
        }),
    };

    let warnings: Vec<Value> = snapshot.warnings.iter().map(warning_to_json).collect();

    json!({
        "symbol": snapshot.request.symbol,
        "window": snapshot.request.window,
        "interval": snapshot.request.interval,
        "profile": snapshot.profile,
        "table": table,
        "chart": chart,
        "warnings": warnings,
        "fetched_rows": snapshot.fetched_rows,
        "elapsed_ms": snapshot.elapsed_ms,
    })
}

/// `{kind, message, display}`; `display` is the user-facing sentence.
pub fn warning_to_json(warning: &DashboardWarning) -> Value {
    let mut value = json!(warning);
    if let Some(map) = value.as_object_mut() {
        map.insert("display".to_string(), json!(warning.to_string()));
    }
    value
}

#[cfg(test)]
mod tests {
    use super::snapshot_to_json;
    use crate::dashboard::DashboardSnapshot;
    use tracker_domain::services::chart::ChartView;
    use tracker_domain::services::period_resolver::resolve_request;
    use tracker_domain::services::table::TableView;
    use tracker_domain::value_objects::period::Period;
    use tracker_domain::value_objects::ticker::TickerSymbol;
    use tracker_domain::value_objects::warning::DashboardWarning;
    use tracker_domain::value_objects::window::HistoryWindow;

    #[test]
    fn empty_snapshot_renders_no_data_and_warnings() {
        let symbol = TickerSymbol::parse("AAPL").expect("symbol");
        let snapshot = DashboardSnapshot {
            request: resolve_request(symbol, HistoryWindow::period(Period::FiveDays)),
            profile: None,
            table: TableView::NoData,
            chart: ChartView::NoData,
            warnings: vec![DashboardWarning::HistoryFetch("timeout".to_string())],
            fetched_rows: 0,
            elapsed_ms: 3,
        };
        let value = snapshot_to_json(&snapshot);
        assert_eq!(value["symbol"], "AAPL");
        assert_eq!(value["interval"], "1h");
        assert_eq!(value["window"]["period"], "5d");
        assert_eq!(value["table"]["status"], "no_data");
        assert_eq!(value["chart"]["status"], "no_data");
        assert_eq!(value["warnings"][0]["kind"], "history_fetch");
        assert_eq!(value["warnings"][0]["display"], "no historical data: timeout");
        assert!(value["profile"].is_null());
    }
}
