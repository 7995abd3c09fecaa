use crate::app::{App, Focus};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Axis, Block, Borders, Cell, Chart, Dataset, GraphType, List, ListItem, ListState, Paragraph,
    Row, Table, Tabs, Wrap,
};
use ratatui::Frame;
use tracker_domain::services::chart::ChartView;
use tracker_domain::services::table::{Column, TableView, TimestampStyle};
use tracker_domain::value_objects::period::Period;
use tracker_domain::value_objects::warning::DashboardWarning;

pub fn draw(frame: &mut Frame, app: &App) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(12),
            Constraint::Length(8),
        ])
        .split(frame.area());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(22), Constraint::Min(40)])
        .split(outer[1]);

    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(6),
            Constraint::Percentage(45),
            Constraint::Min(5),
        ])
        .split(body[1]);

    draw_banner(frame, outer[0], app);
    draw_tickers(frame, body[0], app);
    draw_periods(frame, main[0], app);
    draw_header(frame, main[1], app);
    draw_chart(frame, main[2], app);
    draw_table(frame, main[3], app);
    draw_logs(frame, outer[2], app);
}

fn focus_block(title: String, focused: bool) -> Block<'static> {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(style)
}

fn draw_banner(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![Span::styled(
        "Stock Tracker",
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if let Some(symbol) = &app.current {
        spans.push(Span::raw(format!("  {symbol} · {}", app.window())));
    }
    if let Some(snapshot) = &app.snapshot {
        let interval = snapshot
            .request
            .interval
            .map(|i| i.code())
            .unwrap_or("default");
        spans.push(Span::styled(
            format!(
                "  [{} rows, interval {interval}, {} ms]",
                snapshot.table.rows().len(),
                snapshot.elapsed_ms
            ),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if app.is_loading() {
        spans.push(Span::styled(
            format!("  loading {}", app.spinner_char()),
            Style::default().fg(Color::Cyan),
        ));
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        area,
    );
}

fn draw_tickers(frame: &mut Frame, area: Rect, app: &App) {
    let filtered = app.filtered();
    let title = if app.focus == Focus::Filter || !app.filter.value.is_empty() {
        format!("/{}", app.filter.value)
    } else if app.catalog_loading {
        "Tickers (loading)".to_string()
    } else {
        format!("Tickers ({})", filtered.len())
    };

    let items: Vec<ListItem> = filtered
        .iter()
        .map(|symbol| {
            let style = if app.current.as_ref() == Some(*symbol) {
                Style::default().fg(Color::Green)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(Span::styled(symbol.to_string(), style)))
        })
        .collect();

    let focused = matches!(app.focus, Focus::Tickers | Focus::Filter);
    let list = List::new(items)
        .block(focus_block(title, focused))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(if filtered.is_empty() {
        None
    } else {
        Some(app.selected)
    });
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_periods(frame: &mut Frame, area: Rect, app: &App) {
    let title = match app.range {
        Some(range) => format!("Period (range {range}; ←/→ to switch)"),
        None => "Period".to_string(),
    };
    let tabs = Tabs::new(Period::ALL.iter().map(|p| p.label()))
        .block(Block::default().title(title).borders(Borders::ALL))
        .select(app.range.is_none().then_some(app.period.index()))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

fn warning_line(warning: &DashboardWarning) -> Line<'static> {
    let color = match warning {
        DashboardWarning::MetadataLookup(_) => Color::Yellow,
        DashboardWarning::HistoryFetch(_) | DashboardWarning::Catalog(_) => Color::Red,
    };
    Line::from(Span::styled(warning.to_string(), Style::default().fg(color)))
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let mut lines: Vec<Line> = Vec::new();
    if let Some(warning) = &app.catalog_warning {
        lines.push(warning_line(warning));
    }
    match &app.snapshot {
        None => lines.push(Line::from("Select a ticker and press Enter.")),
        Some(snapshot) => {
            if let Some(profile) = &snapshot.profile {
                if let Some(name) = &profile.long_name {
                    lines.push(Line::from(Span::styled(
                        name.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    )));
                }
                if let Some(summary) = &profile.summary {
                    lines.push(Line::from(summary.clone()));
                }
            }
            lines.extend(snapshot.warnings.iter().map(warning_line));
        }
    }

    let title = app
        .snapshot
        .as_ref()
        .map(|s| s.symbol().to_string())
        .unwrap_or_else(|| "Ticker".to_string());
    frame.render_widget(
        Paragraph::new(lines)
            .block(Block::default().title(title).borders(Borders::ALL))
            .wrap(Wrap { trim: true }),
        area,
    );
}

const X_AXIS_TITLE: &str = "Date";
const Y_AXIS_TITLE: &str = "Closing Price (USD)";

fn draw_chart(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().title("Close").borders(Borders::ALL);
    let Some(ChartView::Line(line)) = app.snapshot.as_ref().map(|s| &s.chart) else {
        frame.render_widget(no_data(block), area);
        return;
    };

    let [x_min, x_max] = line.x_bounds;
    let [y_min, y_max] = line.y_bounds;
    let chart = Chart::new(vec![Dataset::default()
        .name("close")
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&line.points)])
    .block(block)
    .x_axis(
        Axis::default()
            .title(X_AXIS_TITLE)
            .bounds([x_min, x_max])
            .labels(line.x_labels.iter().cloned().map(Line::from)),
    )
    .y_axis(
        Axis::default()
            .title(Y_AXIS_TITLE)
            .bounds([y_min, y_max])
            .labels(axis_labels(y_min, y_max)),
    );
    frame.render_widget(chart, area);
}

fn axis_labels(min: f64, max: f64) -> Vec<Line<'static>> {
    let mid = (min + max) / 2.0;
    vec![
        Line::from(format!("{min:.2}")),
        Line::from(format!("{mid:.2}")),
        Line::from(format!("{max:.2}")),
    ]
}

fn no_data(block: Block<'static>) -> Paragraph<'static> {
    Paragraph::new(Line::from(Span::styled(
        "No data",
        Style::default().fg(Color::DarkGray),
    )))
    .alignment(Alignment::Center)
    .block(block)
}

fn column_width(column: Column, style: TimestampStyle) -> Constraint {
    match column {
        Column::Timestamp => match style {
            TimestampStyle::DateTime => Constraint::Length(19),
            TimestampStyle::DateOnly => Constraint::Length(10),
        },
        Column::Volume => Constraint::Min(10),
        _ => Constraint::Length(13),
    }
}

fn draw_table(frame: &mut Frame, area: Rect, app: &App) {
    let block = focus_block("History".to_string(), app.focus == Focus::Table);
    let Some(TableView::Rows(table)) = app.snapshot.as_ref().map(|s| &s.table) else {
        frame.render_widget(no_data(block), area);
        return;
    };

    let visible = area.height.saturating_sub(3) as usize;
    let start = app.table_scroll.min(table.rows.len().saturating_sub(1));
    let rows: Vec<Row> = table.rows[start..]
        .iter()
        .take(visible)
        .map(|row| Row::new(row.cells().into_iter().map(Cell::from)))
        .collect();
    let header = Row::new(table.headers().into_iter().map(Cell::from))
        .style(Style::default().add_modifier(Modifier::BOLD));
    let widths: Vec<Constraint> = table
        .columns
        .iter()
        .map(|c| column_width(*c, table.timestamp_style))
        .collect();

    let title = format!(
        "History ({}-{} of {})",
        start + 1,
        (start + visible).min(table.rows.len()),
        table.rows.len()
    );
    frame.render_widget(
        Table::new(rows, widths)
            .header(header)
            .block(focus_block(title, app.focus == Focus::Table)),
        area,
    );
}

fn draw_logs(frame: &mut Frame, area: Rect, app: &App) {
    let max_lines = area.height.saturating_sub(2) as usize;
    let visible = app.logs.lock().tail(max_lines, app.log_scroll);
    let text: Vec<Line> = visible.into_iter().map(Line::from).collect();
    let title = if app.log_scroll > 0 {
        format!("Logs (-{})", app.log_scroll)
    } else {
        "Logs  [/ filter · Enter load · ←/→ period · r reload · Tab focus · q quit]".to_string()
    };
    frame.render_widget(
        Paragraph::new(text)
            .block(focus_block(title, app.focus == Focus::Logs))
            .wrap(Wrap { trim: false }),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::{draw, X_AXIS_TITLE, Y_AXIS_TITLE};
    use crate::app::App;
    use crate::logging::LogBuffer;
    use crate::tasks::TaskRunner;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::sync::Arc;
    use tracker_application::config::CatalogConfig;
    use tracker_application::dashboard::{load_dashboard, DashboardOptions, DashboardRequest};
    use tracker_domain::repositories::catalog::TickerCatalogSource;
    use tracker_domain::repositories::market_data::MarketDataRepository;
    use tracker_domain::services::catalog::{parse_catalog, TickerCatalog};
    use tracker_domain::services::period_resolver::HistoryRequest;
    use tracker_domain::value_objects::period::Period;
    use tracker_domain::value_objects::price::{PriceRecord, PriceSeries};
    use tracker_domain::value_objects::profile::TickerProfile;
    use tracker_domain::value_objects::ticker::TickerSymbol;
    use tracker_domain::value_objects::window::HistoryWindow;

    struct TwoBars;

    impl MarketDataRepository for TwoBars {
        fn load_history(&self, request: &HistoryRequest) -> Result<PriceSeries, String> {
            let bar = |timestamp, close| PriceRecord {
                timestamp,
                open: close,
                high: close,
                low: close,
                close,
                volume: 100.0,
            };
            Ok(PriceSeries::new(
                request.symbol.clone(),
                0,
                vec![bar(1_704_153_600, 10.0), bar(1_704_240_000, 12.0)],
            ))
        }

        fn load_profile(&self, _symbol: &TickerSymbol) -> Result<TickerProfile, String> {
            Err("offline".to_string())
        }
    }

    impl TickerCatalogSource for TwoBars {
        fn load_catalog(&self) -> Result<TickerCatalog, String> {
            Ok(parse_catalog("AAPL\n"))
        }

        fn describe(&self) -> String {
            "static".to_string()
        }
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let area = buffer.area;
        let mut text = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn chart_axes_are_titled() {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let runner = TaskRunner::new(
            tx,
            Arc::new(TwoBars),
            Arc::new(TwoBars),
            CatalogConfig::default(),
            DashboardOptions::default(),
        );
        let symbol = TickerSymbol::parse("AAPL").expect("symbol");
        let mut app = App::new(
            runner,
            LogBuffer::shared(10),
            Some(symbol.clone()),
            HistoryWindow::period(Period::OneYear),
        );
        let request = DashboardRequest::new(symbol, Period::OneYear);
        app.snapshot = Some(load_dashboard(&TwoBars, &request, DashboardOptions::default()));

        let mut terminal = Terminal::new(TestBackend::new(140, 50)).expect("terminal");
        terminal.draw(|frame| draw(frame, &app)).expect("draw");

        let text = screen_text(&terminal);
        assert!(text.contains(Y_AXIS_TITLE), "{text}");
        // Once as the history table's first header, once under the chart.
        assert!(text.matches(X_AXIS_TITLE).count() >= 2, "{text}");
    }
}
