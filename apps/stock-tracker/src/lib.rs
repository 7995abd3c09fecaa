mod app;
pub mod bootstrap;
pub mod headless;
pub mod logging;
mod tasks;
mod ui;

use crate::app::App;
use crate::bootstrap::{SharedCatalogSource, SharedMarketData};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, ExecutableCommand};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io;
use std::time::Duration;
use tracker_application::config::Config;
use tracker_application::dashboard::DashboardOptions;
use tracker_domain::value_objects::ticker::TickerSymbol;
use tracker_domain::value_objects::window::HistoryWindow;

const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

pub struct TuiOpts {
    pub config: Config,
    pub log_buffer: logging::SharedLogBuffer,
    pub market_data: SharedMarketData,
    pub catalog_source: SharedCatalogSource,
    pub initial_symbol: Option<TickerSymbol>,
    pub window: HistoryWindow,
}

pub fn run(opts: TuiOpts) -> Result<(), String> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_time()
        .build()
        .map_err(|err| format!("failed to init tokio runtime: {err}"))?;
    // Blocking HTTP clients must not be dropped on the async runtime.
    let adapters = (opts.market_data.clone(), opts.catalog_source.clone());
    let result = runtime.block_on(run_async(opts));
    shut_down(runtime);
    drop(adapters);
    result
}

/// A load still in flight must not hold up exit.
fn shut_down(runtime: tokio::runtime::Runtime) {
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
}

async fn run_async(opts: TuiOpts) -> Result<(), String> {
    enable_raw_mode().map_err(|err| format!("failed to enable raw mode: {err}"))?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .map_err(|err| format!("failed to enter alternate screen: {err}"))?;
    stdout
        .execute(crossterm::terminal::Clear(
            crossterm::terminal::ClearType::All,
        ))
        .map_err(|err| format!("failed to clear screen: {err}"))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal =
        Terminal::new(backend).map_err(|err| format!("failed to init terminal: {err}"))?;
    terminal
        .hide_cursor()
        .map_err(|err| format!("failed to hide cursor: {err}"))?;

    let result = run_loop(&mut terminal, opts).await;

    let mut stdout = io::stdout();
    let _ = execute!(stdout, LeaveAlternateScreen, DisableMouseCapture);
    let _ = disable_raw_mode();
    let _ = terminal.show_cursor();

    result
}

async fn run_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    opts: TuiOpts,
) -> Result<(), String> {
    let (event_tx, mut event_rx) = tokio::sync::mpsc::unbounded_channel();
    let task_runner = tasks::TaskRunner::new(
        event_tx.clone(),
        opts.market_data,
        opts.catalog_source,
        opts.config.catalog.clone(),
        DashboardOptions {
            load_profile: opts.config.provider.load_profile,
        },
    );
    let mut app = App::new(
        task_runner,
        opts.log_buffer,
        opts.initial_symbol,
        opts.window,
    );

    app.spawn_input_reader(event_tx);
    app.start();

    let mut tick = tokio::time::interval(Duration::from_millis(100));

    loop {
        if app.dirty {
            terminal
                .draw(|frame| ui::draw(frame, &app))
                .map_err(|err| format!("terminal draw failed: {err}"))?;
            app.dirty = false;
        }

        tokio::select! {
            _ = tick.tick() => {
                app.on_tick();
            }
            maybe_event = event_rx.recv() => {
                let Some(event) = maybe_event else { return Ok(()); };
                if app.on_event(event)? { return Ok(()); }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{shut_down, SHUTDOWN_GRACE};
    use std::time::{Duration, Instant};

    #[test]
    fn shutdown_does_not_wait_for_slow_blocking_loads() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_time()
            .build()
            .expect("runtime");
        runtime.spawn_blocking(|| std::thread::sleep(Duration::from_secs(10)));

        let start = Instant::now();
        shut_down(runtime);

        assert!(start.elapsed() < SHUTDOWN_GRACE + Duration::from_secs(2));
    }
}
