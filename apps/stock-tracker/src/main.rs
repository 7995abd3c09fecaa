use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use stock_tracker::headless::HeadlessArgs;
use stock_tracker::{bootstrap, logging, TuiOpts};
use tracker_application::config::to_toml_pretty;

#[derive(Parser, Debug)]
#[command(name = "stock-tracker")]
#[command(about = "Terminal stock dashboard + optional headless JSON output.", version)]
struct Cli {
    /// Print one dashboard snapshot as JSON and exit.
    #[arg(long)]
    headless: bool,

    /// Config file path (TOML). If omitted, uses env STOCK_TRACKER_CONFIG.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ticker to open first. Defaults to the configured symbol, then the first catalog entry.
    #[arg(long)]
    symbol: Option<String>,

    /// Period label or code, e.g. "1 Year" or 5d.
    #[arg(long)]
    period: Option<String>,

    /// Range start date (YYYY-MM-DD); requires --end.
    #[arg(long)]
    start: Option<String>,

    /// Range end date (YYYY-MM-DD); requires --start.
    #[arg(long)]
    end: Option<String>,

    /// Print the effective config as TOML and exit.
    #[arg(long)]
    print_config: bool,
}

fn main() {
    let cli = Cli::parse();

    let log_buffer = logging::LogBuffer::shared(5000);
    let tracing_result = if cli.headless || cli.print_config {
        init_tracing(std::io::stderr)
    } else {
        init_tracing(logging::LogMakeWriter::new(log_buffer.clone()))
    };
    if let Err(err) = tracing_result {
        fail(err);
    }
    if let Err(err) = init_metrics() {
        fail(err);
    }

    let config_path = bootstrap::resolve_config_path(cli.config);
    let config =
        bootstrap::load_effective_config(config_path.as_deref()).unwrap_or_else(|e| fail(e));

    if cli.print_config {
        match to_toml_pretty(&config) {
            Ok(text) => {
                print!("{text}");
                std::process::exit(0);
            }
            Err(err) => fail(err),
        }
    }

    let window = bootstrap::resolve_window(
        cli.period.as_deref(),
        cli.start.as_deref(),
        cli.end.as_deref(),
        config.dashboard.default_period,
    )
    .unwrap_or_else(|e| fail(e));
    let symbol =
        bootstrap::resolve_symbol(cli.symbol.as_deref(), &config).unwrap_or_else(|e| fail(e));

    let market_data = bootstrap::build_market_data(&config).unwrap_or_else(|e| fail(e));
    let catalog_source = bootstrap::build_catalog_source(&config).unwrap_or_else(|e| fail(e));

    if cli.headless {
        let result = stock_tracker::headless::run_headless(
            &config,
            market_data,
            catalog_source,
            HeadlessArgs { symbol, window },
        );
        match result {
            Ok(json) => {
                println!(
                    "{}",
                    serde_json::to_string(&json)
                        .unwrap_or_else(|_| "{\"status\":\"error\",\"error\":\"json\"}".to_string())
                );
                std::process::exit(0);
            }
            Err(err) => fail(err),
        }
    }

    let opts = TuiOpts {
        config,
        log_buffer,
        market_data,
        catalog_source,
        initial_symbol: symbol,
        window,
    };

    if let Err(err) = stock_tracker::run(opts) {
        fail(err);
    }
}

fn fail(err: String) -> ! {
    eprintln!("error: {err}");
    std::process::exit(1);
}

fn init_tracing<W>(writer: W) -> Result<(), String>
where
    W: for<'a> tracing_subscriber::fmt::MakeWriter<'a> + Send + Sync + 'static,
{
    let filter = std::env::var("STOCK_TRACKER_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(filter)
        .map_err(|err| format!("invalid log filter: {err}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(false)
        .with_writer(writer)
        .init();

    Ok(())
}

#[cfg(feature = "prometheus")]
fn init_metrics() -> Result<Option<SocketAddr>, String> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let Some(raw) = std::env::var("STOCK_TRACKER_METRICS_ADDR").ok() else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }

    let addr: SocketAddr = raw.parse().map_err(|err| {
        format!("invalid STOCK_TRACKER_METRICS_ADDR (expected host:port): {err}")
    })?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|err| format!("failed to install prometheus exporter: {err}"))?;

    tracing::info!(metrics_addr = %addr, "prometheus metrics exporter enabled");
    Ok(Some(addr))
}

#[cfg(not(feature = "prometheus"))]
fn init_metrics() -> Result<Option<SocketAddr>, String> {
    Ok(None)
}
