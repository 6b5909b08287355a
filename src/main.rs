//! Coin markets dashboard entry point.

use std::net::SocketAddr;
use std::time::Duration;

use clap::{Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use coin_markets::api::{create_router, AppState};
use coin_markets::config::Config;
use coin_markets::market::{CoinGeckoClient, Currency, SortOrder};
use coin_markets::metrics;
use coin_markets::table::{MarketTable, PageSize};
use coin_markets::utils::shutdown_signal;

/// Interval between Prometheus histogram upkeep runs.
const METRICS_UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Paginated, sortable cryptocurrency market dashboard.
#[derive(Parser, Debug)]
#[command(name = "coin-markets")]
#[command(about = "Cryptocurrency market table backed by the CoinGecko markets API")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true, env = "VERBOSE")]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port for the dashboard (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the dashboard (default).
    Serve {
        /// HTTP server port for the dashboard (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Fetch one page of the listing and print it.
    Fetch {
        /// Page number, starting at 1.
        #[arg(long, default_value = "1")]
        page: u32,

        /// Records per page (5, 10, 20, 50 or 100).
        #[arg(long, default_value = "10")]
        page_size: u32,

        /// Quote currency.
        #[arg(long, default_value = "usd")]
        currency: Currency,

        /// Market cap order.
        #[arg(long, default_value = "market-cap-desc")]
        order: SortOrder,
    },

    /// Check configuration validity.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env feeds both clap's env fallbacks and Config
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging; config errors are reported by the command itself
    let mut log_config = Config::load().unwrap_or_default();
    log_config.verbose |= args.verbose;
    let filter = EnvFilter::try_new(log_config.log_filter()).unwrap_or_else(|e| {
        eprintln!("Invalid RUST_LOG {:?}: {}", log_config.rust_log, e);
        EnvFilter::new("info")
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Handle subcommands
    match args.command {
        Some(Command::CheckConfig) => cmd_check_config().await,
        Some(Command::Fetch {
            page,
            page_size,
            currency,
            order,
        }) => cmd_fetch(page, page_size, currency, order).await,
        Some(Command::Serve { port }) => cmd_serve(port.or(args.port)).await,
        None => cmd_serve(args.port).await,
    }
}

/// Load and validate configuration, logging failures.
fn load_config() -> anyhow::Result<Config> {
    info!("Loading configuration...");
    let config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    Ok(config)
}

/// Check configuration validity.
async fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("COIN MARKETS - CONFIGURATION CHECK");
    println!("======================================================================");

    // Load configuration
    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    // Validate configuration
    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    // Build the HTTP client
    print!("Building HTTP client... ");
    match CoinGeckoClient::new(&config) {
        Ok(_) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("HTTP client construction failed"));
        }
    }

    // Show configuration summary
    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Markets API: {}", config.markets_api_url);
    match config.http_timeout_ms {
        Some(ms) => println!("  HTTP Timeout: {}ms", ms),
        None => println!("  HTTP Timeout: none"),
    }
    println!("  Pagination Total: {}", config.pagination_total);
    println!("  Port: {}", config.port);
    println!("  Log Level: {}", config.rust_log);
    println!("  Verbose: {}", config.verbose);
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Fetch one page and print it with the table's columns.
async fn cmd_fetch(
    page: u32,
    page_size: u32,
    currency: Currency,
    order: SortOrder,
) -> anyhow::Result<()> {
    let config = load_config()?;
    let client = CoinGeckoClient::from_config(&config)?;
    let table = MarketTable::with_pagination_total(client, config.pagination_total);

    table.set_currency(currency);
    table.set_sort_order(order);
    let query = table.set_pagination(page, PageSize::try_from(page_size)?)?;

    if let Err(failure) = table.fetch_page(query).await {
        return Err(anyhow::anyhow!(
            "Fetch failed ({}): {}",
            failure.kind,
            failure.message
        ));
    }

    let snapshot = table.snapshot();
    let header: Vec<String> = snapshot.columns.iter().map(|c| c.title.to_string()).collect();
    let rows: Vec<Vec<String>> = snapshot
        .rendered_rows()
        .iter()
        .map(|cells| cells.iter().map(|cell| cell.text().to_string()).collect())
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, text) in widths.iter_mut().zip(row) {
            *width = (*width).max(text.chars().count());
        }
    }

    let print_row = |cells: &[String]| {
        let line: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(text, width)| format!("{:<width$}", text, width = *width))
            .collect();
        println!("{}", line.join("  "));
    };

    println!("======================================================================");
    println!(
        "COINS & MARKETS - page {} ({} per page, {}, {})",
        query.page,
        query.page_size,
        query.currency.label(),
        query.sort_order.label()
    );
    println!("======================================================================");
    print_row(&header);
    println!("----------------------------------------------------------------------");
    for row in &rows {
        print_row(row);
    }
    if rows.is_empty() {
        println!("No data");
    }
    println!("======================================================================");

    Ok(())
}

/// Serve the dashboard until a shutdown signal arrives.
async fn cmd_serve(port_override: Option<u16>) -> anyhow::Result<()> {
    let mut config = load_config()?;

    // Override with CLI args if provided
    if let Some(port) = port_override {
        config.port = port;
    }

    info!("Configuration loaded successfully");
    info!("Markets API: {}", config.markets_api_url);
    info!("Pagination total: {}", config.pagination_total);

    // Initialize metrics
    let prometheus = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            metrics::init_metrics();
            let upkeep = handle.clone();
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(METRICS_UPKEEP_INTERVAL);
                loop {
                    interval.tick().await;
                    upkeep.run_upkeep();
                }
            });
            Some(handle)
        }
        Err(e) => {
            warn!("Prometheus recorder not installed: {}", e);
            None
        }
    };

    // Create the table and mount it
    let client = CoinGeckoClient::from_config(&config)?;
    let table = MarketTable::with_pagination_total(client, config.pagination_total);

    let mount_table = table.clone();
    tokio::spawn(async move {
        if let Some(Err(failure)) = mount_table.mount().await {
            warn!(kind = %failure.kind, "Initial market fetch failed: {}", failure.message);
        }
    });

    let mut app_state = AppState::new(table);
    if let Some(handle) = prometheus {
        app_state = app_state.with_metrics(handle);
    }

    // Start HTTP server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!("Dashboard listening on http://{}", addr);

    axum::serve(listener, create_router(app_state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Dashboard stopped");
    Ok(())
}
