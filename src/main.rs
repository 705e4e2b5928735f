use analytics::{AnalyticsError, CrossoverAnalyzer, PerformanceReport, SignalFrame};
use anyhow::Context;
use clap::{Parser, Subcommand};
use comfy_table::Table;
use configuration::{init_tracing, load_config, AnalysisSettings, Config, WindowOverrides};
use core_types::{PricePoint, PriceSeries, StockRecord};
use database::{connect, run_migrations, DbRepository};
use rust_decimal::Decimal;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use web_server::{error::NO_DATA_MESSAGE, AppState};

/// The main entry point for the crossover application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse();

    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    let _log_guard = init_tracing(&config.logging)?;

    // Execute the appropriate command
    match cli.command {
        Commands::Analyze(args) => handle_analyze(args, &config).await,
        Commands::Import(args) => handle_import(args, &config).await,
        Commands::Serve(args) => handle_serve(args, &config).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Scores a moving-average crossover strategy over daily closing prices.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. A missing file means built-in defaults.
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the crossover analysis and print the performance report.
    Analyze(AnalyzeArgs),
    /// Load daily OHLCV bars from a JSON file into the database.
    Import(ImportArgs),
    /// Serve the performance report over HTTP.
    Serve(ServeArgs),
}

#[derive(Parser, Debug)]
struct AnalyzeArgs {
    /// A JSON array of `{"timestamp", "close"}` objects. Reads the database when omitted.
    #[arg(long)]
    input: Option<PathBuf>,

    #[command(flatten)]
    windows: WindowOverrides,

    /// Also print the per-day moving averages, signals and returns.
    #[arg(long)]
    details: bool,

    /// Print the report as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct ImportArgs {
    /// A JSON array of `{"date", "open", "high", "low", "close", "volume"}` objects.
    #[arg(long)]
    input: PathBuf,
}

#[derive(Parser, Debug)]
struct ServeArgs {
    /// Address to listen on. Defaults to the configured host and port.
    #[arg(long)]
    addr: Option<SocketAddr>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_analyze(args: AnalyzeArgs, config: &Config) -> anyhow::Result<()> {
    let windows = args.windows.resolve(config.analysis);

    let series = match &args.input {
        Some(path) => read_price_file(path)?,
        None => {
            let pool = connect(&config.database).await?;
            let result = DbRepository::new(pool.clone()).get_price_series().await;
            pool.close().await;
            result?
        }
    };

    let analyzer = CrossoverAnalyzer::new();
    let frame = match analyzer.evaluate(series, windows.short_window, windows.long_window) {
        Ok(frame) => frame,
        Err(AnalyticsError::EmptySeries) => {
            tracing::warn!("Analysis skipped: the price series is empty");
            println!("{}", NO_DATA_MESSAGE);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    let report = PerformanceReport::from_frame(&frame)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        if args.details {
            println!("{}", frame_table(&frame));
        }
        println!("{}", report_table(&report, windows));
    }

    Ok(())
}

async fn handle_import(args: ImportArgs, config: &Config) -> anyhow::Result<()> {
    let records = read_stock_file(&args.input)?;

    let pool = connect(&config.database).await?;
    let result = async {
        run_migrations(&pool).await?;
        DbRepository::new(pool.clone()).save_stock_records(&records).await
    }
    .await;
    pool.close().await;

    let saved = result.context("Failed to import stock records")?;
    println!("Imported {} records from {}", saved, args.input.display());
    Ok(())
}

async fn handle_serve(args: ServeArgs, config: &Config) -> anyhow::Result<()> {
    let addr = args.addr.unwrap_or_else(|| config.server.socket_addr());

    let pool = connect(&config.database).await?;
    if let Err(e) = run_migrations(&pool).await {
        pool.close().await;
        return Err(e).context("Failed to run database migrations");
    }

    let state = AppState::new(DbRepository::new(pool.clone()), config.analysis);
    let result = web_server::run_server(addr, state).await;
    pool.close().await;
    result
}

// ==============================================================================
// Input & Output Helpers
// ==============================================================================

fn read_price_file(path: &Path) -> anyhow::Result<PriceSeries> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_price_points(&text).with_context(|| format!("Invalid price file {}", path.display()))
}

fn parse_price_points(text: &str) -> anyhow::Result<PriceSeries> {
    let points: Vec<PricePoint> = serde_json::from_str(text)?;
    Ok(PriceSeries::new(points))
}

fn read_stock_file(path: &Path) -> anyhow::Result<Vec<StockRecord>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    // Each record is validated as it is deserialized.
    serde_json::from_str(&text).with_context(|| format!("Invalid stock file {}", path.display()))
}

fn report_table(report: &PerformanceReport, windows: AnalysisSettings) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec![
        "Windows (short / long)".to_string(),
        format!("{} / {}", windows.short_window, windows.long_window),
    ]);
    table.add_row(vec!["Total return".to_string(), report.total_return.to_string()]);
    table.add_row(vec!["Buy signals".to_string(), report.buy_signal_count.to_string()]);
    table.add_row(vec!["Sell signals".to_string(), report.sell_signal_count.to_string()]);
    table
}

fn frame_table(frame: &SignalFrame) -> Table {
    fn cell(value: Option<Decimal>) -> String {
        value.map(|v| v.round_dp(6).to_string()).unwrap_or_else(|| "-".to_string())
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Date", "Close", "Short MA", "Long MA", "Signal", "Return", "Strategy",
    ]);
    for row in &frame.rows {
        table.add_row(vec![
            row.timestamp.format("%Y-%m-%d").to_string(),
            row.close.to_string(),
            cell(row.short_ma),
            cell(row.long_ma),
            format!("{:?}", row.signal),
            cell(row.period_return),
            cell(row.strategy_return),
        ]);
    }
    table
}
