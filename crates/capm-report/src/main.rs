//! capm-report: CAPM beta, alpha and expected return for a handful of stocks.
//!
//! Reads already-downloaded daily closing prices from `<data-dir>/<SYMBOL>.csv`
//! (one file per stock plus one for the benchmark index), aligns them on
//! common trading days and prints the beta and CAPM return tables.
//!
//! Usage:
//!   capm-report                                  # CAPM_* environment / .env
//!   capm-report --stocks AAPL MSFT NVDA --years 3
//!   capm-report --data-dir prices --json

mod config;
mod csv_source;
mod pipeline;
mod render;

use anyhow::Result;
use capm_analysis::normalize;
use capm_core::PriceTable;

use config::{OutputFormat, ReportConfig};
use csv_source::CsvPriceSource;
use pipeline::build_report;

/// Rows shown from each end of the aligned price table
const PREVIEW_ROWS: usize = 5;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let mut config = ReportConfig::from_env()?;
    config.apply_args(&args)?;
    config.validate()?;

    tracing::info!(
        "capm-report: stocks={:?}, benchmark={}, years={}, risk_free_rate={}, data_dir={}",
        config.stocks,
        config.benchmark,
        config.years,
        config.risk_free_rate,
        config.data_dir.display()
    );

    run(&config)
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("capm_report=info,capm_analysis=info"));
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    // Logs go to stderr so stdout stays clean for the report itself
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn run(config: &ReportConfig) -> Result<()> {
    let source = CsvPriceSource::new(&config.data_dir);
    let run = build_report(&source, config)?;

    match config.output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&run.report)?);
        }
        OutputFormat::Table => {
            print_prices(&run.prices)?;
            println!();
            print!("{}", render::render_report(&run.report));
            if !run.skipped.is_empty() {
                println!();
                print!("{}", render::render_failures(&run.skipped));
            }
        }
    }

    Ok(())
}

fn print_prices(prices: &PriceTable) -> Result<()> {
    print!("{}", render::render_table("Dataframe head", &prices.head(PREVIEW_ROWS), 2));
    println!();
    print!("{}", render::render_table("Dataframe tail", &prices.tail(PREVIEW_ROWS), 2));
    println!();

    let normalized = normalize(prices)?;
    print!(
        "{}",
        render::render_table("Price of all the Stocks (After Normalizing), latest", &normalized.tail(1), 4)
    );
    Ok(())
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  capm-report [--stocks SYM ...] [--years N] [--data-dir PATH]");
    eprintln!("              [--benchmark NAME] [--risk-free-rate R] [--json] [--fail-fast]");
    eprintln!();
    eprintln!("Environment (also read from .env):");
    eprintln!("  CAPM_DATA_DIR         directory of <SYMBOL>.csv files (default: data)");
    eprintln!("  CAPM_STOCKS           comma-separated stocks (default: TSLA,AAPL,AMZN,GOOGL)");
    eprintln!("  CAPM_BENCHMARK        benchmark series (default: sp500)");
    eprintln!("  CAPM_YEARS            years of history, 1-10 (default: 1)");
    eprintln!("  CAPM_RISK_FREE_RATE   annual risk-free rate, fractional (default: 0)");
    eprintln!("  CAPM_TRADING_DAYS     trading days per year (default: 252)");
    eprintln!("  CAPM_OUTPUT           table or json (default: table)");
    eprintln!("  CAPM_FAIL_FAST        abort on the first failing stock (default: false)");
}
