//! Vietnamese equity data CLI.
//!
//! # Usage
//!
//! ```bash
//! # Classify tickers
//! vnquant classify VNM AAPL SHS.HNX
//!
//! # Daily prices for Vinamilk, served from the CSV cache when possible
//! vnquant prices -s VNM -f 2023-01-01 -t 2023-12-31
//!
//! # Annual income statements
//! vnquant income VNM --annual
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use vnquant::{
    CsvFileCache, DataConfig, FetchStatus, PriceCache, PriceReport, ReportPeriod, VnQuantUtils,
    get_vnquant_data, get_vnquant_data_online, to_csv_string, write_csv,
};

#[derive(Debug, Parser)]
#[command(name = "vnquant")]
#[command(about = "Vietnamese stock data with Yahoo-style columns and a CSV cache", long_about = None)]
#[command(version)]
struct Cli {
    /// Cache root directory (overrides VNQUANT_DATA_CACHE_DIR)
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Report whether each symbol looks like a Vietnamese stock
    Classify {
        /// Ticker symbols (e.g. VNM, SHS.HNX)
        #[arg(required = true)]
        symbols: Vec<String>,
    },

    /// Daily OHLCV prices with a status header
    Prices {
        /// Ticker symbol (e.g. VNM)
        #[arg(short, long)]
        symbol: String,

        /// Start date (YYYY-MM-DD)
        #[arg(short = 'f', long)]
        from: String,

        /// End date (YYYY-MM-DD)
        #[arg(short, long)]
        to: String,

        /// Skip the cache
        #[arg(long, default_value = "false")]
        no_cache: bool,

        /// Also write the frame to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Characters to print (0 prints everything; default from config)
        #[arg(long)]
        preview: Option<usize>,
    },

    /// Placeholder descriptive record for a ticker
    Info {
        /// Ticker symbol
        symbol: String,
    },

    /// Income statement, most recent period first
    Income {
        /// Ticker symbol
        symbol: String,

        /// Annual reports instead of quarterly
        #[arg(long, default_value = "false")]
        annual: bool,

        /// Maximum number of periods
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Remove cached price files
    ClearCache,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = DataConfig::from_env().context("invalid VNQUANT_* configuration")?;
    if let Some(dir) = cli.cache_dir {
        config = config.with_data_cache_dir(dir);
    }
    debug!(?config, "Loaded configuration");

    match cli.command {
        Commands::Classify { symbols } => {
            for symbol in symbols {
                println!("{symbol}\t{}", VnQuantUtils::is_vn_stock(&symbol));
            }
        }

        Commands::Prices {
            symbol,
            from,
            to,
            no_cache,
            output,
            preview: chars,
        } => {
            let utils = VnQuantUtils::vndirect(&config)?;
            let report = if no_cache {
                get_vnquant_data_online(&utils, &symbol, &from, &to).await
            } else {
                let cache = CsvFileCache::new(&config.data_cache_dir)?;
                get_vnquant_data(&utils, &cache, &symbol, &from, &to).await
            };

            let chars = chars.unwrap_or(config.preview_chars);
            if chars == 0 {
                println!("{}", report.render());
            } else {
                println!("{}", report.preview(chars));
            }

            if report.status == FetchStatus::Error {
                std::process::exit(1);
            }

            if let Some(path) = output {
                save_report(&report, &path)?;
            }
        }

        Commands::Info { symbol } => {
            let info = VnQuantUtils::get_stock_info(&symbol);
            println!("symbol:     {}", info.symbol);
            println!("short name: {}", info.short_name);
            println!("market:     {}", info.market);
            println!("exchange:   {}", info.exchange);
            println!("vietnamese: {}", VnQuantUtils::is_vn_stock(&symbol));
        }

        Commands::Income {
            symbol,
            annual,
            limit,
        } => {
            let period = if annual {
                ReportPeriod::Annual
            } else {
                ReportPeriod::Quarter
            };
            let utils = VnQuantUtils::vndirect(&config)?;
            let df = utils
                .get_income_stmt_for(&symbol, period, limit)
                .await
                .with_context(|| format!("failed to retrieve income statement for {symbol}"))?;

            if df.height() == 0 {
                println!("No income statement found for symbol '{symbol}'");
            } else {
                print!("{}", to_csv_string(&df)?);
            }
        }

        Commands::ClearCache => {
            let cache = CsvFileCache::new(&config.data_cache_dir)?;
            let removed = cache.clear().await?;
            info!(dir = %cache.dir().display(), removed, "Cleared price cache");
            println!("Removed {removed} cached files from {}", cache.dir().display());
        }
    }

    Ok(())
}

fn save_report(report: &PriceReport, path: &std::path::Path) -> anyhow::Result<()> {
    if !report.status.has_data() {
        warn!(path = %path.display(), status = %report.status, "Nothing to save");
        return Ok(());
    }
    write_csv(path, &report.data)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), rows = report.len(), "Saved price data");
    Ok(())
}
