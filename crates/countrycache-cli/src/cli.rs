//! CLI argument definitions for countrycache.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `serve` | Run the HTTP query API |
//! | `refresh` | Run one refresh cycle |
//! | `status` | Total count and last refresh time |
//! | `countries` | List countries with optional filters |
//! | `show` | Show one country |
//! | `delete` | Delete one country |
//! | `regions` | Per-region totals |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--home` | `$COUNTRYCACHE_HOME` | Data directory |
//! | `--db-path` | `<home>/cache/countries.duckdb` | Database file |
//! | `--timeout-ms` | `20000` | Per-source request timeout |
//! | `--gdp-multiplier` | random per record | Fixed GDP multiplier |
//! | `--pretty` | `false` | Pretty-print JSON output |

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "countrycache",
    author,
    version,
    about = "Country and exchange-rate cache with a query API"
)]
pub struct Cli {
    /// Data directory (overrides COUNTRYCACHE_HOME).
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,

    /// DuckDB database file (overrides COUNTRYCACHE_DB_PATH).
    #[arg(long, global = true)]
    pub db_path: Option<PathBuf>,

    /// Per-source request timeout in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Use a fixed GDP multiplier instead of a random draw per record.
    #[arg(long, global = true)]
    pub gdp_multiplier: Option<f64>,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP query API.
    ///
    ///   countrycache serve --bind 127.0.0.1:8000
    Serve(ServeArgs),

    /// Fetch both sources and upsert every country.
    Refresh,

    /// Show the total country count and last refresh time.
    Status,

    /// List countries.
    ///
    ///   countrycache countries --region Africa --sort gdp_desc
    Countries(CountriesArgs),

    /// Show one country (case-insensitive).
    Show(NameArgs),

    /// Delete one country (case-insensitive).
    Delete(NameArgs),

    /// Show per-region totals.
    Regions,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Listen address (overrides COUNTRYCACHE_BIND).
    #[arg(long)]
    pub bind: Option<String>,
}

#[derive(Debug, Args)]
pub struct CountriesArgs {
    #[arg(long)]
    pub region: Option<String>,

    /// Currency code.
    #[arg(long)]
    pub currency: Option<String>,

    /// gdp_desc or gdp_asc.
    #[arg(long)]
    pub sort: Option<String>,
}

#[derive(Debug, Args)]
pub struct NameArgs {
    pub name: String,
}
