//! CLI argument definitions for closebook.
//!
//! | Command | Description |
//! |---------|-------------|
//! | `search` | Search instruments by company name |
//! | `resolve` | Turn a list of company names into a name/FIGI lookup table |
//! | `download` | Write multi-year daily close tables per instrument |
//!
//! # Examples
//!
//! ```bash
//! closebook search sberbank --kind share
//! closebook resolve --names data/popular_stocks --out data
//! closebook download --instruments data/popular_stocks_figi_name.csv --out data/stocks
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use closebook_core::storage::DEFAULT_LOOKUP_FILE;
use closebook_core::{InstrumentKind, Target};

/// Daily close price tables from the T-Invest API.
#[derive(Debug, Parser)]
#[command(name = "closebook", author, version, about = "Daily close price tables from the T-Invest API")]
pub struct Cli {
    /// Serve deterministic offline data instead of calling the API.
    #[arg(long, global = true, default_value_t = false)]
    pub mock: bool,

    /// Use the sandbox gateway (overrides CLOSEBOOK_TINVEST_TARGET).
    #[arg(long, global = true, default_value_t = false)]
    pub sandbox: bool,

    /// Per-request timeout in milliseconds (overrides CLOSEBOOK_TIMEOUT_MS).
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Pretty-print the JSON summary.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn target_override(&self) -> Option<Target> {
        self.sandbox.then_some(Target::Sandbox)
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search instruments by company name or phrase.
    ///
    ///   closebook search apple
    ///   closebook search apple --kind bond
    Search(SearchArgs),

    /// Resolve a newline-delimited list of company names into a lookup table.
    ///
    ///   closebook resolve --names data/popular_stocks --out data
    Resolve(ResolveArgs),

    /// Download daily closes per year and write one table per instrument.
    ///
    ///   closebook download --instruments data/popular_stocks_figi_name.csv --out data/stocks
    ///   closebook download --instruments lookup.csv --out out --years 2019,2020
    Download(DownloadArgs),
}

/// Instrument type filter accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindFilter {
    Share,
    Bond,
    Etf,
    Currency,
    Future,
    Option,
    Sp,
}

impl From<KindFilter> for InstrumentKind {
    fn from(value: KindFilter) -> Self {
        match value {
            KindFilter::Share => Self::Share,
            KindFilter::Bond => Self::Bond,
            KindFilter::Etf => Self::Etf,
            KindFilter::Currency => Self::Currency,
            KindFilter::Future => Self::Future,
            KindFilter::Option => Self::Option,
            KindFilter::Sp => Self::Sp,
        }
    }
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Company name or phrase.
    pub query: String,

    /// Only return instruments of this type.
    #[arg(long, value_enum)]
    pub kind: Option<KindFilter>,
}

#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// File with one company name per line.
    #[arg(long)]
    pub names: PathBuf,

    /// Directory the lookup table is written to.
    #[arg(long)]
    pub out: PathBuf,

    /// Instrument type to keep.
    #[arg(long, value_enum, default_value_t = KindFilter::Share)]
    pub kind: KindFilter,

    /// Lookup table file name.
    #[arg(long, default_value = DEFAULT_LOOKUP_FILE)]
    pub file_name: String,
}

#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// Lookup table (`name,figi`) produced by `resolve`.
    #[arg(long)]
    pub instruments: PathBuf,

    /// Directory the per-instrument tables are written to.
    #[arg(long)]
    pub out: PathBuf,

    /// First year of the range (inclusive).
    #[arg(long, default_value_t = 2000)]
    pub from_year: i32,

    /// Last year of the range (inclusive).
    #[arg(long, default_value_t = 2022)]
    pub to_year: i32,

    /// Explicit comma-separated years; replaces the range.
    #[arg(long, value_delimiter = ',')]
    pub years: Option<Vec<i32>>,
}
