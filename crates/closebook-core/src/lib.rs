//! # closebook core
//!
//! Builds per-year daily close tables from the T-Invest market-data API.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | T-Invest REST adapter (live and offline) |
//! | [`batch`] | Multi-instrument download with skip-and-continue |
//! | [`config`] | Environment-driven client configuration |
//! | [`data_source`] | Collaborator trait, requests and [`SourceError`] |
//! | [`domain`] | Identifiers, quotations, year series and price tables |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`resolver`] | Company name to instrument resolution |
//! | [`series`] | Year-series construction and joining |
//! | [`storage`] | CSV persistence |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use closebook_core::{collect_price_table, Figi, TInvestAdapter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = TInvestAdapter::default();
//!     let figi = Figi::parse("BBG004730N88")?;
//!     let table = collect_price_table(&adapter, &figi, &[2020, 2021]).await?;
//!     println!("{} rows", table.row_count());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Collaborator failures surface as [`SourceError`]; the batch layer skips an
//! instrument on those and aborts on any other [`CoreError`].
//!
//! ```rust
//! use closebook_core::{SourceError, SourceErrorKind};
//!
//! fn describe(error: &SourceError) -> &'static str {
//!     match error.kind() {
//!         SourceErrorKind::RateLimited => "slow down",
//!         SourceErrorKind::NotFound => "unknown instrument",
//!         _ => "request failed",
//!     }
//! }
//! ```

pub mod adapters;
pub mod batch;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod resolver;
pub mod series;
pub mod storage;

pub use adapters::{TInvestAdapter, MAX_DAILY_CANDLE_DAYS};

pub use batch::{download_history, year_range, BatchReport, SkippedInstrument, WrittenTable};

pub use config::{ClientConfig, Target};

pub use data_source::{
    CandlesRequest, MarketDataSource, SearchBatch, SearchRequest, SourceError, SourceErrorKind,
    SourceFuture,
};

pub use domain::{
    adjusted_close, days_of_year, first_day, validate_year, DailyCandle, DayLabel, Figi,
    Instrument, InstrumentKind, InstrumentRef, PriceTable, Quotation, YearSeries, MAX_YEAR,
    MIN_YEAR, NANO_PER_UNIT,
};

pub use error::{CoreError, ValidationError};

pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient,
    ReqwestHttpClient, DEFAULT_TIMEOUT_MS,
};

pub use resolver::{find_instruments, resolve_names, ResolveOutcome, ResolveReport};

pub use series::{build_year_series, collect_price_table};
