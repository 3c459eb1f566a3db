use serde::Serialize;
use serde_json::Value;

use closebook_core::storage::read_lookup_table;
use closebook_core::{download_history, year_range, BatchReport, MarketDataSource};

use crate::cli::DownloadArgs;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct DownloadResponseData {
    years: Vec<i32>,
    instruments: usize,
    #[serde(flatten)]
    report: BatchReport,
}

pub async fn run<S>(args: &DownloadArgs, source: &S) -> Result<Value, CliError>
where
    S: MarketDataSource + ?Sized,
{
    let years = match &args.years {
        Some(years) => {
            let mut years = years.clone();
            years.sort_unstable();
            years.dedup();
            years
        }
        None => year_range(args.from_year, args.to_year)?,
    };

    let instruments = read_lookup_table(&args.instruments)?;
    let report = download_history(source, &instruments, &years, &args.out).await?;

    Ok(serde_json::to_value(DownloadResponseData {
        years,
        instruments: instruments.len(),
        report,
    })?)
}
