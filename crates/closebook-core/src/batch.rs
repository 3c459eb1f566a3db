//! Batch download of multi-year price tables with skip-and-continue.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::data_source::MarketDataSource;
use crate::series::collect_price_table;
use crate::storage::{price_table_file_name, write_price_table};
use crate::{validate_year, CoreError, InstrumentRef, ValidationError};

/// Table persisted for one instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenTable {
    pub name: String,
    pub figi: String,
    pub path: PathBuf,
    pub rows: usize,
}

/// Instrument abandoned after a source failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedInstrument {
    pub name: String,
    pub figi: String,
    pub code: &'static str,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub written: Vec<WrittenTable>,
    pub skipped: Vec<SkippedInstrument>,
}

/// Downloads `years` of daily closes for every instrument and writes one CSV
/// table per instrument into `out_dir`.
///
/// A source failure in any year abandons that instrument only: nothing is
/// written for it, the failure is logged, and the next instrument starts.
/// Validation, I/O and CSV errors abort the batch.
pub async fn download_history<S>(
    source: &S,
    instruments: &[InstrumentRef],
    years: &[i32],
    out_dir: &Path,
) -> Result<BatchReport, CoreError>
where
    S: MarketDataSource + ?Sized,
{
    let (min_year, max_year) = year_bounds(years)?;
    fs::create_dir_all(out_dir)?;

    let mut report = BatchReport::default();
    for instrument in instruments {
        let table = match collect_price_table(source, &instrument.figi, years).await {
            Ok(table) => table,
            Err(error) => {
                warn!(
                    instrument = %instrument.name,
                    figi = %instrument.figi,
                    code = error.code(),
                    error = %error,
                    "skipping instrument after failed fetch"
                );
                report.skipped.push(SkippedInstrument {
                    name: instrument.name.clone(),
                    figi: instrument.figi.to_string(),
                    code: error.code(),
                    error: error.message().to_owned(),
                });
                continue;
            }
        };

        let path = out_dir.join(price_table_file_name(instrument, min_year, max_year));
        write_price_table(&path, &table)?;
        info!(
            instrument = %instrument.name,
            figi = %instrument.figi,
            path = %path.display(),
            rows = table.row_count(),
            "wrote price table"
        );
        report.written.push(WrittenTable {
            name: instrument.name.clone(),
            figi: instrument.figi.to_string(),
            path,
            rows: table.row_count(),
        });
    }

    Ok(report)
}

/// Inclusive `from..=to` year list.
pub fn year_range(from: i32, to: i32) -> Result<Vec<i32>, ValidationError> {
    validate_year(from)?;
    validate_year(to)?;
    if from > to {
        return Err(ValidationError::EmptyYears);
    }
    Ok((from..=to).collect())
}

fn year_bounds(years: &[i32]) -> Result<(i32, i32), ValidationError> {
    for &year in years {
        validate_year(year)?;
    }
    let min = years.iter().copied().min().ok_or(ValidationError::EmptyYears)?;
    let max = years.iter().copied().max().ok_or(ValidationError::EmptyYears)?;
    Ok((min, max))
}
