//! CSV persistence for price tables, the name/FIGI lookup table and name lists.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{CoreError, Figi, InstrumentRef, PriceTable};

pub const DEFAULT_LOOKUP_FILE: &str = "popular_stocks_figi_name.csv";

#[derive(Debug, Serialize, Deserialize)]
struct LookupRow {
    name: String,
    figi: String,
}

/// `{name}_{figi}_{min_year}_{max_year}.csv`, with path separators in the name replaced.
pub fn price_table_file_name(instrument: &InstrumentRef, min_year: i32, max_year: i32) -> String {
    let name = instrument
        .name
        .trim()
        .chars()
        .map(|ch| match ch {
            '/' | '\\' | '\0' => '_',
            other => other,
        })
        .collect::<String>();
    format!("{name}_{}_{min_year}_{max_year}.csv", instrument.figi)
}

/// Writes the table with a blank corner header, one column per year and
/// empty cells for missing prices.
pub fn write_price_table(path: &Path, table: &PriceTable) -> Result<(), CoreError> {
    write_staged(path, |writer| {
        let mut header = Vec::with_capacity(table.years().len() + 1);
        header.push(String::new());
        header.extend(table.years().iter().map(i32::to_string));
        writer.write_record(&header)?;

        for (label, cells) in table.rows() {
            let mut record = Vec::with_capacity(cells.len() + 1);
            record.push(label.to_string());
            record.extend(cells.iter().map(|cell| cell.map(format_price).unwrap_or_default()));
            writer.write_record(&record)?;
        }
        Ok(())
    })
}

pub fn write_lookup_table(path: &Path, instruments: &[InstrumentRef]) -> Result<(), CoreError> {
    write_staged(path, |writer| {
        for instrument in instruments {
            writer.serialize(LookupRow {
                name: instrument.name.clone(),
                figi: instrument.figi.to_string(),
            })?;
        }
        // An empty lookup still gets its header.
        if instruments.is_empty() {
            writer.write_record(["name", "figi"])?;
        }
        Ok(())
    })
}

/// Prices keep a decimal point, so whole values render as `1005.0`.
pub fn format_price(value: f64) -> String {
    format!("{value:?}")
}

pub fn read_lookup_table(path: &Path) -> Result<Vec<InstrumentRef>, CoreError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut instruments = Vec::new();
    for row in reader.deserialize::<LookupRow>() {
        let row = row?;
        instruments.push(InstrumentRef::new(row.name, Figi::parse(&row.figi)?));
    }
    Ok(instruments)
}

/// Newline-delimited company names; blank lines are ignored.
pub fn read_names(path: &Path) -> Result<Vec<String>, CoreError> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect())
}

/// Writes to a sibling `.partial` file and renames it into place, so a failed
/// write never leaves a truncated file under `path`. The staging file is
/// removed when anything fails.
fn write_staged<F>(path: &Path, write: F) -> Result<(), CoreError>
where
    F: FnOnce(&mut csv::Writer<fs::File>) -> Result<(), CoreError>,
{
    let staging = staging_path(path);
    let result = csv::Writer::from_path(&staging)
        .map_err(CoreError::from)
        .and_then(|mut writer| {
            write(&mut writer)?;
            writer.flush()?;
            Ok(())
        })
        .and_then(|()| fs::rename(&staging, path).map_err(CoreError::from));

    if result.is_err() {
        let _ = fs::remove_file(&staging);
    }
    result
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}
