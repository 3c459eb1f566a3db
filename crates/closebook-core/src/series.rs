//! Year-series construction and multi-year joining.

use tracing::debug;

use crate::data_source::{CandlesRequest, MarketDataSource, SourceError};
use crate::{adjusted_close, Figi, PriceTable, YearSeries};

/// Builds one calendar year of lot-adjusted closes for `figi`.
///
/// Every day of the year gets a row; only days with a candle carry a price.
/// Any collaborator failure is returned to the caller unchanged.
pub async fn build_year_series<S>(source: &S, figi: &Figi, year: i32) -> Result<YearSeries, SourceError>
where
    S: MarketDataSource + ?Sized,
{
    let mut series = YearSeries::empty(year)?;
    let request = CandlesRequest::for_year(figi.clone(), year)?;

    let instrument = source.instrument_by_figi(figi).await?;
    let lot = instrument.lot.ok_or_else(|| {
        SourceError::internal(format!("instrument {figi} has no lot size"))
    })?;

    let candles = source.candles(request).await?;
    for candle in &candles {
        series.set(candle.date, adjusted_close(candle.close, lot));
    }

    debug!(
        source = source.name(),
        figi = %figi,
        year,
        lot,
        candles = candles.len(),
        observed = series.observed_days(),
        "built year series"
    );
    Ok(series)
}

/// Joins one [`YearSeries`] per year, in request order, into a [`PriceTable`].
///
/// The first failing year aborts the whole table.
pub async fn collect_price_table<S>(
    source: &S,
    figi: &Figi,
    years: &[i32],
) -> Result<PriceTable, SourceError>
where
    S: MarketDataSource + ?Sized,
{
    let mut table: Option<PriceTable> = None;
    for &year in years {
        let series = build_year_series(source, figi, year).await?;
        match table.as_mut() {
            Some(table) => table.join(series),
            None => table = Some(PriceTable::from_series(series)),
        }
    }

    table.ok_or_else(|| SourceError::invalid_request("at least one year must be requested"))
}
