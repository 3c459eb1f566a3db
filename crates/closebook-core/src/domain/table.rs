use std::collections::BTreeMap;

use time::Date;

use super::calendar::{days_of_year, DayLabel};
use crate::ValidationError;

/// Close prices for one calendar year keyed by "MM-DD".
///
/// Every day of the year has a row; days without a candle stay `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct YearSeries {
    year: i32,
    values: BTreeMap<DayLabel, Option<f64>>,
}

impl YearSeries {
    /// Pre-allocates all 365/366 labels of `year` as missing.
    pub fn empty(year: i32) -> Result<Self, ValidationError> {
        let values = days_of_year(year)?
            .into_iter()
            .map(|date| (DayLabel::from_date(date), None))
            .collect();
        Ok(Self { year, values })
    }

    pub const fn year(&self) -> i32 {
        self.year
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Stores `price` for `date`. Returns `false` when the date belongs to another year.
    pub fn set(&mut self, date: Date, price: f64) -> bool {
        if date.year() != self.year {
            return false;
        }
        self.values.insert(DayLabel::from_date(date), Some(price));
        true
    }

    pub fn get(&self, label: DayLabel) -> Option<f64> {
        self.values.get(&label).copied().flatten()
    }

    pub fn contains(&self, label: DayLabel) -> bool {
        self.values.contains_key(&label)
    }

    pub fn labels(&self) -> impl Iterator<Item = DayLabel> + '_ {
        self.values.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DayLabel, Option<f64>)> + '_ {
        self.values.iter().map(|(label, value)| (*label, *value))
    }

    /// Number of days carrying a price.
    pub fn observed_days(&self) -> usize {
        self.values.values().filter(|value| value.is_some()).count()
    }
}

/// Wide table: one column per requested year, rows aligned on "MM-DD".
///
/// Rows are the union of the joined series' labels in calendar order, so a
/// leap-year column brings an `02-29` row that stays empty in other columns.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    years: Vec<i32>,
    rows: BTreeMap<DayLabel, Vec<Option<f64>>>,
}

impl PriceTable {
    pub fn from_series(series: YearSeries) -> Self {
        let mut table = Self {
            years: Vec::new(),
            rows: BTreeMap::new(),
        };
        table.join(series);
        table
    }

    /// Appends `series` as a new right-most column.
    pub fn join(&mut self, series: YearSeries) {
        let width = self.years.len();
        for label in series.labels() {
            self.rows.entry(label).or_insert_with(|| vec![None; width]);
        }
        for (label, cells) in self.rows.iter_mut() {
            cells.push(series.get(*label));
        }
        self.years.push(series.year());
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn get(&self, label: DayLabel, year: i32) -> Option<f64> {
        let column = self.years.iter().position(|candidate| *candidate == year)?;
        self.rows.get(&label).and_then(|cells| cells[column])
    }

    pub fn rows(&self) -> impl Iterator<Item = (DayLabel, &[Option<f64>])> + '_ {
        self.rows
            .iter()
            .map(|(label, cells)| (*label, cells.as_slice()))
    }
}
