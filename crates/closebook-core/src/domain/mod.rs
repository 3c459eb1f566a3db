//! # Domain Models
//!
//! Canonical domain types for closebook.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Figi`] | Validated instrument identifier |
//! | [`Quotation`] | Fixed-point `units + nano / 1e9` price |
//! | [`DailyCandle`] | One day's close |
//! | [`Instrument`] | Search / metadata record |
//! | [`InstrumentRef`] | Display name + identifier pair |
//! | [`DayLabel`] | "MM-DD" row label |
//! | [`YearSeries`] | One year of closes keyed by day label |
//! | [`PriceTable`] | Years joined side by side |

mod calendar;
mod figi;
mod models;
mod quotation;
mod table;

pub use calendar::{days_of_year, first_day, validate_year, DayLabel, MAX_YEAR, MIN_YEAR};
pub use figi::Figi;
pub use models::{DailyCandle, Instrument, InstrumentKind, InstrumentRef};
pub use quotation::{adjusted_close, Quotation, NANO_PER_UNIT};
pub use table::{PriceTable, YearSeries};
