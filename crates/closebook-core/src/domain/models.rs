use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Figi, Quotation, ValidationError};

/// Instrument type as reported by the broker's instrument search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentKind {
    Share,
    Bond,
    Etf,
    Currency,
    Future,
    Option,
    Sp,
    Other,
}

impl InstrumentKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Share => "share",
            Self::Bond => "bond",
            Self::Etf => "etf",
            Self::Currency => "currency",
            Self::Future => "future",
            Self::Option => "option",
            Self::Sp => "sp",
            Self::Other => "other",
        }
    }

    /// Lenient mapping for upstream payloads; unknown types become [`InstrumentKind::Other`].
    pub fn from_api(value: &str) -> Self {
        value.parse().unwrap_or(Self::Other)
    }
}

impl Display for InstrumentKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstrumentKind {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "share" => Ok(Self::Share),
            "bond" => Ok(Self::Bond),
            "etf" => Ok(Self::Etf),
            "currency" => Ok(Self::Currency),
            "future" | "futures" => Ok(Self::Future),
            "option" => Ok(Self::Option),
            "sp" => Ok(Self::Sp),
            other => Err(ValidationError::InvalidInstrumentKind {
                value: other.to_owned(),
            }),
        }
    }
}

/// Instrument record returned by search and metadata lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub figi: Figi,
    pub name: String,
    pub ticker: Option<String>,
    pub kind: InstrumentKind,
    /// Units per traded lot. Search results may omit it.
    pub lot: Option<u32>,
}

impl Instrument {
    pub fn new(figi: Figi, name: impl Into<String>, kind: InstrumentKind) -> Self {
        Self {
            figi,
            name: name.into(),
            ticker: None,
            kind,
            lot: None,
        }
    }

    pub fn with_ticker(mut self, ticker: impl Into<String>) -> Self {
        self.ticker = Some(ticker.into());
        self
    }

    pub fn with_lot(mut self, lot: u32) -> Self {
        self.lot = Some(lot);
        self
    }

    pub fn to_ref(&self) -> InstrumentRef {
        InstrumentRef::new(self.name.clone(), self.figi.clone())
    }
}

/// Display name paired with the identifier used to key fetches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentRef {
    pub name: String,
    pub figi: Figi,
}

impl InstrumentRef {
    pub fn new(name: impl Into<String>, figi: Figi) -> Self {
        Self {
            name: name.into(),
            figi,
        }
    }
}

/// One trading day's close, in broker-native units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCandle {
    pub date: Date,
    pub close: Quotation,
}

impl DailyCandle {
    pub const fn new(date: Date, close: Quotation) -> Self {
        Self { date, close }
    }
}
