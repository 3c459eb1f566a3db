//! Market-data collaborator trait and request/response types.
//!
//! | Operation | Request | Response |
//! |-----------|---------|----------|
//! | Daily candles | [`CandlesRequest`] | `Vec<DailyCandle>` |
//! | Instrument metadata | [`Figi`] | [`Instrument`] |
//! | Instrument search | [`SearchRequest`] | [`SearchBatch`] |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime, Time};

use crate::{first_day, DailyCandle, Figi, Instrument, ValidationError};

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Unavailable,
    RateLimited,
    InvalidRequest,
    NotFound,
    Unauthorized,
    Internal,
}

/// Structured error raised by a [`MarketDataSource`].
///
/// This is the one error kind the batch layer recovers from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::NotFound,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unauthorized,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether a later attempt could succeed. Informational only; nothing retries.
    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::NotFound => "source.not_found",
            SourceErrorKind::Unauthorized => "source.unauthorized",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

impl From<ValidationError> for SourceError {
    fn from(error: ValidationError) -> Self {
        Self::invalid_request(error.to_string())
    }
}

/// Daily candle request over the half-open date window `[from, to)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandlesRequest {
    pub figi: Figi,
    pub from: Date,
    pub to: Date,
}

impl CandlesRequest {
    pub fn new(figi: Figi, from: Date, to: Date) -> Result<Self, SourceError> {
        if from >= to {
            return Err(SourceError::invalid_request(format!(
                "candles window is empty: from {from} must precede to {to}"
            )));
        }
        Ok(Self { figi, from, to })
    }

    /// Covers January 1 through December 31 of `year`.
    pub fn for_year(figi: Figi, year: i32) -> Result<Self, SourceError> {
        let from = first_day(year)?;
        let to = from
            .replace_year(year + 1)
            .map_err(|error| SourceError::invalid_request(error.to_string()))?;
        Self::new(figi, from, to)
    }

    pub fn from_utc(&self) -> OffsetDateTime {
        PrimitiveDateTime::new(self.from, Time::MIDNIGHT).assume_utc()
    }

    pub fn to_utc(&self) -> OffsetDateTime {
        PrimitiveDateTime::new(self.to, Time::MIDNIGHT).assume_utc()
    }

    pub fn contains(&self, date: Date) -> bool {
        self.from <= date && date < self.to
    }

    pub fn span_days(&self) -> i64 {
        (self.to - self.from).whole_days()
    }

    /// Consecutive sub-requests covering the same window, each at most `max_days` long.
    pub fn split(&self, max_days: u32) -> Result<Vec<CandlesRequest>, SourceError> {
        if max_days == 0 {
            return Err(SourceError::invalid_request("candles window limit must be positive"));
        }

        let step = Duration::days(i64::from(max_days));
        let mut windows = Vec::new();
        let mut start = self.from;
        while start < self.to {
            let end = start
                .checked_add(step)
                .map_or(self.to, |end| end.min(self.to));
            windows.push(Self::new(self.figi.clone(), start, end)?);
            start = end;
        }
        Ok(windows)
    }
}

/// Free-text instrument search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Result<Self, SourceError> {
        let query = query.into();
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(SourceError::invalid_request(
                "search query must not be empty",
            ));
        }
        Ok(Self {
            query: trimmed.to_owned(),
        })
    }
}

/// Instruments returned for one search query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchBatch {
    pub query: String,
    pub results: Vec<Instrument>,
}

pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// External market-data collaborator.
///
/// Implementations must be `Send + Sync`; callers drive them sequentially.
pub trait MarketDataSource: Send + Sync {
    /// Short provider name used in log fields.
    fn name(&self) -> &'static str;

    /// Fetches daily candles for the request window in chronological order.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] on rate limiting, an unknown identifier, or
    /// transport failure.
    fn candles<'a>(&'a self, req: CandlesRequest) -> SourceFuture<'a, Vec<DailyCandle>>;

    /// Looks up instrument metadata, including the lot size.
    fn instrument_by_figi<'a>(&'a self, figi: &'a Figi) -> SourceFuture<'a, Instrument>;

    /// Searches instruments by company name or phrase.
    fn find_instrument<'a>(&'a self, req: SearchRequest) -> SourceFuture<'a, SearchBatch>;
}
