use std::sync::Arc;

use serde::de::{DeserializeOwned, Error as DeError};
use serde::{Deserialize, Deserializer, Serialize};
use time::format_description::well_known::Rfc3339;
use time::{Date, OffsetDateTime, UtcOffset, Weekday};

use crate::config::ClientConfig;
use crate::data_source::{
    CandlesRequest, MarketDataSource, SearchBatch, SearchRequest, SourceError, SourceFuture,
};
use crate::http_client::{HttpAuth, HttpClient, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient};
use crate::{
    DailyCandle, Figi, Instrument, InstrumentKind, Quotation, ValidationError,
};

const CANDLES_PATH: &str = "/tinkoff.public.invest.api.contract.v1.MarketDataService/GetCandles";
const INSTRUMENT_BY_PATH: &str =
    "/tinkoff.public.invest.api.contract.v1.InstrumentsService/GetInstrumentBy";
const FIND_INSTRUMENT_PATH: &str =
    "/tinkoff.public.invest.api.contract.v1.InstrumentsService/FindInstrument";

/// Longest window the gateway accepts for daily candles in one GetCandles call.
pub const MAX_DAILY_CANDLE_DAYS: u32 = 365;

/// T-Invest REST gateway adapter.
///
/// Built with a real transport it calls the public API; the default instance
/// runs offline against a fixed catalog and synthetic weekday candles.
#[derive(Clone)]
pub struct TInvestAdapter {
    http_client: Arc<dyn HttpClient>,
    auth: HttpAuth,
    base_url: String,
    timeout_ms: u64,
    use_real_api: bool,
}

impl Default for TInvestAdapter {
    fn default() -> Self {
        let config = ClientConfig::default();
        Self {
            http_client: Arc::new(NoopHttpClient),
            auth: HttpAuth::None,
            base_url: config.target.base_url().to_owned(),
            timeout_ms: config.timeout_ms,
            use_real_api: false,
        }
    }
}

impl TInvestAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>, token: impl Into<String>) -> Self {
        let use_real_api = !http_client.is_mock();
        Self {
            http_client,
            auth: HttpAuth::BearerToken(token.into()),
            use_real_api,
            ..Self::default()
        }
    }

    /// Live adapter backed by reqwest; fails without a token.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ValidationError> {
        let token = config.require_token()?;
        Ok(
            Self::with_http_client(Arc::new(ReqwestHttpClient::new()), token)
                .with_base_url(config.target.base_url())
                .with_timeout_ms(config.timeout_ms),
        )
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn is_live(&self) -> bool {
        self.use_real_api
    }

    async fn post<T>(&self, path: &'static str, payload: String) -> Result<T, SourceError>
    where
        T: DeserializeOwned,
    {
        let request = HttpRequest::post_json(format!("{}{}", self.base_url, path), payload)
            .with_auth(&self.auth)
            .with_timeout_ms(self.timeout_ms);

        let response = self.http_client.execute(request).await.map_err(|error| {
            if error.timed_out() {
                SourceError::unavailable(format!("t-invest request timed out: {}", error.message()))
            } else {
                SourceError::unavailable(format!("t-invest transport error: {}", error.message()))
            }
        })?;

        if !response.is_success() {
            return Err(status_error(path, &response));
        }

        serde_json::from_str(&response.body).map_err(|error| {
            SourceError::internal(format!("failed to decode t-invest response: {error}"))
        })
    }
}

impl MarketDataSource for TInvestAdapter {
    fn name(&self) -> &'static str {
        "tinvest"
    }

    fn candles<'a>(&'a self, req: CandlesRequest) -> SourceFuture<'a, Vec<DailyCandle>> {
        Box::pin(async move {
            if self.use_real_api {
                self.fetch_real_candles(&req).await
            } else {
                fetch_fake_candles(&req)
            }
        })
    }

    fn instrument_by_figi<'a>(&'a self, figi: &'a Figi) -> SourceFuture<'a, Instrument> {
        Box::pin(async move {
            if self.use_real_api {
                self.fetch_real_instrument(figi).await
            } else {
                fake_instrument(figi)
            }
        })
    }

    fn find_instrument<'a>(&'a self, req: SearchRequest) -> SourceFuture<'a, SearchBatch> {
        Box::pin(async move {
            if self.use_real_api {
                self.execute_real_search(req).await
            } else {
                Ok(execute_fake_search(req))
            }
        })
    }
}

// Real API implementation methods
impl TInvestAdapter {
    async fn fetch_real_candles(&self, req: &CandlesRequest) -> Result<Vec<DailyCandle>, SourceError> {
        let mut candles = Vec::new();
        for window in req.split(MAX_DAILY_CANDLE_DAYS)? {
            let body = CandlesBody {
                figi: window.figi.as_str(),
                from: format_utc(window.from_utc())?,
                to: format_utc(window.to_utc())?,
                interval: "CANDLE_INTERVAL_DAY",
            };
            let response: CandlesResponse = self.post(CANDLES_PATH, encode(&body)?).await?;
            for candle in response.candles {
                candles.push(candle.into_daily()?);
            }
        }

        candles.retain(|candle| req.contains(candle.date));
        candles.sort_by_key(|candle| candle.date);
        candles.dedup_by_key(|candle| candle.date);
        Ok(candles)
    }

    async fn fetch_real_instrument(&self, figi: &Figi) -> Result<Instrument, SourceError> {
        let body = InstrumentByBody {
            id_type: "INSTRUMENT_ID_TYPE_FIGI",
            id: figi.as_str(),
        };
        let response: InstrumentByResponse = self.post(INSTRUMENT_BY_PATH, encode(&body)?).await?;
        let instrument = response.instrument.into_instrument()?;
        if instrument.lot.is_none() {
            return Err(SourceError::internal(format!(
                "instrument {figi} has no positive lot size"
            )));
        }
        Ok(instrument)
    }

    async fn execute_real_search(&self, req: SearchRequest) -> Result<SearchBatch, SourceError> {
        let body = FindInstrumentBody { query: &req.query };
        let response: FindInstrumentResponse =
            self.post(FIND_INSTRUMENT_PATH, encode(&body)?).await?;

        // Entries with identifiers we cannot represent are dropped.
        let results = response
            .instruments
            .into_iter()
            .filter_map(|payload| payload.into_instrument().ok())
            .collect();

        Ok(SearchBatch {
            query: req.query,
            results,
        })
    }
}

fn status_error(path: &str, response: &HttpResponse) -> SourceError {
    let detail = serde_json::from_str::<ApiErrorPayload>(&response.body)
        .ok()
        .and_then(|payload| payload.message)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| format!("status {}", response.status));
    let operation = path.rsplit('/').next().unwrap_or(path);
    let message = format!("t-invest {operation} failed: {detail}");

    match response.status {
        429 => SourceError::rate_limited(message),
        401 | 403 => SourceError::unauthorized(message),
        404 => SourceError::not_found(message),
        400..=499 => SourceError::invalid_request(message),
        _ => SourceError::unavailable(message),
    }
}

fn encode<T: Serialize>(body: &T) -> Result<String, SourceError> {
    serde_json::to_string(body)
        .map_err(|error| SourceError::internal(format!("failed to encode request: {error}")))
}

fn format_utc(value: OffsetDateTime) -> Result<String, SourceError> {
    value
        .format(&Rfc3339)
        .map_err(|error| SourceError::internal(format!("failed to format timestamp: {error}")))
}

// Fake data (offline mode)

fn fixture_catalog() -> Vec<(&'static str, &'static str, &'static str, InstrumentKind, u32)> {
    vec![
        ("BBG000B9XRY4", "Apple", "AAPL", InstrumentKind::Share, 1),
        ("BBG000BPH459", "Microsoft", "MSFT", InstrumentKind::Share, 1),
        ("BBG004730N88", "Sberbank", "SBER", InstrumentKind::Share, 10),
        ("BBG004730RP0", "Gazprom", "GAZP", InstrumentKind::Share, 10),
        ("TCS00A0JXKM3", "Apple 2027 notes", "AAPL27", InstrumentKind::Bond, 1),
        ("TCS60A101X76", "Tinkoff iMOEX", "TMOS", InstrumentKind::Etf, 1),
    ]
}

fn fake_catalog_entry(figi: &Figi) -> Option<Instrument> {
    fixture_catalog()
        .into_iter()
        .find(|(candidate, ..)| *candidate == figi.as_str())
        .and_then(|(figi, name, ticker, kind, lot)| {
            Figi::parse(figi)
                .ok()
                .map(|figi| Instrument::new(figi, name, kind).with_ticker(ticker).with_lot(lot))
        })
}

fn fake_instrument(figi: &Figi) -> Result<Instrument, SourceError> {
    fake_catalog_entry(figi)
        .ok_or_else(|| SourceError::not_found(format!("instrument {figi} not found")))
}

fn execute_fake_search(req: SearchRequest) -> SearchBatch {
    let query = req.query.to_lowercase();
    let results = fixture_catalog()
        .into_iter()
        .filter(|(_, name, ticker, ..)| {
            name.to_lowercase().contains(&query) || ticker.to_lowercase().contains(&query)
        })
        .filter_map(|(figi, name, ticker, kind, lot)| {
            Figi::parse(figi)
                .ok()
                .map(|figi| Instrument::new(figi, name, kind).with_ticker(ticker).with_lot(lot))
        })
        .collect();

    SearchBatch {
        query: req.query,
        results,
    }
}

fn fetch_fake_candles(req: &CandlesRequest) -> Result<Vec<DailyCandle>, SourceError> {
    fake_instrument(&req.figi)?;

    let seed = figi_seed(&req.figi);
    let mut candles = Vec::new();
    let mut day = req.from;
    while day < req.to {
        if is_fake_trading_day(day) {
            let step = seed + u64::from(day.ordinal());
            let units = 50 + (step % 150) as i64;
            let nano = ((step * 7_919) % 100) as i32 * 10_000_000;
            candles.push(DailyCandle::new(day, Quotation { units, nano }));
        }
        day = match day.next_day() {
            Some(next) => next,
            None => break,
        };
    }
    Ok(candles)
}

fn is_fake_trading_day(day: Date) -> bool {
    let weekend = matches!(day.weekday(), Weekday::Saturday | Weekday::Sunday);
    let new_year = day.ordinal() == 1;
    !weekend && !new_year
}

fn figi_seed(figi: &Figi) -> u64 {
    figi.as_str().bytes().fold(17_u64, |acc, byte| {
        acc.wrapping_mul(31).wrapping_add(u64::from(byte))
    }) % 1_000
}

// T-Invest REST payloads

#[derive(Debug, Serialize)]
struct CandlesBody<'a> {
    figi: &'a str,
    from: String,
    to: String,
    interval: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InstrumentByBody<'a> {
    id_type: &'static str,
    id: &'a str,
}

#[derive(Debug, Serialize)]
struct FindInstrumentBody<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiErrorPayload {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandlesResponse {
    #[serde(default)]
    candles: Vec<HistoricCandlePayload>,
}

#[derive(Debug, Deserialize)]
struct HistoricCandlePayload {
    close: QuotationPayload,
    time: String,
}

impl HistoricCandlePayload {
    fn into_daily(self) -> Result<DailyCandle, SourceError> {
        let ts = OffsetDateTime::parse(&self.time, &Rfc3339).map_err(|error| {
            SourceError::internal(format!("invalid candle time '{}': {error}", self.time))
        })?;
        let close = Quotation::new(self.close.units, self.close.nano)
            .map_err(|error| SourceError::internal(error.to_string()))?;
        Ok(DailyCandle::new(ts.to_offset(UtcOffset::UTC).date(), close))
    }
}

#[derive(Debug, Deserialize)]
struct QuotationPayload {
    #[serde(default, deserialize_with = "int64_from_json")]
    units: i64,
    #[serde(default)]
    nano: i32,
}

#[derive(Debug, Deserialize)]
struct InstrumentByResponse {
    instrument: InstrumentPayload,
}

#[derive(Debug, Deserialize)]
struct FindInstrumentResponse {
    #[serde(default)]
    instruments: Vec<InstrumentPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstrumentPayload {
    figi: String,
    name: String,
    #[serde(default)]
    ticker: Option<String>,
    #[serde(default)]
    instrument_type: Option<String>,
    #[serde(default)]
    lot: Option<i32>,
}

impl InstrumentPayload {
    fn into_instrument(self) -> Result<Instrument, SourceError> {
        let figi = Figi::parse(&self.figi)?;
        let kind = self
            .instrument_type
            .as_deref()
            .map(InstrumentKind::from_api)
            .unwrap_or(InstrumentKind::Other);

        let mut instrument = Instrument::new(figi, self.name, kind);
        if let Some(ticker) = self.ticker.filter(|ticker| !ticker.is_empty()) {
            instrument = instrument.with_ticker(ticker);
        }
        if let Some(lot) = self.lot.and_then(|lot| u32::try_from(lot).ok()).filter(|lot| *lot > 0) {
            instrument = instrument.with_lot(lot);
        }
        Ok(instrument)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Int64Repr {
    Number(i64),
    Text(String),
}

/// The REST gateway renders int64 as JSON strings; accept both forms.
fn int64_from_json<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Int64Repr::deserialize(deserializer)? {
        Int64Repr::Number(value) => Ok(value),
        Int64Repr::Text(value) => value.trim().parse().map_err(D::Error::custom),
    }
}
