//! Scripted collaborators shared by the behavior tests.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use closebook_core::{
    CandlesRequest, DailyCandle, Figi, HttpClient, HttpError, HttpRequest, HttpResponse,
    Instrument, InstrumentKind, MarketDataSource, Quotation, SearchBatch, SearchRequest,
    SourceError, SourceFuture,
};
use time::Date;

pub fn figi(value: &str) -> Figi {
    Figi::parse(value).expect("valid figi")
}

pub fn close(units: i64, nano: i32) -> Quotation {
    Quotation::new(units, nano).expect("valid quotation")
}

/// In-memory market data with per-year failures and a call log.
#[derive(Default)]
pub struct ScriptedSource {
    instruments: HashMap<Figi, Instrument>,
    candles: HashMap<(Figi, i32), Vec<DailyCandle>>,
    failures: HashMap<(Figi, i32), SourceError>,
    search_results: HashMap<String, Vec<Instrument>>,
    search_failures: HashMap<String, SourceError>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_share(mut self, figi_value: &str, name: &str, lot: u32) -> Self {
        let instrument = Instrument::new(figi(figi_value), name, InstrumentKind::Share).with_lot(lot);
        self.instruments.insert(instrument.figi.clone(), instrument);
        self
    }

    pub fn with_candle(mut self, figi_value: &str, date: Date, close: Quotation) -> Self {
        self.candles
            .entry((figi(figi_value), date.year()))
            .or_default()
            .push(DailyCandle::new(date, close));
        self
    }

    /// Serves `candles` for the request year regardless of their own dates.
    pub fn with_year_candles(mut self, figi_value: &str, year: i32, candles: Vec<DailyCandle>) -> Self {
        self.candles
            .entry((figi(figi_value), year))
            .or_default()
            .extend(candles);
        self
    }

    pub fn failing(mut self, figi_value: &str, year: i32, error: SourceError) -> Self {
        self.failures.insert((figi(figi_value), year), error);
        self
    }

    pub fn with_search(mut self, query: &str, results: Vec<Instrument>) -> Self {
        self.search_results.insert(query.to_owned(), results);
        self
    }

    pub fn failing_search(mut self, query: &str, error: SourceError) -> Self {
        self.search_failures.insert(query.to_owned(), error);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("calls lock").push(call);
    }
}

impl MarketDataSource for ScriptedSource {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn candles<'a>(&'a self, req: CandlesRequest) -> SourceFuture<'a, Vec<DailyCandle>> {
        Box::pin(async move {
            let year = req.from.year();
            self.record(format!("candles:{}:{year}", req.figi));
            let key = (req.figi.clone(), year);
            if let Some(error) = self.failures.get(&key) {
                return Err(error.clone());
            }
            Ok(self.candles.get(&key).cloned().unwrap_or_default())
        })
    }

    fn instrument_by_figi<'a>(&'a self, figi: &'a Figi) -> SourceFuture<'a, Instrument> {
        Box::pin(async move {
            self.record(format!("instrument:{figi}"));
            self.instruments
                .get(figi)
                .cloned()
                .ok_or_else(|| SourceError::not_found(format!("instrument {figi} not found")))
        })
    }

    fn find_instrument<'a>(&'a self, req: SearchRequest) -> SourceFuture<'a, SearchBatch> {
        Box::pin(async move {
            self.record(format!("search:{}", req.query));
            if let Some(error) = self.search_failures.get(&req.query) {
                return Err(error.clone());
            }
            Ok(SearchBatch {
                results: self.search_results.get(&req.query).cloned().unwrap_or_default(),
                query: req.query,
            })
        })
    }
}

/// Transport that records requests and replays queued responses in order.
#[derive(Default)]
pub struct RecordingHttpClient {
    requests: Mutex<Vec<HttpRequest>>,
    responses: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
}

impl RecordingHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, response: HttpResponse) -> Self {
        self.responses
            .lock()
            .expect("responses lock")
            .push_back(Ok(response));
        self
    }

    pub fn fail(self, error: HttpError) -> Self {
        self.responses
            .lock()
            .expect("responses lock")
            .push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl HttpClient for RecordingHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            self.requests.lock().expect("requests lock").push(request);
            self.responses
                .lock()
                .expect("responses lock")
                .pop_front()
                .unwrap_or_else(|| Ok(HttpResponse::with_status(500, "{}")))
        })
    }
}
