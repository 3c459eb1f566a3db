//! Behavior tests for the T-Invest REST adapter against a recording transport.

mod support;

use std::sync::Arc;

use closebook_core::{
    build_year_series, CandlesRequest, ClientConfig, DayLabel, HttpError, HttpResponse,
    InstrumentKind, MarketDataSource, NoopHttpClient, SearchRequest, SourceErrorKind,
    TInvestAdapter, Target, MAX_DAILY_CANDLE_DAYS,
};
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::macros::date;
use time::OffsetDateTime;

use support::{figi, RecordingHttpClient};

const BASE_URL: &str = "https://gateway.test/rest";
const SBER: &str = "BBG004730N88";

fn live_adapter(client: &Arc<RecordingHttpClient>) -> TInvestAdapter {
    TInvestAdapter::with_http_client(client.clone(), "t.secret").with_base_url(BASE_URL)
}

fn body_json(body: Option<&String>) -> Value {
    serde_json::from_str(body.expect("request body")).expect("json body")
}

const SBER_INSTRUMENT: &str = r#"{
    "instrument": {
        "figi": "BBG004730N88",
        "name": "Sberbank",
        "ticker": "SBER",
        "instrumentType": "share",
        "lot": 10
    }
}"#;

#[tokio::test]
async fn candles_request_posts_the_year_window_with_bearer_auth() {
    let client = Arc::new(RecordingHttpClient::new().respond(HttpResponse::ok_json(
        r#"{"candles":[
            {"close":{"units":"271","nano":500000000},"time":"2021-03-01T07:00:00Z"},
            {"close":{"units":"270","nano":0},"time":"2021-01-04T07:00:00Z"},
            {"close":{"units":"999","nano":0},"time":"2022-01-03T07:00:00Z"}
        ]}"#,
    )));
    let adapter = live_adapter(&client);

    let request = CandlesRequest::for_year(figi(SBER), 2021).expect("valid request");
    let candles = adapter.candles(request).await.expect("candles must decode");

    let dates = candles.iter().map(|candle| candle.date).collect::<Vec<_>>();
    assert_eq!(dates, vec![date!(2021 - 01 - 04), date!(2021 - 03 - 01)]);
    assert_eq!(candles[1].close.units, 271);
    assert_eq!(candles[1].close.nano, 500_000_000);

    let requests = client.requests();
    assert_eq!(requests.len(), 1);
    let sent = &requests[0];
    assert_eq!(
        sent.url,
        "https://gateway.test/rest/tinkoff.public.invest.api.contract.v1.MarketDataService/GetCandles"
    );
    assert_eq!(
        sent.headers.get("authorization").map(String::as_str),
        Some("Bearer t.secret")
    );

    let body = body_json(sent.body.as_ref());
    assert_eq!(body["figi"], SBER);
    assert_eq!(body["interval"], "CANDLE_INTERVAL_DAY");
    assert!(body["from"].as_str().expect("from").starts_with("2021-01-01T00:00:00"));
    assert!(body["to"].as_str().expect("to").starts_with("2022-01-01T00:00:00"));
}

#[tokio::test]
async fn leap_year_candles_are_fetched_in_windows_within_the_gateway_limit() {
    let client = Arc::new(
        RecordingHttpClient::new()
            .respond(HttpResponse::ok_json(
                r#"{"candles":[{"close":{"units":"10","nano":0},"time":"2020-02-28T07:00:00Z"}]}"#,
            ))
            .respond(HttpResponse::ok_json(
                r#"{"candles":[{"close":{"units":"11","nano":0},"time":"2020-12-31T07:00:00Z"}]}"#,
            )),
    );
    let adapter = live_adapter(&client);

    let request = CandlesRequest::for_year(figi(SBER), 2020).expect("valid request");
    let candles = adapter.candles(request).await.expect("candles must decode");

    let dates = candles.iter().map(|candle| candle.date).collect::<Vec<_>>();
    assert_eq!(dates, vec![date!(2020 - 02 - 28), date!(2020 - 12 - 31)]);

    let windows = client
        .requests()
        .iter()
        .map(|sent| {
            let body = body_json(sent.body.as_ref());
            let parse = |field: &str| {
                OffsetDateTime::parse(body[field].as_str().expect("timestamp"), &Rfc3339)
                    .expect("rfc3339 timestamp")
            };
            (parse("from"), parse("to"))
        })
        .collect::<Vec<_>>();

    assert_eq!(windows.len(), 2);
    for (from, to) in &windows {
        assert!((*to - *from).whole_days() <= i64::from(MAX_DAILY_CANDLE_DAYS));
    }
    assert_eq!(windows[0].0.date(), date!(2020 - 01 - 01));
    assert_eq!(windows[0].1, windows[1].0);
    assert_eq!(windows[1].1.date(), date!(2021 - 01 - 01));
}

#[tokio::test]
async fn instrument_lookup_reads_lot_and_kind() {
    let client = Arc::new(RecordingHttpClient::new().respond(HttpResponse::ok_json(SBER_INSTRUMENT)));
    let adapter = live_adapter(&client);
    let sber = figi(SBER);

    let instrument = adapter
        .instrument_by_figi(&sber)
        .await
        .expect("instrument must decode");

    assert_eq!(instrument.lot, Some(10));
    assert_eq!(instrument.kind, InstrumentKind::Share);
    assert_eq!(instrument.ticker.as_deref(), Some("SBER"));

    let body = body_json(client.requests()[0].body.as_ref());
    assert_eq!(body["idType"], "INSTRUMENT_ID_TYPE_FIGI");
    assert_eq!(body["id"], SBER);
}

#[tokio::test]
async fn instrument_without_lot_is_an_internal_error() {
    let client = Arc::new(RecordingHttpClient::new().respond(HttpResponse::ok_json(
        r#"{"instrument":{"figi":"BBG004730N88","name":"Sberbank","lot":0}}"#,
    )));

    let error = live_adapter(&client)
        .instrument_by_figi(&figi(SBER))
        .await
        .expect_err("zero lot must fail");

    assert_eq!(error.kind(), SourceErrorKind::Internal);
}

#[tokio::test]
async fn search_drops_entries_with_unusable_identifiers() {
    let client = Arc::new(RecordingHttpClient::new().respond(HttpResponse::ok_json(
        r#"{"instruments":[
            {"figi":"BBG004730N88","name":"Sberbank","ticker":"SBER","instrumentType":"share"},
            {"figi":"not a figi","name":"Broken"},
            {"figi":"TCS60A101X76","name":"Tinkoff iMOEX","instrumentType":"etf"}
        ]}"#,
    )));

    let batch = live_adapter(&client)
        .find_instrument(SearchRequest::new("sber").expect("valid query"))
        .await
        .expect("search must decode");

    let kinds = batch
        .results
        .iter()
        .map(|instrument| (instrument.figi.as_str(), instrument.kind))
        .collect::<Vec<_>>();
    assert_eq!(
        kinds,
        vec![
            ("BBG004730N88", InstrumentKind::Share),
            ("TCS60A101X76", InstrumentKind::Etf),
        ]
    );
    assert!(client.requests()[0].url.ends_with("/InstrumentsService/FindInstrument"));
}

#[tokio::test]
async fn http_statuses_map_to_source_error_kinds() {
    let cases = [
        (429, SourceErrorKind::RateLimited),
        (401, SourceErrorKind::Unauthorized),
        (403, SourceErrorKind::Unauthorized),
        (404, SourceErrorKind::NotFound),
        (400, SourceErrorKind::InvalidRequest),
        (503, SourceErrorKind::Unavailable),
    ];

    for (status, kind) in cases {
        let client = Arc::new(RecordingHttpClient::new().respond(HttpResponse::with_status(
            status,
            r#"{"code":8,"message":"limit reached"}"#,
        )));
        let error = live_adapter(&client)
            .instrument_by_figi(&figi(SBER))
            .await
            .expect_err("non-success status must fail");

        assert_eq!(error.kind(), kind, "status {status}");
        assert!(error.message().contains("limit reached"));
    }
}

#[tokio::test]
async fn transport_timeout_is_unavailable() {
    let client = Arc::new(RecordingHttpClient::new().fail(HttpError::timeout("deadline elapsed")));

    let error = live_adapter(&client)
        .find_instrument(SearchRequest::new("sber").expect("valid query"))
        .await
        .expect_err("timeout must fail");

    assert_eq!(error.kind(), SourceErrorKind::Unavailable);
    assert!(error.message().contains("timed out"));
}

#[tokio::test]
async fn malformed_body_is_an_internal_error() {
    let client = Arc::new(RecordingHttpClient::new().respond(HttpResponse::ok_json("not json")));
    let request = CandlesRequest::for_year(figi(SBER), 2021).expect("valid request");

    let error = live_adapter(&client)
        .candles(request)
        .await
        .expect_err("garbage must fail");

    assert_eq!(error.kind(), SourceErrorKind::Internal);
}

#[tokio::test]
async fn year_series_over_live_adapter_scales_by_lot() {
    let client = Arc::new(
        RecordingHttpClient::new()
            .respond(HttpResponse::ok_json(SBER_INSTRUMENT))
            .respond(HttpResponse::ok_json(
                r#"{"candles":[{"close":{"units":"100","nano":500000000},"time":"2021-06-01T07:00:00Z"}]}"#,
            )),
    );

    let series = build_year_series(&live_adapter(&client), &figi(SBER), 2021)
        .await
        .expect("series must build");

    let june_first: DayLabel = "06-01".parse().expect("label");
    assert_eq!(series.get(june_first), Some(1005.0));
    assert_eq!(series.observed_days(), 1);
    assert_eq!(client.requests().len(), 2);
}

#[tokio::test]
async fn mock_transport_keeps_the_adapter_offline() {
    let adapter = TInvestAdapter::with_http_client(Arc::new(NoopHttpClient), "unused");
    assert!(!adapter.is_live());
    assert!(!TInvestAdapter::default().is_live());

    let candles = adapter
        .candles(CandlesRequest::for_year(figi(SBER), 2021).expect("valid request"))
        .await
        .expect("offline candles");
    assert!(!candles.is_empty());
    assert!(candles.iter().all(|candle| candle.date.year() == 2021));
}

#[test]
fn live_adapter_requires_a_token() {
    let config = ClientConfig::default().with_target(Target::Sandbox);
    assert!(TInvestAdapter::from_config(&config).is_err());

    let config = ClientConfig {
        token: Some(String::from("t.secret")),
        ..config
    };
    let adapter = TInvestAdapter::from_config(&config).expect("token present");
    assert!(adapter.is_live());
}
