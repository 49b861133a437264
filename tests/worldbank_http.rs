//! End-to-end tests of the World Bank client and pipeline against a mock HTTP server.

use std::time::Duration;

use httpmock::prelude::*;
use serde_json::json;

use wb_forecast::app::pipeline::{Pipeline, run_with};
use wb_forecast::data::{SeriesSource, WorldBankClient, assemble};
use wb_forecast::domain::{Provenance, RunConfig, SeriesIdentity, Stage};
use wb_forecast::error::ErrorKind;
use wb_forecast::forecast::{AutoArima, NaiveForecaster};

const PATH: &str = "/country/AFG/indicator/NY.GDP.MKTP.CN";

fn identity() -> SeriesIdentity {
    SeriesIdentity::new("afg", "ny.gdp.mktp.cn").unwrap()
}

fn client(server: &MockServer) -> WorldBankClient {
    WorldBankClient::new(server.base_url(), Duration::from_secs(5)).unwrap()
}

fn row(date: &str, value: Option<f64>) -> serde_json::Value {
    json!({
        "indicator": {"id": "NY.GDP.MKTP.CN", "value": "GDP (current LCU)"},
        "country": {"id": "AF", "value": "Afghanistan"},
        "countryiso3code": "AFG",
        "date": date,
        "value": value,
        "unit": "",
        "obs_status": "",
        "decimal": 0
    })
}

/// Two pages, newest-first, with a null at 2018.
fn mock_two_pages(server: &MockServer) -> (httpmock::Mock<'_>, httpmock::Mock<'_>) {
    let page1 = server.mock(|when, then| {
        when.method(GET)
            .path(PATH)
            .query_param("format", "json")
            .query_param("page", "1");
        then.status(200).json_body(json!([
            {"page": 1, "pages": 2, "per_page": 2, "total": 4},
            [row("2020", Some(300.0)), row("2019", Some(200.0))]
        ]));
    });
    let page2 = server.mock(|when, then| {
        when.method(GET)
            .path(PATH)
            .query_param("format", "json")
            .query_param("page", "2");
        then.status(200).json_body(json!([
            {"page": 2, "pages": 2, "per_page": 2, "total": 4},
            [row("2018", None), row("2017", Some(100.0))]
        ]));
    });
    (page1, page2)
}

#[test]
fn fetch_all_concatenates_pages_in_request_order() {
    let server = MockServer::start();
    let (page1, page2) = mock_two_pages(&server);

    let rows = client(&server).fetch_all(&identity()).unwrap();
    let dates: Vec<&str> = rows.iter().map(|r| r.date.as_str()).collect();
    assert_eq!(dates, vec!["2020", "2019", "2018", "2017"]);

    // Metadata request + one request per page.
    page1.assert_hits(2);
    page2.assert_hits(1);

    let series = assemble(rows).unwrap();
    assert_eq!(series.periods(), vec![2017, 2019, 2020]);
    assert_eq!(series.values(), vec![100.0, 200.0, 300.0]);
}

#[test]
fn probe_accepts_a_normal_response() {
    let server = MockServer::start();
    let (page1, _) = mock_two_pages(&server);
    client(&server).probe(&identity()).unwrap();
    page1.assert_hits(1);
}

#[test]
fn probe_rejects_invalid_value_envelope() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/country/ZZZ/indicator/NOPE");
        then.status(200).json_body(json!([
            {"message": [{"id": "120", "key": "Invalid value", "value": "The provided parameter value is not valid"}]}
        ]));
    });

    let id = SeriesIdentity::new("zzz", "nope").unwrap();
    let err = client(&server).probe(&id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unreachable);
    assert!(err.to_string().contains("not valid"), "{err}");
}

#[test]
fn probe_rejects_error_status() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(PATH);
        then.status(503).body("unavailable");
    });
    let err = client(&server).probe(&identity()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unreachable);
}

#[test]
fn probe_treats_other_bodies_as_reachable() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path(PATH);
        then.status(200).body("<html>maintenance notice</html>");
    });
    client(&server).probe(&identity()).unwrap();
    mock.assert_hits(1);
}

#[test]
fn failing_page_mid_fetch_stops_paging() {
    let server = MockServer::start();
    let page1 = server.mock(|when, then| {
        when.method(GET).path(PATH).query_param("page", "1");
        then.status(200).json_body(json!([
            {"page": 1, "pages": 3, "per_page": 1, "total": 3},
            [row("2020", Some(3.0))]
        ]));
    });
    let page2 = server.mock(|when, then| {
        when.method(GET).path(PATH).query_param("page", "2");
        then.status(500).body("internal error");
    });
    let page3 = server.mock(|when, then| {
        when.method(GET).path(PATH).query_param("page", "3");
        then.status(200).json_body(json!([
            {"page": 3, "pages": 3, "per_page": 1, "total": 3},
            [row("2018", Some(1.0))]
        ]));
    });

    let err = client(&server).fetch_all(&identity()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unreachable);
    assert!(err.to_string().contains("page 2"), "{err}");
    page1.assert_hits(2);
    page2.assert_hits(1);
    page3.assert_hits(0);
}

#[test]
fn malformed_metadata_is_a_fetch_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(PATH);
        then.status(200).json_body(json!([{"page": 1}, []]));
    });
    let err = client(&server).fetch_all(&identity()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Fetch);
}

#[test]
fn pipeline_gates_and_exports_over_http() {
    let server = MockServer::start();
    let _mocks = mock_two_pages(&server);

    let mut pipeline = Pipeline::new(identity(), client(&server), NaiveForecaster);
    assert_eq!(
        pipeline.forecast(3).unwrap_err().kind(),
        ErrorKind::NotReady(Stage::Loaded)
    );

    pipeline.load().unwrap();
    assert_eq!(
        pipeline.display_view().unwrap_err().kind(),
        ErrorKind::NotReady(Stage::Forecasted)
    );

    let forecast = pipeline.forecast(3).unwrap();
    assert_eq!(forecast.periods(), vec![2021, 2022, 2023]);

    let display = pipeline.display_view().unwrap();
    assert_eq!(display.rows.len(), 3 + 3 + 1);
    assert_eq!(display.rows[3].point.period, 2020);
    assert_eq!(display.rows[3].provenance, Provenance::Forecast);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pipeline.csv");
    pipeline.export_csv(&path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Period,Value,ProvenanceTag");
    assert_eq!(lines.len(), 1 + 6);
    assert_eq!(lines[3], "2020,300.0,source");
    assert_eq!(lines[4], "2021,300.0,forecast");
}

#[test]
fn run_with_auto_arima_writes_default_named_export() {
    let server = MockServer::start();
    let rows: Vec<serde_json::Value> = (1990..=2020)
        .rev()
        .map(|year| row(&year.to_string(), Some(1000.0 + 10.0 * (year - 1990) as f64)))
        .collect();
    server.mock(|when, then| {
        when.method(GET).path(PATH);
        then.status(200).json_body(json!([{"page": 1, "pages": 1}, rows]));
    });

    let dir = tempfile::tempdir().unwrap();
    let mut config = RunConfig::new(identity());
    config.horizon = 4;
    config.export_path = Some(dir.path().join(identity().export_file_name()));

    let out = run_with(&config, client(&server), AutoArima::default()).unwrap();
    assert_eq!(out.series.len(), 31);
    assert_eq!(out.forecast.periods(), vec![2021, 2022, 2023, 2024]);
    assert_eq!(out.export.rows.len(), 35);
    assert_eq!(out.display.rows.len(), 36);

    // Linear growth of 10 per year continues.
    let first = out.forecast.points()[0].value;
    assert!((first - 1310.0).abs() < 1e-6, "got {first}");

    let exported = dir.path().join("Forecast_AFG_NY.GDP.MKTP.CN.csv");
    assert!(exported.exists());
}
