//! Integration tests for csiweb-client
//!
//! These tests spin up an in-process device stub and use the client against
//! it, so the client stays in sync with the query-string dialect the device
//! actually speaks.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use csiweb_client::testing::{MockLogger, TestServer};
use csiweb_client::{
    Credentials, CsiClient, CsiClientError, OutputFormat, QueryMode, TIME_FORMAT,
};
use serde_json::json;

// =============================================================================
// Test Helpers
// =============================================================================

fn met_table_payload() -> serde_json::Value {
    json!({
        "head": {
            "fields": [
                {"name": "AirTemp_Avg", "units": "Deg C", "process": "Avg"},
                {"name": "BattV_Min", "units": "Volts", "process": "Min"},
                {"name": "MetSENS_Status"}
            ]
        },
        "data": [
            {"time": "2024-06-01T12:00:00", "no": 1042, "vals": [21.5, 12.77, "Ok"]}
        ]
    })
}

async fn start_met_server() -> (Arc<MockLogger>, TestServer) {
    let logger = MockLogger::new();
    logger.insert_table("ASSET_1min", met_table_payload());
    let server = TestServer::start(logger.clone())
        .await
        .expect("Failed to start test server");
    (logger, server)
}

fn client_for(server: &TestServer, tables: &[&str]) -> CsiClient {
    CsiClient::new(
        &server.address(),
        tables.iter().map(|t| t.to_string()).collect(),
    )
    .expect("Failed to build client")
}

// =============================================================================
// Data Query Tests
// =============================================================================

#[tokio::test]
async fn test_most_recent_normalizes_latest_record() {
    let (_logger, server) = start_met_server().await;
    let client = client_for(&server, &["ASSET_1min"]);

    let data = client
        .table_data("ASSET_1min", &QueryMode::most_recent(1))
        .await
        .unwrap();

    assert_eq!(data.time, "2024-06-01T12:00:00");
    let temp = data.reading("AirTemp_Avg").unwrap();
    assert_eq!(temp.as_f64(), Some(21.5));
    assert_eq!(temp.units, "Deg C");
}

#[tokio::test]
async fn test_most_recent_query_string_on_the_wire() {
    let (logger, server) = start_met_server().await;
    let client = client_for(&server, &["ASSET_1min"]);

    client
        .table_data("ASSET_1min", &QueryMode::most_recent(3))
        .await
        .unwrap();

    assert_eq!(
        logger.last_query().as_deref(),
        Some("command=dataquery&uri=dl:ASSET_1min&mode=most-recent&format=json&p1=3")
    );
}

#[tokio::test]
async fn test_since_time_query_string_on_the_wire() {
    let (logger, server) = start_met_server().await;
    let client = client_for(&server, &["ASSET_1min"]);

    let since =
        NaiveDateTime::parse_from_str("2024-06-01T00:00:00.000000", TIME_FORMAT).unwrap();
    client
        .table_records("ASSET_1min", &QueryMode::since_time(since))
        .await
        .unwrap();

    assert_eq!(
        logger.last_query().as_deref(),
        Some(
            "command=dataquery&uri=dl:ASSET_1min&mode=since-time&format=json\
             &p1=2024-06-01T00:00:00.000000"
        )
    );
}

#[tokio::test]
async fn test_missing_units_normalizes_to_empty_string() {
    let (_logger, server) = start_met_server().await;
    let client = client_for(&server, &["ASSET_1min"]);

    let data = client
        .table_data("ASSET_1min", &QueryMode::most_recent(1))
        .await
        .unwrap();

    let status = data.reading("MetSENS_Status").unwrap();
    assert_eq!(status.units, "");
    assert_eq!(status.as_str(), Some("Ok"));
}

#[tokio::test]
async fn test_unknown_table_is_device_error() {
    let (_logger, server) = start_met_server().await;
    let client = client_for(&server, &["Nonexistent"]);

    let err = client
        .table_data("Nonexistent", &QueryMode::most_recent(1))
        .await
        .unwrap_err();

    match &err {
        CsiClientError::DeviceError { status, .. } => assert_eq!(*status, 404),
        other => panic!("expected device error, got {other:?}"),
    }
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_field_names_uses_one_second_backfill() {
    let (logger, server) = start_met_server().await;
    let client = client_for(&server, &["ASSET_1min"]);

    let fields = client.field_names("ASSET_1min").await.unwrap();
    assert_eq!(fields, ["AirTemp_Avg", "BattV_Min", "MetSENS_Status"]);
    assert_eq!(
        logger.last_query().as_deref(),
        Some("command=dataquery&uri=dl:ASSET_1min&mode=backfill&format=json&p1=1")
    );
}

#[tokio::test]
async fn test_table_export_returns_raw_text() {
    let (_logger, server) = start_met_server().await;
    let client = client_for(&server, &["ASSET_1min"]);

    let body = client
        .table_export(
            "ASSET_1min",
            &QueryMode::backfill(Duration::from_secs(60)),
            OutputFormat::Json,
        )
        .await
        .unwrap();

    // Passthrough: the body comes back uninterpreted.
    assert!(body.contains("AirTemp_Avg"));
}

// =============================================================================
// Fan-Out Tests
// =============================================================================

#[tokio::test]
async fn test_fan_out_merges_by_table_name() {
    let logger = MockLogger::new();
    logger.insert_table("ASSET_1min", met_table_payload());
    logger.insert_table(
        "ASSET_1hour",
        json!({
            "head": {"fields": [{"name": "RH_Avg", "units": "%"}]},
            "data": [{"time": "2024-06-01T12:00:00", "vals": [63.2]}]
        }),
    );
    let server = TestServer::start(logger).await.unwrap();
    let client = client_for(&server, &["ASSET_1min", "ASSET_1hour"]);

    let all = client.all_table_data(&QueryMode::most_recent(1)).await;

    assert!(all.is_complete());
    assert_eq!(all.tables.len(), 2);
    assert_eq!(
        all.tables["ASSET_1hour"].reading("RH_Avg").unwrap().as_f64(),
        Some(63.2)
    );
}

#[tokio::test]
async fn test_fan_out_partial_failure_keeps_healthy_tables() {
    let (_logger, server) = start_met_server().await;
    // Second table is not configured on the device.
    let client = client_for(&server, &["ASSET_1min", "Ghost_Table"]);

    let all = client.all_table_data(&QueryMode::most_recent(1)).await;

    assert!(!all.is_complete());
    assert_eq!(all.tables.len(), 1);
    assert!(all.tables.contains_key("ASSET_1min"));
    assert!(matches!(
        all.errors.get("Ghost_Table"),
        Some(CsiClientError::DeviceError { status: 404, .. })
    ));
}

// =============================================================================
// Discovery / Symbol Browse Tests
// =============================================================================

#[tokio::test]
async fn test_discover_populates_tables() {
    let (_logger, server) = start_met_server().await;

    let client = CsiClient::discover(&server.address()).await.unwrap();
    assert_eq!(client.tables(), ["ASSET_1min"]);
}

#[tokio::test]
async fn test_browse_symbols_query_string() {
    let (logger, server) = start_met_server().await;
    let client = client_for(&server, &[]);

    let symbols = client.browse_symbols().await.unwrap();
    assert_eq!(symbols.len(), 1);
    assert_eq!(symbols[0].name, "ASSET_1min");
    assert_eq!(
        logger.last_query().as_deref(),
        Some("command=browsesymbols&uri=dl:&format=json")
    );
}

#[tokio::test]
async fn test_browse_export_rejects_toa5_before_any_network_call() {
    let (logger, server) = start_met_server().await;
    let client = client_for(&server, &[]);

    let result = client.browse_export(OutputFormat::Toa5).await;
    assert!(matches!(
        result,
        Err(CsiClientError::UnsupportedFormat {
            command: "browsesymbols",
            format: "toa5",
        })
    ));
    assert_eq!(logger.hits(), 0);
}

// =============================================================================
// Control / Clock Tests
// =============================================================================

#[tokio::test]
async fn test_clock_check() {
    let (logger, server) = start_met_server().await;
    logger.set_clock("2024-06-01T12:34:56.123456");
    let client = client_for(&server, &[]);

    let time = client.clock_check().await.unwrap();
    assert_eq!(
        time,
        NaiveDateTime::parse_from_str("2024-06-01T12:34:56.123456", TIME_FORMAT).unwrap()
    );
}

#[tokio::test]
async fn test_unsupported_operations_never_touch_the_network() {
    let (logger, server) = start_met_server().await;
    let client = client_for(&server, &[]);

    assert!(matches!(
        client.list_files().await,
        Err(CsiClientError::NotSupported(_))
    ));
    assert!(matches!(
        client.set_value("Public", "SetPoint", "1").await,
        Err(CsiClientError::NotSupported(_))
    ));
    assert_eq!(logger.hits(), 0);
}

// =============================================================================
// File Upload Tests
// =============================================================================

#[tokio::test]
async fn test_upload_program_sends_basic_auth_and_body() {
    let (logger, server) = start_met_server().await;
    let client = CsiClient::with_credentials(
        &server.address(),
        Vec::new(),
        Credentials::new("user", "pass"),
    )
    .unwrap();

    client
        .upload_program("station.cr1x", b"Scan (1,Sec,3,0)".to_vec())
        .await
        .unwrap();

    let upload = logger.upload("station.cr1x").expect("upload not captured");
    assert_eq!(upload.body, b"Scan (1,Sec,3,0)");
    // base64("user:pass")
    assert_eq!(upload.authorization.as_deref(), Some("Basic dXNlcjpwYXNz"));
}

#[tokio::test]
async fn test_upload_program_without_credentials_has_no_auth_header() {
    let (logger, server) = start_met_server().await;
    let client = client_for(&server, &[]);

    client
        .upload_program("plain.cr1x", b"BeginProg".to_vec())
        .await
        .unwrap();

    let upload = logger.upload("plain.cr1x").unwrap();
    assert_eq!(upload.authorization, None);
}

// =============================================================================
// Transport Classification Tests
// =============================================================================

#[tokio::test]
async fn test_timeout_while_body_streams_is_transient() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    // Raw socket stub: valid headers, truncated JSON body, then silence.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 1024];
        let _ = socket.read(&mut buf).await;
        let _ = socket
            .write_all(
                b"HTTP/1.1 200 OK\r\n\
                  Content-Type: application/json\r\n\
                  Content-Length: 64\r\n\r\n\
                  {\"head\":",
            )
            .await;
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    let client = CsiClient::with_config(
        &addr.to_string(),
        vec!["ASSET_1min".to_string()],
        Duration::from_millis(500),
        Duration::from_millis(500),
    )
    .unwrap();

    let err = client
        .table_data("ASSET_1min", &QueryMode::most_recent(1))
        .await
        .unwrap_err();

    assert!(
        matches!(err, CsiClientError::Timeout),
        "expected timeout, got {err:?}"
    );
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_connection_refused_is_transient() {
    // Nothing listens on the reserved port.
    let client = CsiClient::with_config(
        "127.0.0.1:1",
        vec!["ASSET_1min".to_string()],
        Duration::from_secs(2),
        Duration::from_millis(500),
    )
    .unwrap();

    let err = client
        .table_data("ASSET_1min", &QueryMode::most_recent(1))
        .await
        .unwrap_err();

    assert!(err.is_transient(), "expected transient error, got {err:?}");
}
