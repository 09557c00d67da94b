use chrono::NaiveDate;
use httpmock::prelude::*;
use kidgrowth_advice::{CalendarConfig, CalendarSync, ImmunizationEvent, SyncOutcome};
use secrecy::SecretString;
use serde_json::json;

const FUNCTION_PATH: &str = "/functions/v1/google-calendar";

fn calendar_for(server: &MockServer) -> CalendarSync {
    let config = CalendarConfig {
        functions_url: Some(server.base_url()),
        access_token: Some(SecretString::from("session-token".to_string())),
        ..CalendarConfig::default()
    };
    CalendarSync::new(&config).unwrap()
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[tokio::test]
async fn test_is_connected_reads_status() {
    let server = MockServer::start();
    let status_mock = server.mock(|when, then| {
        when.method(GET)
            .path(FUNCTION_PATH)
            .query_param("action", "status")
            .header("authorization", "Bearer session-token");
        then.status(200).json_body(json!({"connected": true}));
    });

    let calendar = calendar_for(&server);

    assert!(calendar.is_connected().await);
    status_mock.assert();
}

#[tokio::test]
async fn test_status_failure_reads_as_disconnected() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(FUNCTION_PATH);
        then.status(500).body("boom");
    });

    let calendar = calendar_for(&server);

    assert!(!calendar.is_connected().await);
}

#[tokio::test]
async fn test_sync_creates_event_when_connected() {
    let server = MockServer::start();
    let status_mock = server.mock(|when, then| {
        when.method(GET).path(FUNCTION_PATH).query_param("action", "status");
        then.status(200).json_body(json!({"connected": true}));
    });
    let create_mock = server.mock(|when, then| {
        when.method(POST)
            .path(FUNCTION_PATH)
            .query_param("action", "create-event")
            .json_body(json!({
                "event": {
                    "summary": "[Aldi] Imunisasi: BCG",
                    "description": "Jadwal imunisasi BCG untuk Aldi",
                    "start": {"dateTime": "2026-01-05T09:00:00.000Z"},
                    "end": {"dateTime": "2026-01-05T10:00:00.000Z"}
                }
            }));
        then.status(200).json_body(json!({"id": "evt_123"}));
    });

    let calendar = calendar_for(&server);
    let event = ImmunizationEvent {
        vaccine_name: "BCG".to_string(),
        child_name: "Aldi".to_string(),
        scheduled_date: date("2026-01-05"),
        notes: None,
    };

    let outcome = calendar.sync_immunization(&event).await;

    status_mock.assert();
    create_mock.assert();
    assert_eq!(
        outcome,
        SyncOutcome::Succeeded {
            event_id: "evt_123".to_string()
        }
    );
}

#[tokio::test]
async fn test_sync_skips_create_when_not_connected() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(FUNCTION_PATH).query_param("action", "status");
        then.status(200).json_body(json!({"connected": false}));
    });
    let create_mock = server.mock(|when, then| {
        when.method(POST).path(FUNCTION_PATH);
        then.status(200).json_body(json!({"id": "evt_123"}));
    });

    let calendar = calendar_for(&server);
    let outcome = calendar
        .sync_event("Check-up", "Monthly weighing", date("2026-02-01"), None)
        .await;

    assert_eq!(outcome, SyncOutcome::NotConnected);
    create_mock.assert_hits(0);
}

#[tokio::test]
async fn test_sync_without_event_id_fails() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(FUNCTION_PATH).query_param("action", "status");
        then.status(200).json_body(json!({"connected": true}));
    });
    server.mock(|when, then| {
        when.method(POST).path(FUNCTION_PATH).query_param("action", "create-event");
        then.status(200).json_body(json!({"error": "token expired"}));
    });

    let calendar = calendar_for(&server);
    let outcome = calendar
        .sync_event("Check-up", "Monthly weighing", date("2026-02-01"), None)
        .await;

    assert!(matches!(outcome, SyncOutcome::Failed(_)));
}

#[tokio::test]
async fn test_collapsed_sync_returns_bool() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(FUNCTION_PATH).query_param("action", "status");
        then.status(200).json_body(json!({"connected": true}));
    });
    server.mock(|when, then| {
        when.method(POST).path(FUNCTION_PATH).query_param("action", "create-event");
        then.status(200).json_body(json!({"id": "evt_9"}));
    });

    let calendar = calendar_for(&server);

    assert!(calendar.sync("Check-up", "", "2026-02-01", Some("Aldi")).await);
    assert!(!calendar.sync("Check-up", "", "01/02/2026", Some("Aldi")).await);
}

#[tokio::test]
async fn test_status_server_error_is_failed_not_disconnected() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(FUNCTION_PATH).query_param("action", "status");
        then.status(500)
            .json_body(json!({"error": "Internal server error"}));
    });
    let create_mock = server.mock(|when, then| {
        when.method(POST).path(FUNCTION_PATH);
        then.status(200).json_body(json!({"id": "evt_123"}));
    });

    let calendar = calendar_for(&server);
    let outcome = calendar
        .sync_event("Check-up", "Monthly weighing", date("2026-02-01"), None)
        .await;

    assert!(matches!(outcome, SyncOutcome::Failed(_)), "got {:?}", outcome);
    create_mock.assert_hits(0);
}

#[tokio::test]
async fn test_status_without_connected_field_is_failed() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(FUNCTION_PATH).query_param("action", "status");
        then.status(200).json_body(json!({"message": "unexpected"}));
    });

    let calendar = calendar_for(&server);
    let outcome = calendar
        .sync_event("Check-up", "Monthly weighing", date("2026-02-01"), None)
        .await;

    assert!(matches!(outcome, SyncOutcome::Failed(_)), "got {:?}", outcome);
}

#[tokio::test]
async fn test_create_event_server_error_is_failed() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(FUNCTION_PATH).query_param("action", "status");
        then.status(200).json_body(json!({"connected": true}));
    });
    server.mock(|when, then| {
        when.method(POST).path(FUNCTION_PATH).query_param("action", "create-event");
        then.status(401).json_body(json!({"id": "stale", "error": "Unauthorized"}));
    });

    let calendar = calendar_for(&server);
    let outcome = calendar
        .sync_event("Check-up", "Monthly weighing", date("2026-02-01"), None)
        .await;

    assert!(matches!(outcome, SyncOutcome::Failed(_)), "got {:?}", outcome);
}
