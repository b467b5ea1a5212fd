use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::connect_info::MockConnectInfo,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use passport::{create_router, AppState};
use passport_core::{CollectorStore, InMemoryCollectorStore, WorldCatalog};

/// Create a test app backed by an in-memory store and the bundled worlds.
fn create_test_app() -> Router {
    create_test_app_with(Arc::new(InMemoryCollectorStore::new()), 1000)
}

fn create_test_app_with(store: Arc<dyn CollectorStore>, write_limit: u32) -> Router {
    let catalog = Arc::new(WorldCatalog::bundled().unwrap());
    let state = AppState::new(store, catalog, write_limit);
    create_router(state).layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn visit(code: &str, arrival: Option<&str>, departure: Option<&str>) -> Value {
    json!({ "countryCode": code, "arrival": arrival, "departure": departure })
}

// ============================================================================
// Health endpoint tests
// ============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));

    let (status, body) = send(&app, "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

// ============================================================================
// World endpoint tests
// ============================================================================

#[tokio::test]
async fn test_list_worlds() {
    let app = create_test_app();

    let (status, body) = send(&app, "GET", "/world", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["worlds"], json!(["europe", "world"]));
    assert_eq!(body["default"], "world");
}

#[tokio::test]
async fn test_get_world() {
    let app = create_test_app();

    let (status, body) = send(&app, "GET", "/world/Europe", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["worldName"], "europe");

    let countries = body["Countries"].as_array().unwrap();
    assert!(!countries.is_empty());
    assert!(countries.iter().all(|c| c["region"] == "EU"));
    assert!(countries.iter().any(|c| c["countryCode"] == "NO"));
}

#[tokio::test]
async fn test_get_unknown_world() {
    let app = create_test_app();

    let (status, body) = send(&app, "GET", "/world/atlantis", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!(false));
}

// ============================================================================
// Collector endpoint tests
// ============================================================================

#[tokio::test]
async fn test_unknown_user_has_no_collector() {
    let app = create_test_app();

    let (status, body) = send(&app, "GET", "/countryCollector/nobody", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn test_invalid_username() {
    let app = create_test_app();

    let (status, body) = send(&app, "GET", "/countryCollector/not-valid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!(false));
}

#[tokio::test]
async fn test_register_visit_creates_collector() {
    let app = create_test_app();

    let (status, body) = send(
        &app,
        "PUT",
        "/countryCollector/kari/visit/register",
        Some(visit("no", Some("2024-06-01T10:00:00"), Some("2024-06-14"))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(true));

    let (status, body) = send(&app, "GET", "/countryCollector/kari", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["World"]["worldName"], "world");
    assert_eq!(
        body["Visits"],
        json!([{
            "countryCode": "NO",
            "arrival": "2024-06-01T10:00:00",
            "departure": "2024-06-14T00:00:00"
        }])
    );
}

#[tokio::test]
async fn test_register_visit_unknown_country() {
    let app = create_test_app();

    let (status, body) = send(
        &app,
        "PUT",
        "/countryCollector/kari/visit/register",
        Some(visit("XX", None, None)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!(false));

    // A rejected visit must not create the user.
    let (status, _) = send(&app, "GET", "/countryCollector/kari", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_remove_visit() {
    let app = create_test_app();
    let uri = "/countryCollector/kari/visit";

    for code in ["NO", "SE", "NO"] {
        let (status, _) = send(
            &app,
            "PUT",
            &format!("{uri}/register"),
            Some(visit(code, None, None)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(
        &app,
        "PUT",
        &format!("{uri}/remove"),
        Some(visit("NO", None, None)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(true));

    // Only one of the identical visits goes.
    let (_, body) = send(&app, "GET", "/countryCollector/kari", None).await;
    let codes: Vec<&str> = body["Visits"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["countryCode"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["SE", "NO"]);

    let (status, body) = send(
        &app,
        "PUT",
        &format!("{uri}/remove"),
        Some(visit("DK", None, None)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(false));
}

#[tokio::test]
async fn test_put_collector_with_world_round_trip() {
    let app = create_test_app();
    let document = json!({
        "World": {
            "worldName": "islands",
            "Countries": [
                { "countryCode": "IS", "shortName": "Iceland", "longName": "Republic of Iceland",
                  "sovereignty": "Iceland", "region": "EU", "population": 380000 },
                { "countryCode": "FO", "shortName": "Faroe Islands", "longName": "Faroe Islands",
                  "sovereignty": "Denmark", "region": "EU", "population": 54000 }
            ]
        },
        "Visits": [ visit("FO", Some("2023-07-01T08:30:00"), None) ]
    });

    let (status, body) = send(&app, "PUT", "/countryCollector/ola", Some(document.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(true));

    let (status, body) = send(&app, "GET", "/countryCollector/ola", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, document);
}

#[tokio::test]
async fn test_put_collector_without_world_uses_default() {
    let app = create_test_app();
    let document = json!({ "Visits": [ visit("JP", None, None) ] });

    let (status, _) = send(&app, "PUT", "/countryCollector/ola", Some(document)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", "/countryCollector/ola", None).await;
    assert_eq!(body["World"]["worldName"], "world");
    assert_eq!(body["Visits"][0]["countryCode"], "JP");
}

#[tokio::test]
async fn test_put_collector_without_world_keeps_existing_world() {
    let app = create_test_app();

    let europe = send(&app, "GET", "/world/europe", None).await.1;
    let (status, _) = send(
        &app,
        "PUT",
        "/countryCollector/ola",
        Some(json!({ "World": europe, "Visits": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // JP is not in the user's europe world.
    let (status, body) = send(
        &app,
        "PUT",
        "/countryCollector/ola",
        Some(json!({ "Visits": [ visit("JP", None, None) ] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!(false));

    let (status, _) = send(
        &app,
        "PUT",
        "/countryCollector/ola",
        Some(json!({ "Visits": [ visit("SE", None, None) ] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", "/countryCollector/ola", None).await;
    assert_eq!(body["World"]["worldName"], "europe");
}

#[tokio::test]
async fn test_delete_collector() {
    let app = create_test_app();

    send(
        &app,
        "PUT",
        "/countryCollector/kari/visit/register",
        Some(visit("SE", None, None)),
    )
    .await;

    let (status, body) = send(&app, "DELETE", "/countryCollector/kari", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(true));

    let (status, _) = send(&app, "GET", "/countryCollector/kari", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Deleting again still reports success.
    let (status, body) = send(&app, "DELETE", "/countryCollector/kari", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(true));
}

#[tokio::test]
async fn test_rename_collector() {
    let app = create_test_app();

    send(
        &app,
        "PUT",
        "/countryCollector/kari/visit/register",
        Some(visit("DK", None, None)),
    )
    .await;

    let (status, body) = send(&app, "POST", "/countryCollector/kari/rename/karin", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(true));

    let (status, _) = send(&app, "GET", "/countryCollector/kari", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", "/countryCollector/karin", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Visits"][0]["countryCode"], "DK");
}

#[tokio::test]
async fn test_rename_conflicts_and_missing() {
    let app = create_test_app();

    for user in ["kari", "ola"] {
        send(
            &app,
            "PUT",
            &format!("/countryCollector/{user}/visit/register"),
            Some(visit("NO", None, None)),
        )
        .await;
    }

    let (status, body) = send(&app, "POST", "/countryCollector/kari/rename/ola", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!(false));

    let (status, _) = send(&app, "POST", "/countryCollector/nobody/rename/someone", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "POST", "/countryCollector/kari/rename/bad%20name", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stats() {
    let app = create_test_app();

    let (status, _) = send(&app, "GET", "/countryCollector/kari/stats", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    for code in ["NO", "SE", "NO"] {
        send(
            &app,
            "PUT",
            "/countryCollector/kari/visit/register",
            Some(visit(code, None, None)),
        )
        .await;
    }

    let (status, body) = send(&app, "GET", "/countryCollector/kari/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["countries_visited"], 2);
    assert!(body["countries_total"].as_u64().unwrap() > 100);
    assert!(body["regions"]
        .as_array()
        .unwrap()
        .iter()
        .any(|r| r["region"] == "EU" && r["visited"] == 2));
    assert_eq!(body["badges"][0], json!({ "badge": "FirstSteps" }));
}

// ============================================================================
// Storage and rate limiting
// ============================================================================

#[tokio::test]
async fn test_collectors_survive_restart_with_file_store() {
    let dir = tempfile::tempdir().unwrap();

    {
        let store = Arc::new(passport_store::FileCollectorStore::open(dir.path()).unwrap());
        let app = create_test_app_with(store, 1000);
        let (status, _) = send(
            &app,
            "PUT",
            "/countryCollector/kari/visit/register",
            Some(visit("FI", Some("2022-02-02"), None)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let store = Arc::new(passport_store::FileCollectorStore::open(dir.path()).unwrap());
    let app = create_test_app_with(store, 1000);
    let (status, body) = send(&app, "GET", "/countryCollector/kari", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Visits"][0]["countryCode"], "FI");
    assert_eq!(body["Visits"][0]["arrival"], "2022-02-02T00:00:00");
}

#[tokio::test]
async fn test_visit_update_leaves_unreadable_document_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kari.json");
    let truncated = r#"{"Visits":[{"countryCode":"NO"},{"countryCode":"SE"#;
    std::fs::write(&path, truncated).unwrap();

    let store = Arc::new(passport_store::FileCollectorStore::open(dir.path()).unwrap());
    let app = create_test_app_with(store, 1000);

    let (status, body) = send(
        &app,
        "PUT",
        "/countryCollector/kari/visit/register",
        Some(visit("JP", None, None)),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!(false));

    let (status, _) = send(
        &app,
        "PUT",
        "/countryCollector/kari/visit/remove",
        Some(visit("NO", None, None)),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    assert_eq!(std::fs::read_to_string(&path).unwrap(), truncated);
}

#[tokio::test]
async fn test_writes_are_rate_limited() {
    let app = create_test_app_with(Arc::new(InMemoryCollectorStore::new()), 2);
    let uri = "/countryCollector/kari/visit/register";

    for _ in 0..2 {
        let (status, _) = send(&app, "PUT", uri, Some(visit("NO", None, None))).await;
        assert_eq!(status, StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(visit("NO", None, None).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key("retry-after"));

    // Reads are not limited.
    let (status, _) = send(&app, "GET", "/countryCollector/kari", None).await;
    assert_eq!(status, StatusCode::OK);
}
