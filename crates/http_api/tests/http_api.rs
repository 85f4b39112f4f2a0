use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::util::ServiceExt;

use chrono::Utc;
use cmg_app::{AppPaths, AppState, MonitorSettings, ensure_app_data_dir};
use cmg_core::RawSample;

use http_api::HttpState;

struct TestApp {
    _temp_dir: tempfile::TempDir,
    app_state: AppState,
    router: axum::Router,
}

fn build_app() -> TestApp {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let paths = AppPaths::new(temp_dir.path().to_path_buf());
    ensure_app_data_dir(&paths).expect("ensure app data dir");
    let app_state = AppState::new(&paths, MonitorSettings::default());
    app_state.initialize().expect("initialize");

    let router = http_api::router(HttpState::new(app_state.clone()));

    TestApp {
        _temp_dir: temp_dir,
        app_state,
        router,
    }
}

fn seed_sample(app_state: &AppState, node: &str, unix_time: i64, cmg: f64) {
    let db = app_state.open_db().expect("open db");
    db.insert_raw_sample(&RawSample {
        node: node.to_string(),
        year: 2026,
        month: 10,
        day: 16,
        hour: "13:00:00".to_string(),
        unix_time,
        decoupled: false,
        cmg,
        reference_node: node.to_string(),
    })
    .expect("seed sample");
}

async fn post_json(router: axum::Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
        )
        .await
        .expect("response");
    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let payload: Value = serde_json::from_slice(&body).expect("json body");
    (status, payload)
}

#[tokio::test]
async fn empty_store_reports_no_checkpoint() {
    let app = build_app();
    let (status, payload) = post_json(app.router, "/api/checkpoint_latest", "{}").await;
    assert_eq!(status, StatusCode::OK);
    assert!(payload.is_null());
}

#[tokio::test]
async fn unknown_node_is_not_found() {
    let app = build_app();
    let (status, payload) = post_json(
        app.router,
        "/api/last_reading",
        r#"{"node":"NEHUENCO__220"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(payload["code"], "not_found");
}

#[tokio::test]
async fn zero_hour_window_is_invalid_input() {
    let app = build_app();
    let (status, payload) = post_json(app.router, "/api/aggregates", r#"{"hours":0}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(payload["code"], "invalid_input");
}

#[tokio::test]
async fn tick_endpoint_runs_fallback_and_exposes_results() {
    let app = build_app();
    let previous_hour = Utc::now().timestamp() / 3600 * 3600 - 3600;
    seed_sample(&app.app_state, "CHARRUA__220", previous_hour, 61.5);
    seed_sample(&app.app_state, "QUILLOTA__220", previous_hour, 70.0);

    let (status, report) = post_json(app.router.clone(), "/api/tick", "{}").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["nodes"][0]["outcome"]["status"], "inserted");
    assert_eq!(report["nodes"][0]["outcome"]["source"], "fallback");
    assert!(report["checkpoint_id"].is_number());

    let (status, reading) = post_json(
        app.router.clone(),
        "/api/last_reading",
        r#"{"node":"QUILLOTA__220"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reading["cmg"], 70.0);

    let (status, window) = post_json(app.router.clone(), "/api/aggregates", "{}").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(window.as_array().map(Vec::len), Some(4));

    let (status, statuses) = post_json(app.router, "/api/node_status", "{}").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(statuses[0]["plant"], "Los Angeles");
}
