//! HTTP API integration tests
//!
//! Each test builds the router over an in-memory state and drives it with
//! `oneshot`, so no socket or on-disk bundle is needed unless a test
//! exercises loading.

use std::io::Write;
use std::path::PathBuf;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use ndarray::{Array1, ArrayView2};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot`

use riskscore_core::logic::model::StandardScaler;
use riskscore_core::{
    baseline, BaselineTable, HistoricalEvent, ModelError, OutlierModel, OutlierModelBundle,
    OutlierThresholds,
};
use riskscore_server::{create_router, AppState, Config};

// ============================================================================
// FIXTURES
// ============================================================================

/// Uses the first (scaled) feature as the decision score
#[derive(Debug)]
struct FirstFeatureModel(usize);

impl OutlierModel for FirstFeatureModel {
    fn kind(&self) -> &str {
        "first_feature"
    }

    fn n_features(&self) -> usize {
        self.0
    }

    fn decision_function(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>, ModelError> {
        Ok(x.column(0).to_owned())
    }
}

fn test_config(event_log_path: PathBuf) -> Config {
    Config {
        port: 0,
        event_log_path,
        model_dir: PathBuf::from("does-not-exist"),
        max_upload_bytes: 1024 * 1024,
        environment: "test".to_string(),
    }
}

fn test_baselines() -> BaselineTable {
    baseline::build(&[
        HistoricalEvent::new("alice", 10.0, 20.0, 5),
        HistoricalEvent::new("alice", 12.0, 22.0, 7),
        HistoricalEvent::new("bob", 40.0, -70.0, 2),
        HistoricalEvent::new("bob", 42.0, -72.0, 4),
    ])
}

/// Features `amount,velocity`; high_risk below -0.2, review below 0.0
fn test_bundle() -> OutlierModelBundle {
    let scaler = StandardScaler::new(vec![0.0, 0.0], vec![1.0, 1.0]).unwrap();
    OutlierModelBundle::new(
        Box::new(FirstFeatureModel(2)),
        Box::new(scaler),
        vec!["amount".to_string(), "velocity".to_string()],
        OutlierThresholds::new(-0.2, 0.0).unwrap(),
    )
    .unwrap()
}

fn app_with(event_log_path: PathBuf, model: Option<OutlierModelBundle>) -> Router {
    let state = AppState::new(test_config(event_log_path), test_baselines(), model);
    create_router(state)
}

fn app() -> Router {
    app_with(PathBuf::from("does-not-exist.csv"), Some(test_bundle()))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn post_csv(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header(header::CONTENT_TYPE, "text/csv")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ============================================================================
// HEALTH
// ============================================================================

#[tokio::test]
async fn health_reports_loaded_state() {
    let response = app().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["baseline_users"], 2);
    assert_eq!(body["model_loaded"], true);
}

// ============================================================================
// ONLINE PREDICTION
// ============================================================================

#[tokio::test]
async fn predict_event_at_baseline_mean_is_normal() {
    let request = post_json(
        "/predict",
        json!({"user_id": "alice", "location_lat": 11.0, "location_lon": 21.0, "login_count_day": 6}),
    );
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["user_id"], "alice");
    assert_eq!(body["risk_level"], "normal");
    assert_eq!(body["anomaly_score"].as_f64().unwrap(), 0.0);
    assert_eq!(body["details"]["lat_diff"].as_f64().unwrap(), 0.0);
}

#[tokio::test]
async fn predict_far_event_is_high() {
    // lat is 9 sample-stds (sqrt 2) away from the mean
    let request = post_json(
        "/api/v1/predict",
        json!({"user_id": "alice", "location_lat": 20.0, "location_lon": 21.0, "login_count_day": 6}),
    );
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["risk_level"], "high");
    let expected = 9.0 / 2f64.sqrt();
    assert!((body["anomaly_score"].as_f64().unwrap() - expected).abs() < 1e-9);
}

#[tokio::test]
async fn predict_unknown_user_is_404() {
    let request = post_json(
        "/predict",
        json!({"user_id": "mallory", "location_lat": 0.0, "location_lon": 0.0, "login_count_day": 1}),
    );
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["error"], "user_not_found");
    assert_eq!(body["status"], 404);
}

#[tokio::test]
async fn predict_rejects_out_of_range_latitude() {
    let request = post_json(
        "/predict",
        json!({"user_id": "alice", "location_lat": 123.0, "location_lon": 21.0, "login_count_day": 6}),
    );
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn predict_negative_login_count_is_400_json() {
    let request = post_json(
        "/predict",
        json!({"user_id": "alice", "location_lat": 11.0, "location_lon": 21.0, "login_count_day": -1}),
    );
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["status"], 400);
    assert!(body["error"].as_str().unwrap().contains("login_count_day"));
}

#[tokio::test]
async fn predict_missing_field_is_400_json() {
    let request = post_json("/predict", json!({"user_id": "alice", "location_lat": 11.0}));
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["status"], 400);
    assert!(body["error"].as_str().unwrap().contains("location_lon"));
}

#[tokio::test]
async fn predict_malformed_json_is_400_json() {
    let request = Request::builder()
        .uri("/predict")
        .method("POST")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["status"], 400);
}

#[tokio::test]
async fn predict_rejects_empty_user_id() {
    let request = post_json(
        "/predict",
        json!({"user_id": "", "location_lat": 1.0, "location_lon": 1.0, "login_count_day": 1}),
    );
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// BASELINES
// ============================================================================

#[tokio::test]
async fn get_baseline_returns_profile() {
    let response = app().oneshot(get("/api/v1/baselines/bob")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["user_id"], "bob");
    assert_eq!(body["lat_mean"].as_f64().unwrap(), 41.0);
    assert_eq!(body["login_mean"].as_f64().unwrap(), 3.0);
}

#[tokio::test]
async fn get_baseline_unknown_user_is_404() {
    let response = app().oneshot(get("/api/v1/baselines/nobody")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body, json!({"error": "user_not_found", "status": 404}));
}

#[tokio::test]
async fn rebuild_replaces_baselines_from_event_log() {
    let mut log = tempfile::NamedTempFile::new().unwrap();
    writeln!(log, "user_id,location_lat,location_lon,login_count_day").unwrap();
    writeln!(log, "carol,1.0,2.0,3").unwrap();
    writeln!(log, "carol,3.0,4.0,5").unwrap();
    log.flush().unwrap();

    let app = app_with(log.path().to_path_buf(), None);

    let response = app
        .clone()
        .oneshot(post_json("/api/v1/baselines/rebuild", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["users"], 1);
    assert_eq!(body["events"], 2);

    // Old users are gone, new one is scorable
    let response = app.clone().oneshot(get("/api/v1/baselines/alice")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let request = post_json(
        "/predict",
        json!({"user_id": "carol", "location_lat": 2.0, "location_lon": 3.0, "login_count_day": 4}),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["risk_level"], "normal");
}

#[tokio::test]
async fn rebuild_without_event_log_is_404_and_keeps_baselines() {
    let app = app_with(PathBuf::from("missing-events.csv"), None);

    let response = app
        .clone()
        .oneshot(post_json("/api/v1/baselines/rebuild", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(get("/api/v1/baselines/alice")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// ============================================================================
// BATCH REPORTS
// ============================================================================

const BATCH_CSV: &str = "\
txn_id,amount,velocity
t1,-0.5,1.0
t2,-0.1,2.0
t3,0.3,3.0
";

#[tokio::test]
async fn batch_report_classifies_rows_in_order() {
    let response = app()
        .oneshot(post_csv("/api/v1/reports/batch", BATCH_CSV))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["report_id"].is_string());
    assert_eq!(body["columns"], json!(["txn_id", "amount", "velocity"]));

    let rows = body["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["values"][0], "t1");
    assert_eq!(rows[0]["risk_level"], "high");
    assert_eq!(rows[1]["risk_level"], "review");
    assert_eq!(rows[2]["risk_level"], "normal");

    assert_eq!(body["summary"], json!({"total": 3, "high": 1, "review": 1, "normal": 1}));
}

#[tokio::test]
async fn batch_report_csv_download() {
    let response = app()
        .oneshot(post_csv("/api/v1/reports/batch?format=csv", BATCH_CSV))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv");
    assert!(response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("results.csv"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "txn_id,amount,velocity,score,risk_level");
    assert!(lines[1].starts_with("t1,-0.5,1.0,"));
    assert!(lines[1].ends_with(",high"));
    assert!(lines[3].ends_with(",normal"));
}

#[tokio::test]
async fn batch_report_missing_feature_column_is_422() {
    let response = app()
        .oneshot(post_csv("/api/v1/reports/batch", "txn_id,amount\nt1,1.0\n"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("velocity"));
}

#[tokio::test]
async fn batch_report_invalid_value_rejects_whole_batch() {
    let response = app()
        .oneshot(post_csv(
            "/api/v1/reports/batch",
            "txn_id,amount,velocity\nt1,0.1,1.0\nt2,abc,2.0\n",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn batch_report_empty_upload_is_400() {
    let response = app()
        .oneshot(post_csv("/api/v1/reports/batch", "  \n"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn batch_report_unknown_format_is_400_json() {
    let response = app()
        .oneshot(post_csv("/api/v1/reports/batch?format=xml", BATCH_CSV))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["status"], 400);
}

#[tokio::test]
async fn batch_report_without_model_is_503() {
    let response = app_with(PathBuf::from("none.csv"), None)
        .oneshot(post_csv("/api/v1/reports/batch", BATCH_CSV))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn batch_upload_over_limit_is_rejected() {
    let mut config = test_config(PathBuf::from("none.csv"));
    config.max_upload_bytes = 16;
    let app = create_router(AppState::new(config, test_baselines(), Some(test_bundle())));

    let response = app
        .oneshot(post_csv("/api/v1/reports/batch", BATCH_CSV))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let body = body_json(response).await;
    assert_eq!(body["status"], 413);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn predict_body_over_limit_is_413_json() {
    let mut config = test_config(PathBuf::from("none.csv"));
    config.max_upload_bytes = 16;
    let app = create_router(AppState::new(config, test_baselines(), None));

    let request = post_json(
        "/predict",
        json!({"user_id": "alice", "location_lat": 11.0, "location_lon": 21.0, "login_count_day": 6}),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_json(response).await["status"], 413);
}

#[tokio::test]
async fn predict_batch_keeps_uploaded_column_order() {
    let request = Request::builder()
        .uri("/api/v1/predict/batch")
        .method("POST")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"[{"velocity": 1.0, "amount": -0.5, "zeta": "z", "id": "r1"}]"#))
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["columns"], json!(["velocity", "amount", "zeta", "id"]));
    assert_eq!(body["rows"][0]["values"], json!(["1.0", "-0.5", "z", "r1"]));
    assert_eq!(body["rows"][0]["risk_level"], "high");
}

#[tokio::test]
async fn predict_batch_scores_json_rows() {
    let rows = json!([
        {"amount": -0.5, "velocity": 1.0},
        {"amount": 0.3, "velocity": 2.0, "note": "ok"}
    ]);
    let response = app()
        .oneshot(post_json("/api/v1/predict/batch", rows))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["rows"][0]["risk_level"], "high");
    assert_eq!(body["rows"][1]["risk_level"], "normal");
    assert_eq!(body["summary"]["total"], 2);
}

// ============================================================================
// MODEL
// ============================================================================

#[tokio::test]
async fn model_info_describes_bundle() {
    let response = app().oneshot(get("/api/v1/model")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["model_kind"], "first_feature");
    assert_eq!(body["feature_count"], 2);
    assert_eq!(body["thresholds"]["high_risk"].as_f64().unwrap(), -0.2);
    assert_eq!(body["risk_levels"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn model_info_without_model_is_503() {
    let response = app_with(PathBuf::from("none.csv"), None)
        .oneshot(get("/api/v1/model"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
