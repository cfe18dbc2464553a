// ABOUTME: HTTP route tests driving the axum router in-process with tower oneshot
// ABOUTME: Covers health, prediction payload shape, validation errors and retraining
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use common::{run_json, test_resources, training_runs_json};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use vantage_core::constants::versions::LOGIC_VERSION;
use vantage_forecast::routes;

async fn app() -> (Router, TempDir) {
    let dir = TempDir::new().unwrap();
    let resources = test_resources(dir.path()).await;
    (routes::router(resources), dir)
}

async fn post_json(app: Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health() {
    let (app, _dir) = app().await;
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({"status": "ok", "service": "vantage-ml"}));
}

#[tokio::test]
async fn test_predict_without_history_uses_fallback() {
    let (app, _dir) = app().await;
    let (status, body) = post_json(
        app,
        "/predict",
        &json!({
            "distance_km": 10.0,
            "duration_seconds": 2_400.0,
            "avg_pace": 4.0,
            "elevation_gain": 0.0
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model_source"], "riegel-fallback");
    assert_eq!(body["model_version"], LOGIC_VERSION);
    assert_eq!(body["confidence"], 0.3);
    assert_eq!(body["readiness_adjustment_factor"], 1.0);
    for key in ["five_k", "ten_k", "half_marathon", "twenty_five_k", "marathon"] {
        assert!(body["predicted_times"][key].as_f64().unwrap() >= 300.0, "{key}");
        assert!(body["prediction_std"][key].as_f64().unwrap() > 0.0, "{key}");
    }
    assert_eq!(body["predicted_marathon_time"], body["predicted_times"]["marathon"]);

    let expected = 2_400.0 * (42.195_f64 / 10.0).powf(1.06);
    let marathon = body["predicted_marathon_time"].as_f64().unwrap();
    assert!((marathon - expected).abs() < 0.01, "{marathon} vs {expected}");
}

#[tokio::test]
async fn test_predict_with_history_and_race_day() {
    let (app, _dir) = app().await;
    let history: Vec<Value> = [(5.0, 1_250.0, "2025-01-10"), (10.0, 2_650.0, "2025-01-20")]
        .iter()
        .map(|(d, t, date)| {
            let mut run = run_json(*d, *t);
            run["date"] = json!(date);
            run
        })
        .collect();

    let (status, body) = post_json(
        app,
        "/predict",
        &json!({
            "distance_km": 10.0,
            "duration_seconds": 2_650.0,
            "avg_pace": 4.42,
            "elevation_gain": 20.0,
            "mode": "race_day",
            "user_id": "runner-17",
            "user_history": history,
            "cohort_history": [run_json(10.0, 3_000.0), run_json(21.1, 6_600.0)]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let confidence = body["confidence"].as_f64().unwrap();
    assert!((0.3..=0.95).contains(&confidence));
    let times = &body["predicted_times"];
    let half = times["half_marathon"].as_f64().unwrap();
    let ten_k = times["ten_k"].as_f64().unwrap();
    assert!(half >= 2.0 * ten_k);
}

#[tokio::test]
async fn test_predict_rejects_invalid_history_record() {
    let (app, _dir) = app().await;
    let mut bad = run_json(5.0, 1_300.0);
    bad["elevation_gain"] = json!(-10.0);

    let (status, body) = post_json(
        app,
        "/predict",
        &json!({
            "distance_km": 10.0,
            "duration_seconds": 2_400.0,
            "avg_pace": 4.0,
            "elevation_gain": 0.0,
            "user_history": [run_json(5.0, 1_300.0), bad]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .starts_with("user_history[1]"));
}

#[tokio::test]
async fn test_predict_rejects_malformed_body() {
    let (app, _dir) = app().await;
    let (status, body) = post_json(app, "/predict", &json!({"distance_km": "ten"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_predict_rejects_unknown_mode() {
    let (app, _dir) = app().await;
    let (status, _) = post_json(
        app,
        "/predict",
        &json!({
            "distance_km": 10.0,
            "duration_seconds": 2_400.0,
            "avg_pace": 4.0,
            "elevation_gain": 0.0,
            "mode": "tomorrow"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_train_defaults_to_gradient_boosting_synthetic() {
    let (app, _dir) = app().await;
    let (status, body) = post_json(app, "/train", &json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "status": "retrained",
            "algorithm": "gradient_boosting",
            "mode": "synthetic-bootstrap",
            "samples": 0,
            "model_version": format!("{LOGIC_VERSION}.r1")
        })
    );
}

#[tokio::test]
async fn test_train_on_real_runs_bumps_revision() {
    let (app, _dir) = app().await;
    let payload = json!({"algorithm": "linear", "runs": training_runs_json()});

    let (_, first) = post_json(app.clone(), "/train", &payload).await;
    let (status, second) = post_json(app, "/train", &payload).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["mode"], "real-runs");
    assert_eq!(first["samples"], 12);
    assert_eq!(first["model_version"], format!("{LOGIC_VERSION}.r1"));
    assert_eq!(second["model_version"], format!("{LOGIC_VERSION}.r2"));
}

#[tokio::test]
async fn test_train_rejects_unknown_algorithm() {
    let (app, _dir) = app().await;
    let (status, body) = post_json(app, "/train", &json!({"algorithm": "svm"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_request_id_generated_and_propagated() {
    let (app, _dir) = app().await;

    let generated = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let id = generated.headers()["x-request-id"].to_str().unwrap();
    assert!(id.starts_with("req_"), "{id}");

    let echoed = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "caller-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(echoed.headers()["x-request-id"], "caller-42");
}
