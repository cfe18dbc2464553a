// ABOUTME: Integration tests for the wire models: run records, prediction requests and errors
// ABOUTME: Exercises timestamp normalisation, request validation and error response rendering
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use chrono::{TimeZone, Utc};
use serde_json::json;
use vantage_core::errors::{AppError, ErrorCode, ErrorResponse};
use vantage_core::models::{PredictionMode, PredictionRequest, RunRecord};

#[test]
fn test_request_defaults() {
    let request: PredictionRequest = serde_json::from_value(json!({
        "distance_km": 10.0,
        "duration_seconds": 2_700.0,
        "avg_pace": 4.5,
        "elevation_gain": 30.0
    }))
    .unwrap();

    assert_eq!(request.mode, PredictionMode::Current);
    assert!(request.user_history.is_empty());
    assert!(request.cohort_history.is_empty());
    assert!(request.validate().is_ok());
}

#[test]
fn test_history_timestamps_normalised_to_utc() {
    let request: PredictionRequest = serde_json::from_value(json!({
        "distance_km": 10.0,
        "duration_seconds": 2_700.0,
        "avg_pace": 4.5,
        "elevation_gain": 0.0,
        "mode": "race_day",
        "user_history": [
            {"distance_km": 5.0, "duration_seconds": 1_250.0, "avg_pace": 4.17, "elevation_gain": 12.0,
             "date": "2025-04-02T08:00:00+02:00"},
            {"distance_km": 12.0, "duration_seconds": 3_900.0, "avg_pace": 5.42, "elevation_gain": 80.0,
             "date": "2025-04-05T06:15:00"},
            {"distance_km": 8.0, "duration_seconds": 2_600.0, "avg_pace": 5.42, "elevation_gain": 40.0,
             "date": "2025-04-07"},
            {"distance_km": 6.0, "duration_seconds": 1_900.0, "avg_pace": 5.28, "elevation_gain": 0.0}
        ]
    }))
    .unwrap();

    assert_eq!(request.mode, PredictionMode::RaceDay);
    let dates: Vec<_> = request.user_history.iter().map(RunRecord::date).collect();
    assert_eq!(dates[0], Some(Utc.with_ymd_and_hms(2025, 4, 2, 6, 0, 0).unwrap()));
    assert_eq!(dates[1], Some(Utc.with_ymd_and_hms(2025, 4, 5, 6, 15, 0).unwrap()));
    assert_eq!(dates[2], Some(Utc.with_ymd_and_hms(2025, 4, 7, 0, 0, 0).unwrap()));
    assert_eq!(dates[3], None);
}

#[test]
fn test_unparseable_timestamp_rejected() {
    let result = serde_json::from_value::<RunRecord>(json!({
        "distance_km": 5.0,
        "duration_seconds": 1_250.0,
        "avg_pace": 4.17,
        "elevation_gain": 0.0,
        "date": "last tuesday"
    }));
    assert!(result.is_err());
}

#[test]
fn test_validation_names_offending_history_record() {
    let request: PredictionRequest = serde_json::from_value(json!({
        "distance_km": 10.0,
        "duration_seconds": 2_700.0,
        "avg_pace": 4.5,
        "elevation_gain": 0.0,
        "user_history": [
            {"distance_km": 5.0, "duration_seconds": 1_250.0, "avg_pace": 4.17, "elevation_gain": 0.0},
            {"distance_km": 5.0, "duration_seconds": 1_250.0, "avg_pace": 4.17, "elevation_gain": -3.0}
        ]
    }))
    .unwrap();

    let error = request.validate().unwrap_err();
    assert_eq!(error.code, ErrorCode::InvalidInput);
    assert!(error.message.starts_with("user_history[1]"), "{}", error.message);
    assert_eq!(error.http_status(), 400);
}

#[test]
fn test_non_positive_effort_rejected() {
    let request: PredictionRequest = serde_json::from_value(json!({
        "distance_km": 0.0,
        "duration_seconds": 2_700.0,
        "avg_pace": 4.5,
        "elevation_gain": 0.0
    }))
    .unwrap();
    let error = request.validate().unwrap_err();
    assert!(error.message.contains("distance_km"));
}

#[test]
fn test_error_response_body() {
    let error = AppError::storage("model directory is read-only");
    let body = serde_json::to_value(ErrorResponse::from(&error)).unwrap();
    assert_eq!(body["error"]["code"], "STORAGE_ERROR");
    assert_eq!(body["error"]["message"], "model directory is read-only");
    assert_eq!(error.http_status(), 500);
}
