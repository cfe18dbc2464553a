// ABOUTME: Shared fixtures for engine integration tests
// ABOUTME: Fixed reference instant and helpers for building dated and undated run histories
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs, dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use vantage_core::models::{PredictionMode, PredictionRequest, RunRecord, RunRecordBuilder};

/// Reference instant used by every test
pub fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 7, 30, 0).unwrap()
}

/// A run dated `age_days` before the reference instant
pub fn dated_run(distance_km: f64, duration_seconds: f64, age_days: i64) -> RunRecord {
    RunRecordBuilder::new(distance_km, duration_seconds)
        .date(as_of() - Duration::days(age_days))
        .build()
}

/// A run without a date
pub fn undated_run(distance_km: f64, duration_seconds: f64) -> RunRecord {
    RunRecordBuilder::new(distance_km, duration_seconds).build()
}

/// A request for a submitted effort with the given history
pub fn request(
    distance_km: f64,
    duration_seconds: f64,
    mode: PredictionMode,
    user_history: Vec<RunRecord>,
) -> PredictionRequest {
    PredictionRequest {
        distance_km,
        duration_seconds,
        avg_pace: duration_seconds / 60.0 / distance_km,
        elevation_gain: 0.0,
        mode,
        user_id: Some("test-runner".to_owned()),
        user_history,
        cohort_history: Vec::new(),
    }
}

/// Twelve weeks of steady training with a recent fast 10K
pub fn training_block() -> Vec<RunRecord> {
    let mut runs = Vec::new();
    for week in 0..12_i64 {
        let base = week * 7 + 2;
        runs.push(dated_run(8.0, 8.0 * 330.0, base));
        runs.push(dated_run(5.0, 5.0 * 300.0, base + 2));
        runs.push(dated_run(16.0, 16.0 * 345.0, base + 4));
    }
    runs.push(dated_run(10.0, 2_850.0, 9));
    runs
}
