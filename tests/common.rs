// ABOUTME: Shared test utilities for the forecasting service integration tests
// ABOUTME: Logging setup, temp-dir backed configuration and JSON run fixtures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Once};

use serde_json::{json, Value};
use vantage_forecast::config::{Environment, ServerConfig};
use vantage_forecast::resources::ServerResources;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet test logging once per test binary
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Configuration pointing the model store at `dir`
pub fn test_config(dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_owned(),
        model_dir: dir.to_path_buf(),
        environment: Environment::Testing,
        ..ServerConfig::default()
    }
}

/// Server resources backed by a model store in `dir`
pub async fn test_resources(dir: &Path) -> Arc<ServerResources> {
    init_test_logging();
    Arc::new(
        ServerResources::from_config(test_config(dir))
            .await
            .expect("model registry should open"),
    )
}

/// Run record JSON with pace derived from distance and duration
pub fn run_json(distance_km: f64, duration_seconds: f64) -> Value {
    json!({
        "distance_km": distance_km,
        "duration_seconds": duration_seconds,
        "avg_pace": duration_seconds / 60.0 / distance_km,
        "elevation_gain": 25.0
    })
}

/// Twelve varied runs, enough for a real-runs retrain with default settings
pub fn training_runs_json() -> Vec<Value> {
    (0..12)
        .map(|i| {
            let distance = 4.0 + f64::from(i) * 1.5;
            let pace = 5.0 + f64::from(i % 4) * 0.25;
            run_json(distance, distance * pace * 60.0)
        })
        .collect()
}
