// ABOUTME: Predict subcommand reading a prediction request from a JSON file
// ABOUTME: Validates like the HTTP boundary, then prints the engine result
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::path::Path;

use chrono::Utc;
use tracing::info;
use vantage_core::models::{normalize_timestamp, PredictionRequest};
use vantage_forecast::{AppError, AppResult};
use vantage_intelligence::RacePredictor;

use crate::helpers::{display, read_json};

pub fn run(path: &Path, as_of: Option<&str>, table: bool) -> AppResult<()> {
    let request: PredictionRequest = read_json(path)?;
    request.validate()?;

    let as_of = match as_of {
        Some(raw) => normalize_timestamp(raw)
            .map_err(|e| AppError::invalid_input(format!("--as-of: {e}")))?,
        None => Utc::now(),
    };
    info!(%as_of, history = request.user_history.len(), "Running prediction");

    let result = RacePredictor::predict(&request, as_of);
    if table {
        display::print_prediction(&result);
    } else {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }
    Ok(())
}
