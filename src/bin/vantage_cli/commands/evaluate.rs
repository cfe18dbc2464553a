// ABOUTME: Evaluate subcommand computing per-distance MAE and MAPE of issued predictions
// ABOUTME: Reads runs paired with the curve issued before them from a JSON file
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::path::Path;

use tracing::info;
use vantage_forecast::{AppError, AppResult};
use vantage_intelligence::accuracy::{evaluate_prediction_accuracy, EvaluatedRun};

use crate::helpers::{display, read_json};

pub fn run(path: &Path, table: bool) -> AppResult<()> {
    let runs: Vec<EvaluatedRun> = read_json(path)?;
    for (index, evaluated) in runs.iter().enumerate() {
        evaluated
            .run
            .validate()
            .map_err(|e| AppError::invalid_input(format!("runs[{index}]: {}", e.message)))?;
    }

    let scored = runs.iter().filter(|r| r.prediction.is_some()).count();
    info!(runs = runs.len(), scored, "Evaluating prediction accuracy");

    let report = evaluate_prediction_accuracy(&runs);
    if table {
        display::print_accuracy(&report);
    } else {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}
