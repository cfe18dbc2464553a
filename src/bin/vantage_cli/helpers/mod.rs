// ABOUTME: Shared helpers for vantage-cli
// ABOUTME: JSON file loading and table formatting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub mod display;

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use vantage_forecast::{AppError, AppResult};

/// Read and parse a JSON document, naming the file in errors
pub fn read_json<T: DeserializeOwned>(path: &Path) -> AppResult<T> {
    let raw = fs::read_to_string(path).map_err(|e| {
        AppError::not_found(format!("input file {}", path.display())).with_source(e)
    })?;
    serde_json::from_str(&raw)
        .map_err(|e| AppError::invalid_input(format!("{}: {e}", path.display())).with_source(e))
}
