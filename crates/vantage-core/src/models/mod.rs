// ABOUTME: Core data models for the Vantage race forecasting service
// ABOUTME: Re-exports run records, prediction curves, modes and request/response payloads
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! Every model here is a request-scoped value type. Nothing is persisted and
//! no model holds references into another request's data.
//!
//! - `RunRecord`: a single training run (timestamps normalised to UTC on entry)
//! - `PredictionCurve`: fixed-key map from canonical distance to seconds
//! - `PredictionRequest` / `PredictionResult`: the prediction payloads

mod prediction;
mod run;

pub use prediction::{
    DistanceKey, ModelSource, PredictionCurve, PredictionMode, PredictionRequest,
    PredictionResult,
};
pub use run::{normalize_timestamp, require_positive, RunRecord, RunRecordBuilder};
