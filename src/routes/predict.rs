// ABOUTME: Race prediction route delegating to the critical velocity engine
// ABOUTME: Validates the request, captures the reference instant and returns the projection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Prediction routes
//!
//! The handler is a thin boundary: schema and range validation happen here,
//! the engine itself never fails on sparse data.

use axum::{extract::rejection::JsonRejection, routing::post, Json, Router};
use chrono::Utc;
use tracing::debug;
use vantage_core::errors::AppError;
use vantage_core::models::{PredictionRequest, PredictionResult};
use vantage_intelligence::RacePredictor;

/// Prediction routes implementation
pub struct PredictRoutes;

impl PredictRoutes {
    /// Create the prediction route
    pub fn routes() -> Router {
        Router::new().route("/predict", post(Self::handle_predict))
    }

    async fn handle_predict(
        payload: Result<Json<PredictionRequest>, JsonRejection>,
    ) -> Result<Json<PredictionResult>, AppError> {
        let Json(request) = payload.map_err(|e| AppError::invalid_input(e.body_text()))?;
        request.validate()?;

        let as_of = Utc::now();
        debug!(
            user_id = request.user_id.as_deref().unwrap_or("-"),
            mode = request.mode.as_str(),
            history = request.user_history.len(),
            cohort = request.cohort_history.len(),
            "Predicting race times"
        );
        Ok(Json(RacePredictor::predict(&request, as_of)))
    }
}
