// ABOUTME: Retrain route for the auxiliary regressor held by the model registry
// ABOUTME: Accepts an algorithm selector and run records, returns the new model version
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use vantage_core::errors::{AppError, AppResult};
use vantage_core::models::RunRecord;

use crate::model::{RegressorAlgorithm, TrainOutcome};
use crate::resources::ServerResources;

/// Body of `POST /train`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainRequest {
    /// Algorithm to fit when enough runs are supplied
    #[serde(default)]
    pub algorithm: RegressorAlgorithm,
    /// Training runs
    #[serde(default)]
    pub runs: Vec<RunRecord>,
}

impl TrainRequest {
    /// Validate every run against the wire schema
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidInput` naming the first offending run
    pub fn validate(&self) -> AppResult<()> {
        for (index, run) in self.runs.iter().enumerate() {
            run.validate()
                .map_err(|e| AppError::invalid_input(format!("runs[{index}]: {}", e.message)))?;
        }
        Ok(())
    }
}

/// Training routes implementation
pub struct TrainRoutes;

impl TrainRoutes {
    /// Create the retrain route
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/train", post(Self::handle_train))
            .with_state(resources)
    }

    async fn handle_train(
        State(resources): State<Arc<ServerResources>>,
        payload: Result<Json<TrainRequest>, JsonRejection>,
    ) -> Result<Json<TrainOutcome>, AppError> {
        let Json(request) = payload.map_err(|e| AppError::invalid_input(e.body_text()))?;
        request.validate()?;

        let outcome = resources
            .registry
            .retrain(request.algorithm, request.runs)
            .await?;
        Ok(Json(outcome))
    }
}
