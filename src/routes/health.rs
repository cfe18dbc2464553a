// ABOUTME: Health check route for service monitoring and load balancer probes
// ABOUTME: Static liveness payload naming the service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use vantage_core::constants::service_names;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create the health check route
    pub fn routes() -> Router {
        async fn health_handler() -> Json<Value> {
            Json(json!({
                "status": "ok",
                "service": service_names::VANTAGE_ML
            }))
        }

        Router::new().route("/health", get(health_handler))
    }
}
