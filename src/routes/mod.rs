// ABOUTME: Route module organization for the forecasting service HTTP endpoints
// ABOUTME: Assembles health, prediction and training routes behind request-id and trace layers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! HTTP routes
//!
//! Each domain module contains only route definitions and thin handlers that
//! delegate to the engine or the model registry. Every request gets an
//! `x-request-id` (generated as `req_<uuid>` unless the caller sent one) that
//! is recorded on its tracing span and echoed on the response.

/// Health check route
pub mod health;
/// Race prediction route
pub mod predict;
/// Auxiliary model retrain route
pub mod train;

use std::sync::Arc;

use axum::{body::Body, Router};
use http::{HeaderValue, Request};
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use crate::resources::ServerResources;

pub use health::HealthRoutes;
pub use predict::PredictRoutes;
pub use train::{TrainRequest, TrainRoutes};

/// Largest accepted request body
pub const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Generates `req_<uuid>` request ids
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdGenerator;

impl MakeRequestId for RequestIdGenerator {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = format!("req_{}", Uuid::new_v4().simple());
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

fn request_span(request: &Request<Body>) -> tracing::Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-");
    tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}

/// Build the complete application router
pub fn router(resources: Arc<ServerResources>) -> Router {
    Router::new()
        .merge(HealthRoutes::routes())
        .merge(PredictRoutes::routes())
        .merge(TrainRoutes::routes(resources))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(RequestIdGenerator))
                .layer(TraceLayer::new_for_http().make_span_with(request_span))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)),
        )
}
