// ABOUTME: Main library entry point for the Vantage race forecasting service
// ABOUTME: Wires configuration, logging, the auxiliary model registry and HTTP routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Vantage Forecast
//!
//! HTTP service predicting race times for 5K, 10K, half marathon, 25K and
//! marathon from a runner's recent history.
//!
//! ## Architecture
//!
//! - **`vantage_core`**: errors, run records, prediction payloads, constants
//! - **`vantage_intelligence`**: the critical velocity projection engine
//! - **config**: environment-driven server configuration
//! - **logging**: `tracing` subscriber setup
//! - **model**: auxiliary regressor and its versioned registry
//! - **routes**: axum handlers for `/health`, `/predict` and `/train`
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vantage_forecast::config::ServerConfig;
//! use vantage_forecast::resources::ServerResources;
//! use vantage_forecast::routes;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = ServerConfig::from_env()?;
//! let resources = Arc::new(ServerResources::from_config(config).await?);
//! let app = routes::router(resources);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8001").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

/// Environment-driven configuration
pub mod config;

/// Structured logging setup
pub mod logging;

/// Auxiliary regressor and model registry
pub mod model;

/// Shared state for HTTP handlers
pub mod resources;

/// HTTP routes
pub mod routes;

pub use vantage_core::errors::{AppError, AppResult};
