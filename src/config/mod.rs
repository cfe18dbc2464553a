// ABOUTME: Configuration module for the forecasting service
// ABOUTME: Environment-only server settings; engine tuning lives in compile-time constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration for the Vantage forecasting service
//!
//! All runtime settings come from environment variables. The projection
//! engine's thresholds are not configurable at runtime.

/// Environment and server configuration
pub mod environment;

pub use environment::{Environment, ServerConfig};
