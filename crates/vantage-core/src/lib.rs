// ABOUTME: Core types and constants for the Vantage race forecasting service
// ABOUTME: Foundation crate with error handling, run records, prediction curves and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Vantage Core
//!
//! Foundation crate providing shared types and constants for the Vantage race
//! forecasting service. The projection engine and the HTTP service both build
//! on these types; nothing in here performs computation beyond construction
//! and validation.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode` and `AppResult`
//! - **constants**: Canonical race distances, physiological CV band, version labels
//! - **models**: Run records, prediction modes, distance keys and prediction curves

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models (`RunRecord`, `PredictionCurve`, `PredictionMode`, ...)
pub mod models;
