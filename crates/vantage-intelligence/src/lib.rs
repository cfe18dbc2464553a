// ABOUTME: Race projection engine built on critical velocity, readiness and curve guarantees
// ABOUTME: Pure, synchronous and deterministic given the request history and an as-of instant
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Vantage Intelligence
//!
//! Predicts race times for the canonical distances (5K, 10K, half, 25K,
//! marathon) from a runner's recent history.
//!
//! ## Modules
//!
//! - **digest**: one pass over the history producing everything the engine needs
//! - **regression**: weighted least squares, Huber IRLS and weighted r²
//! - **critical_velocity**: CV and D′ estimation, race-effort cross-check
//! - **curve**: CV and power-law projections
//! - **training_load**: ATL/CTL/TSB readiness
//! - **taper**: simulated race-day freshness
//! - **guarantees**: monotonic pace, distance ratios, PB floor, race-day clamp
//! - **uncertainty**: confidence and per-distance standard deviation
//! - **endurance**, **cohort**, **accuracy**: diagnostics around the core projection
//! - **predictor**: the orchestrator tying it all together
//!
//! The engine never reads the wall clock. Callers pass the `as_of` instant
//! so that identical inputs always yield identical outputs.

/// Accuracy metrics against known race results
pub mod accuracy;

/// Nearest-neighbour CV estimate from cohort history
pub mod cohort;

/// Critical velocity estimation
pub mod critical_velocity;

/// CV-based and power-law curve projection
pub mod curve;

/// Per-request digest of the runner's history
pub mod digest;

/// Endurance profile diagnostics
pub mod endurance;

/// Consistency guarantees over a prediction curve
pub mod guarantees;

/// Physiological and modelling constants
pub mod physiological_constants;

/// Prediction orchestrator
pub mod predictor;

/// Regression primitives
pub mod regression;

/// Race-day taper simulation
pub mod taper;

/// Acute/chronic training load and readiness
pub mod training_load;

/// Confidence and standard deviation estimates
pub mod uncertainty;

pub use critical_velocity::{CriticalVelocityEstimator, CvFit, CvMethod, CvProfile};
pub use digest::HistoryDigest;
pub use predictor::RacePredictor;
pub use training_load::{ReadinessCalculator, ReadinessState};
