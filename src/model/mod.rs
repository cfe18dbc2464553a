// ABOUTME: Auxiliary regression model trained on raw run features, plus its versioned registry
// ABOUTME: Kept alongside the projection engine; predictions never consult it
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Auxiliary regressor and model registry
//!
//! `POST /train` refits this model; `POST /predict` is served entirely by the
//! critical velocity engine in `vantage_intelligence`.

/// Feature rows and synthetic training data
pub mod features;
/// Linear, gradient boosting and random forest regressors
pub mod regressor;
/// File-backed registry with atomic swap on retrain
pub mod registry;
/// Regression tree shared by the ensembles
pub mod tree;

pub use features::TrainingSet;
pub use regressor::{Regressor, RegressorAlgorithm};
pub use registry::{ActiveModel, ModelMetadata, ModelRegistry, TrainOutcome, TrainingMode};
