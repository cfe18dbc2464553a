// ABOUTME: Auxiliary supervised regressor predicting implied velocity from raw run features
// ABOUTME: Linear least squares, gradient boosted trees and a seeded random forest
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use vantage_core::errors::{AppError, AppResult};

use super::features::{FeatureRow, TrainingSet, FEATURE_COUNT};
use super::tree::RegressionTree;

/// Boosting rounds
const BOOSTING_ROUNDS: usize = 100;
/// Shrinkage applied to every boosting round
const BOOSTING_LEARNING_RATE: f64 = 0.1;
/// Depth of each boosted tree
const BOOSTING_MAX_DEPTH: usize = 3;
/// Trees in the forest
const FOREST_TREES: usize = 260;
/// Depth limit of forest trees
const FOREST_MAX_DEPTH: usize = 12;
/// Base seed for forest bootstrap samples; tree `i` uses `FOREST_SEED + i`
const FOREST_SEED: u64 = 42;
/// Ridge term keeping the normal equations solvable for constant features
const RIDGE: f64 = 1e-9;

/// Training algorithm selector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegressorAlgorithm {
    /// Ordinary least squares with intercept
    Linear,
    /// Gradient boosted regression trees
    #[default]
    GradientBoosting,
    /// Bagged regression trees
    RandomForest,
}

impl RegressorAlgorithm {
    /// Wire name of the algorithm
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::GradientBoosting => "gradient_boosting",
            Self::RandomForest => "random_forest",
        }
    }
}

impl fmt::Display for RegressorAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Linear model fitted on standardised features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    intercept: f64,
    coefficients: [f64; FEATURE_COUNT],
    means: [f64; FEATURE_COUNT],
    scales: [f64; FEATURE_COUNT],
}

impl LinearModel {
    fn fit(set: &TrainingSet) -> Self {
        let n = set.len() as f64;
        let target_mean = set.targets.iter().sum::<f64>() / n;

        let mut means = [0.0; FEATURE_COUNT];
        for row in &set.rows {
            for (mean, value) in means.iter_mut().zip(row) {
                *mean += value / n;
            }
        }
        let mut scales = [0.0; FEATURE_COUNT];
        for row in &set.rows {
            for ((scale, value), mean) in scales.iter_mut().zip(row).zip(&means) {
                *scale += (value - mean).powi(2) / n;
            }
        }
        for scale in &mut scales {
            *scale = if *scale > 0.0 { scale.sqrt() } else { 1.0 };
        }

        // Normal equations on centred, scaled features
        let mut gram = [[0.0; FEATURE_COUNT]; FEATURE_COUNT];
        let mut rhs = [0.0; FEATURE_COUNT];
        for (row, target) in set.rows.iter().zip(&set.targets) {
            let z = standardise(row, &means, &scales);
            let residual = target - target_mean;
            for ((gram_row, rhs_i), z_i) in gram.iter_mut().zip(rhs.iter_mut()).zip(&z) {
                *rhs_i += z_i * residual;
                for (cell, z_j) in gram_row.iter_mut().zip(&z) {
                    *cell += z_i * z_j;
                }
            }
        }
        for (i, row) in gram.iter_mut().enumerate() {
            row[i] += RIDGE * n;
        }

        let coefficients = solve(gram, rhs).unwrap_or([0.0; FEATURE_COUNT]);
        Self {
            intercept: target_mean,
            coefficients,
            means,
            scales,
        }
    }

    fn predict(&self, row: &FeatureRow) -> f64 {
        standardise(row, &self.means, &self.scales)
            .iter()
            .zip(&self.coefficients)
            .fold(self.intercept, |acc, (z, beta)| z.mul_add(*beta, acc))
    }
}

/// Gradient boosted trees under squared loss, initialised at the target mean
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostedTrees {
    init: f64,
    learning_rate: f64,
    trees: Vec<RegressionTree>,
}

impl GradientBoostedTrees {
    fn fit(set: &TrainingSet) -> Self {
        let init = set.targets.iter().sum::<f64>() / set.len() as f64;
        let mut current = vec![init; set.len()];
        let mut trees = Vec::with_capacity(BOOSTING_ROUNDS);

        for _ in 0..BOOSTING_ROUNDS {
            let residuals: Vec<f64> = set
                .targets
                .iter()
                .zip(&current)
                .map(|(target, fitted)| target - fitted)
                .collect();
            let tree = RegressionTree::fit(
                &set.rows,
                &residuals,
                (0..set.len()).collect(),
                BOOSTING_MAX_DEPTH,
            );
            for (fitted, row) in current.iter_mut().zip(&set.rows) {
                *fitted = BOOSTING_LEARNING_RATE.mul_add(tree.predict(row), *fitted);
            }
            trees.push(tree);
        }

        Self {
            init,
            learning_rate: BOOSTING_LEARNING_RATE,
            trees,
        }
    }

    fn predict(&self, row: &FeatureRow) -> f64 {
        self.trees
            .iter()
            .fold(self.init, |acc, tree| self.learning_rate.mul_add(tree.predict(row), acc))
    }
}

/// Bootstrap-aggregated regression trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    fn fit(set: &TrainingSet) -> Self {
        let n = set.len();
        let trees = (0..FOREST_TREES)
            .into_par_iter()
            .map(|i| {
                let mut rng = ChaCha8Rng::seed_from_u64(FOREST_SEED + i as u64);
                let sample = (0..n).map(|_| rng.gen_range(0..n)).collect();
                RegressionTree::fit(&set.rows, &set.targets, sample, FOREST_MAX_DEPTH)
            })
            .collect();
        Self { trees }
    }

    fn predict(&self, row: &FeatureRow) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        self.trees.iter().map(|tree| tree.predict(row)).sum::<f64>() / self.trees.len() as f64
    }
}

/// A fitted auxiliary regressor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum Regressor {
    /// Linear least squares
    Linear(LinearModel),
    /// Gradient boosted trees
    GradientBoosting(GradientBoostedTrees),
    /// Random forest
    RandomForest(RandomForest),
}

impl Regressor {
    /// Fit the selected algorithm
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error when the training set is empty or holds
    /// non-finite values
    pub fn fit(algorithm: RegressorAlgorithm, set: &TrainingSet) -> AppResult<Self> {
        if set.is_empty() {
            return Err(AppError::invalid_input(
                "cannot fit a regressor on an empty training set",
            ));
        }
        let finite = set.targets.iter().all(|t| t.is_finite())
            && set.rows.iter().flatten().all(|v| v.is_finite());
        if !finite {
            return Err(AppError::invalid_input(
                "training set contains non-finite values",
            ));
        }

        Ok(match algorithm {
            RegressorAlgorithm::Linear => Self::Linear(LinearModel::fit(set)),
            RegressorAlgorithm::GradientBoosting => {
                Self::GradientBoosting(GradientBoostedTrees::fit(set))
            }
            RegressorAlgorithm::RandomForest => Self::RandomForest(RandomForest::fit(set)),
        })
    }

    /// Algorithm this model was trained with
    #[must_use]
    pub const fn algorithm(&self) -> RegressorAlgorithm {
        match self {
            Self::Linear(_) => RegressorAlgorithm::Linear,
            Self::GradientBoosting(_) => RegressorAlgorithm::GradientBoosting,
            Self::RandomForest(_) => RegressorAlgorithm::RandomForest,
        }
    }

    /// Predicted implied velocity (km/s) for a feature row
    #[must_use]
    pub fn predict(&self, row: &FeatureRow) -> f64 {
        match self {
            Self::Linear(model) => model.predict(row),
            Self::GradientBoosting(model) => model.predict(row),
            Self::RandomForest(model) => model.predict(row),
        }
    }
}

fn standardise(
    row: &FeatureRow,
    means: &[f64; FEATURE_COUNT],
    scales: &[f64; FEATURE_COUNT],
) -> [f64; FEATURE_COUNT] {
    std::array::from_fn(|j| (row[j] - means[j]) / scales[j])
}

/// Gaussian elimination with partial pivoting; `None` when singular
#[allow(clippy::needless_range_loop)]
fn solve(
    mut a: [[f64; FEATURE_COUNT]; FEATURE_COUNT],
    mut b: [f64; FEATURE_COUNT],
) -> Option<[f64; FEATURE_COUNT]> {
    for col in 0..FEATURE_COUNT {
        let pivot = (col..FEATURE_COUNT)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..FEATURE_COUNT {
            let factor = a[row][col] / a[col][col];
            for k in col..FEATURE_COUNT {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = [0.0; FEATURE_COUNT];
    for row in (0..FEATURE_COUNT).rev() {
        let tail: f64 = (row + 1..FEATURE_COUNT).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    x.iter().all(|v| v.is_finite()).then_some(x)
}
