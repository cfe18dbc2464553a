// ABOUTME: Accuracy of previously issued predictions against the runs that followed them
// ABOUTME: Per-distance mean absolute error, mean absolute percentage error and sample counts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(clippy::cast_precision_loss)] // Safe: sample counts are small

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use vantage_core::models::{DistanceKey, PredictionCurve, RunRecord};

use crate::curve::round3;
use crate::physiological_constants::curve::{PB_TOLERANCE_KM, PB_TOLERANCE_RATIO};

/// The curve issued before a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuedPrediction {
    /// Predicted times at the time of issue
    pub predicted_times: PredictionCurve,
}

/// A completed run with the prediction that preceded it, if any
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatedRun {
    /// The completed run
    #[serde(flatten)]
    pub run: RunRecord,
    /// Prediction issued before the run
    #[serde(default)]
    pub prediction: Option<IssuedPrediction>,
}

/// Error metrics for one distance
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DistanceAccuracy {
    /// Mean absolute error in seconds (3-decimal)
    pub mae: f64,
    /// Mean absolute percentage error (3-decimal)
    pub mape: f64,
    /// Runs matched to this distance
    pub samples: usize,
}

/// Accuracy per canonical distance
pub type AccuracyReport = BTreeMap<DistanceKey, DistanceAccuracy>;

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Compare issued predictions with actual results
///
/// A run counts towards a distance when it lies within max(1 km, 10 %) of it.
/// Runs without a prediction are skipped. Every distance appears in the
/// report, with zeros when nothing matched.
#[must_use]
pub fn evaluate_prediction_accuracy(runs: &[EvaluatedRun]) -> AccuracyReport {
    let mut errors: BTreeMap<DistanceKey, (Vec<f64>, Vec<f64>)> = BTreeMap::new();

    for evaluated in runs {
        let Some(prediction) = &evaluated.prediction else {
            continue;
        };
        let actual = evaluated.run.duration_seconds();
        for key in DistanceKey::ALL {
            let distance = key.distance_km();
            if (evaluated.run.distance_km() - distance).abs()
                > PB_TOLERANCE_KM.max(distance * PB_TOLERANCE_RATIO)
            {
                continue;
            }
            let error = (prediction.predicted_times.get(key) - actual).abs();
            let (absolute, percentage) = errors.entry(key).or_default();
            absolute.push(error);
            if actual > 0.0 {
                percentage.push(error / actual * 100.0);
            }
        }
    }

    DistanceKey::ALL
        .iter()
        .map(|key| {
            let accuracy = errors.get(key).map_or_else(DistanceAccuracy::default, |(absolute, percentage)| {
                DistanceAccuracy {
                    mae: round3(mean(absolute)),
                    mape: round3(mean(percentage)),
                    samples: absolute.len(),
                }
            });
            (*key, accuracy)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vantage_core::models::RunRecordBuilder;

    #[test]
    fn test_accuracy_matches_within_tolerance() {
        let predicted = PredictionCurve::from_fn(|key| key.distance_km() * 250.0);
        let runs = vec![
            EvaluatedRun {
                run: RunRecordBuilder::new(10.3, 2_600.0).build(),
                prediction: Some(IssuedPrediction {
                    predicted_times: predicted,
                }),
            },
            EvaluatedRun {
                run: RunRecordBuilder::new(10.0, 2_400.0).build(),
                prediction: None,
            },
        ];
        let report = evaluate_prediction_accuracy(&runs);
        let ten_k = report[&DistanceKey::TenK];
        assert_eq!(ten_k.samples, 1);
        assert!((ten_k.mae - 100.0).abs() < 1e-9);
        assert!((ten_k.mape - round3(100.0 / 2_600.0 * 100.0)).abs() < 1e-9);
        assert_eq!(report[&DistanceKey::Marathon], DistanceAccuracy::default());
        assert_eq!(report.len(), 5);
    }
}
