// ABOUTME: Confidence score and per-distance standard deviation for a prediction
// ABOUTME: Blends fit quality, pace variability, cohort dispersion and history sparsity
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(clippy::cast_precision_loss)] // Safe: history sizes are small

use vantage_core::models::{PredictionCurve, RunRecord};

use crate::critical_velocity::CvProfile;
use crate::curve::round2;
use crate::physiological_constants::uncertainty::{
    CONFIDENCE_BASE, CONFIDENCE_DISTANCE_CAP, CONFIDENCE_MAX, CONFIDENCE_MIN,
    CONFIDENCE_PER_DISTANCE, CONFIDENCE_PER_RUN, CONFIDENCE_R2_WEIGHT, CONFIDENCE_RUNS_CAP,
    DEFAULT_COHORT_DISPERSION, DEFAULT_PACE_VARIABILITY, DEFAULT_REGRESSION_UNCERTAINTY,
    REGRESSION_UNCERTAINTY_MAX, REGRESSION_UNCERTAINTY_MIN, RELATIVE_STD_MAX, RELATIVE_STD_MIN,
    UNSTABLE_PENALTY, WEIGHT_COHORT, WEIGHT_PACE_VARIABILITY, WEIGHT_REGRESSION, WEIGHT_SPARSITY,
};
use crate::regression::coefficient_of_variation;

/// Confidence and uncertainty estimation
pub struct UncertaintyEstimator;

impl UncertaintyEstimator {
    /// Scalar confidence in [0.3, 0.95]
    ///
    /// Grows with history size, distinct distances and r², and drops by 0.08
    /// for an unstable profile.
    #[must_use]
    pub fn confidence(history_count: usize, profile: &CvProfile) -> f64 {
        let richness = (history_count as f64 * CONFIDENCE_PER_RUN).min(CONFIDENCE_RUNS_CAP);
        let distance_richness =
            (profile.distance_count() as f64 * CONFIDENCE_PER_DISTANCE).min(CONFIDENCE_DISTANCE_CAP);
        let r2_term = profile
            .r_squared()
            .filter(|r2| r2.is_finite())
            .map_or(0.0, |r2| (r2.max(0.0) * CONFIDENCE_R2_WEIGHT).min(CONFIDENCE_R2_WEIGHT));

        let mut confidence = CONFIDENCE_BASE + richness + distance_richness + r2_term;
        if !profile.is_stable() {
            confidence -= UNSTABLE_PENALTY;
        }
        confidence.clamp(CONFIDENCE_MIN, CONFIDENCE_MAX)
    }

    /// Relative standard deviation in [0.03, 0.30]
    #[must_use]
    pub fn relative_std(
        user_history: &[RunRecord],
        cohort_history: &[RunRecord],
        profile: &CvProfile,
    ) -> f64 {
        let regression_uncertainty = profile
            .r_squared()
            .filter(|r2| r2.is_finite())
            .map_or(DEFAULT_REGRESSION_UNCERTAINTY, |r2| {
                (1.0 - r2.max(0.0)).clamp(REGRESSION_UNCERTAINTY_MIN, REGRESSION_UNCERTAINTY_MAX)
            });

        let paces: Vec<f64> = user_history.iter().map(RunRecord::avg_pace).collect();
        let pace_variability = coefficient_of_variation(&paces).unwrap_or(DEFAULT_PACE_VARIABILITY);

        let cohort_cvs: Vec<f64> = cohort_history.iter().map(RunRecord::implied_velocity).collect();
        let cohort_dispersion =
            coefficient_of_variation(&cohort_cvs).unwrap_or(DEFAULT_COHORT_DISPERSION);

        let sparsity = 1.0 / (user_history.len().max(1) as f64).sqrt();

        let blended = WEIGHT_REGRESSION * regression_uncertainty
            + WEIGHT_PACE_VARIABILITY * pace_variability
            + WEIGHT_COHORT * cohort_dispersion
            + WEIGHT_SPARSITY * sparsity;
        blended.clamp(RELATIVE_STD_MIN, RELATIVE_STD_MAX)
    }

    /// One standard deviation per distance, in seconds, rounded to the cent
    #[must_use]
    pub fn prediction_std(
        user_history: &[RunRecord],
        cohort_history: &[RunRecord],
        profile: &CvProfile,
        curve: &PredictionCurve,
    ) -> PredictionCurve {
        let relative = Self::relative_std(user_history, cohort_history, profile);
        curve.map(|_, seconds| {
            round2((seconds * relative).clamp(seconds * RELATIVE_STD_MIN, seconds * RELATIVE_STD_MAX))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::critical_velocity::{CvFit, CvMethod};

    #[test]
    fn test_confidence_floor_for_empty_history() {
        let profile = CvProfile::Fallback { distance_count: 0 };
        assert!((UncertaintyEstimator::confidence(0, &profile) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_confidence_rich_history_caps() {
        let profile = CvProfile::Fitted(CvFit {
            cv: 0.004,
            d_prime: 0.2,
            r_squared: Some(0.9),
            distance_count: 6,
            stable: true,
            method: CvMethod::Structural,
        });
        // 0.3 + 0.45 + 0.2 + 0.18 = 1.13, clipped
        assert!((UncertaintyEstimator::confidence(40, &profile) - 0.95).abs() < 1e-12);
    }

    #[test]
    fn test_default_relative_std() {
        let profile = CvProfile::Fallback { distance_count: 0 };
        let relative = UncertaintyEstimator::relative_std(&[], &[], &profile);
        // 0.3352 before clipping
        assert!((relative - 0.30).abs() < 1e-12);
    }
}
