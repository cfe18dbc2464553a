// ABOUTME: Converts a critical velocity profile or a single effort into a full distance-time curve
// ABOUTME: CV/D-prime projection for the structural path, power-law projection for the fallback path
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use vantage_core::constants::distances::HALF_MARATHON_KM;
use vantage_core::models::PredictionCurve;

use crate::digest::HistoryDigest;
use crate::physiological_constants::curve::{
    D_PRIME_REACH, MIN_BASE_DISTANCE_KM, MIN_PERSONAL_EXPONENT, MIN_PROJECTED_SECONDS,
    RIEGEL_EXPONENT,
};
use crate::regression::WeightedRegression;

/// Smallest distance left after subtracting D′ (km)
const MIN_ADJUSTED_DISTANCE_KM: f64 = 1e-6;

/// Round to the cent of a second
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to three decimals, used for reported factors and scores
#[must_use]
pub fn round3(value: f64) -> f64 {
    (value * 1_000.0).round() / 1_000.0
}

/// Time to cover `target_km` at critical velocity `cv` with reserve `d_prime`
///
/// D′ shortens only efforts below the half marathon and within four times
/// D′; everything else runs at CV. The result is floored at 300 s. Returns
/// `None` for a CV that is not positive.
#[must_use]
pub fn project_time_with_cv(target_km: f64, cv: f64, d_prime: f64) -> Option<f64> {
    if !cv.is_finite() || cv <= 0.0 {
        return None;
    }
    let d_prime = d_prime.max(0.0);
    let effective_km =
        if d_prime <= 0.0 || target_km >= HALF_MARATHON_KM || target_km > D_PRIME_REACH * d_prime {
            target_km
        } else {
            (target_km - d_prime).max(MIN_ADJUSTED_DISTANCE_KM)
        };
    Some((effective_km / cv).max(MIN_PROJECTED_SECONDS))
}

/// Project every canonical distance from CV and D′, rounded to the cent
///
/// A non-positive CV yields the 300 s floor everywhere.
#[must_use]
pub fn generate_curve_from_cv(cv: f64, d_prime: f64) -> PredictionCurve {
    PredictionCurve::from_fn(|key| {
        round2(project_time_with_cv(key.distance_km(), cv, d_prime).unwrap_or(MIN_PROJECTED_SECONDS))
    })
}

/// Power-law projection `time_base * (target / base)^exponent`
#[must_use]
pub fn riegel_project(base_time_s: f64, base_km: f64, target_km: f64, exponent: f64) -> f64 {
    base_time_s * (target_km / base_km.max(MIN_BASE_DISTANCE_KM)).powf(exponent)
}

/// Project every canonical distance from one effort, floored at 300 s and rounded to the cent
#[must_use]
pub fn riegel_curve(base_time_s: f64, base_km: f64, exponent: f64) -> PredictionCurve {
    PredictionCurve::from_fn(|key| {
        round2(riegel_project(base_time_s, base_km, key.distance_km(), exponent).max(MIN_PROJECTED_SECONDS))
    })
}

/// Personalised power-law exponent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExponentFit {
    /// Fitted exponent floored at 1.0; `None` with fewer than two distinct distances
    pub exponent: Option<f64>,
    /// Log-space r², when defined
    pub r_squared: Option<f64>,
    /// Distinct distances used
    pub distance_count: usize,
}

impl ExponentFit {
    /// The fitted exponent or the default 1.06
    #[must_use]
    pub fn exponent_or_default(&self) -> f64 {
        self.exponent.unwrap_or(RIEGEL_EXPONENT)
    }
}

/// Fit the power-law exponent across the runner's per-distance personal bests
#[must_use]
pub fn personalized_exponent(digest: &HistoryDigest<'_>) -> ExponentFit {
    let bests = digest.personal_bests();
    let distance_count = bests.len();
    if distance_count < 2 {
        return ExponentFit {
            exponent: None,
            r_squared: None,
            distance_count,
        };
    }

    let distances: Vec<f64> = bests.iter().map(|run| run.distance_km()).collect();
    let durations: Vec<f64> = bests.iter().map(|run| run.duration_seconds()).collect();
    let fit = WeightedRegression::log_log(&distances, &durations);

    ExponentFit {
        exponent: fit
            .map(|fit| fit.exponent)
            .filter(|exponent| exponent.is_finite())
            .map(|exponent| exponent.max(MIN_PERSONAL_EXPONENT)),
        r_squared: fit.and_then(|fit| fit.r_squared),
        distance_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vantage_core::models::DistanceKey;

    #[test]
    fn test_d_prime_only_shortens_short_efforts() {
        let cv = 0.004;
        assert_eq!(project_time_with_cv(5.0, cv, 0.0), Some(1_250.0));
        let with_reserve = project_time_with_cv(5.0, cv, 2.0).unwrap();
        assert!((with_reserve - 750.0).abs() < 1e-9);
        // Beyond four times D' the reserve no longer applies
        assert_eq!(project_time_with_cv(10.0, cv, 2.0), Some(2_500.0));
        assert_eq!(project_time_with_cv(21.0975, cv, 8.0), Some(21.0975 / cv));
    }

    #[test]
    fn test_projection_floor_and_invalid_cv() {
        assert_eq!(project_time_with_cv(0.5, 0.005, 0.0), Some(300.0));
        assert_eq!(project_time_with_cv(5.0, 0.0, 0.0), None);
        let curve = generate_curve_from_cv(-1.0, 0.0);
        assert!(curve.iter().all(|(_, seconds)| (seconds - 300.0).abs() < f64::EPSILON));
    }

    #[test]
    fn test_riegel_curve_matches_formula() {
        let curve = riegel_curve(2_400.0, 10.0, 1.06);
        let expected = 2_400.0 * (42.195_f64 / 10.0).powf(1.06);
        assert!((curve.get(DistanceKey::Marathon) - expected).abs() < 0.006);
        assert!((curve.get(DistanceKey::TenK) - 2_400.0).abs() < 1e-9);
    }
}
