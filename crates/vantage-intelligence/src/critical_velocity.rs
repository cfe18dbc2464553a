// ABOUTME: Critical velocity and D-prime estimation from irregular, noisy run history
// ABOUTME: General and structural variants with robust weighted fitting and race-effort cross-check
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(clippy::cast_precision_loss)] // Safe: day counts are small

//! # Critical Velocity Estimation
//!
//! The two-parameter endurance model says a runner covers
//! `distance = D′ + CV · duration` for efforts above critical velocity. Fitting
//! distance against duration across a history therefore yields CV as the
//! slope and D′ as the (non-negative) intercept.
//!
//! Two estimator variants exist:
//!
//! - [`CriticalVelocityEstimator::estimate`]: the general estimator over the
//!   most recent runs, weighted towards longer easier efforts and recent runs.
//! - [`CriticalVelocityEstimator::structural`]: restricted to the last 90 days
//!   and, with fewer than three distinct distances, substituted by recent
//!   race-effort evidence. Used by the prediction orchestrator.
//!
//! Both variants cap the CV at 1.02 times the best recent race-effort CV. A
//! slower fitted CV is kept: a race effort's average speed includes the D′
//! contribution and is always above CV when D′ is positive.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};
use vantage_core::constants::critical_velocity::{self as cv_band};

use crate::digest::{personal_bests, DatedRun, HistoryDigest};
use crate::physiological_constants::critical_velocity::{
    MAX_FIT_RUNS, MIN_FIT_POINTS, OUTLIER_SIGMA, RECENCY_HALF_LIFE_DAYS, RECENCY_WEIGHT_MAX,
    RECENCY_WEIGHT_MIN, REGRESSION_DISTANCE_FREE_KM, REGRESSION_DISTANCE_SCALE_KM,
    REGRESSION_PACE_FLOOR, REGRESSION_PACE_WEIGHT_MAX, REGRESSION_PACE_WEIGHT_MIN,
    REGRESSION_REFERENCE_PACE, REGRESSION_WEIGHT_MAX, REGRESSION_WEIGHT_MIN,
    STRUCTURAL_WINDOW_DAYS, TWO_POINT_MIN_DELTA_SECONDS, UNDATED_AGE_DAYS,
};
use crate::physiological_constants::race_effort::CV_CAP_FACTOR;
use crate::regression::{std_dev, LinearFit, WeightedRegression};

/// How a CV profile was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CvMethod {
    /// No usable CV; projections fall back to a power law
    #[serde(rename = "riegel-fallback")]
    RiegelFallback,
    /// Slope between exactly two distinct distances
    #[serde(rename = "two-point-cv")]
    TwoPoint,
    /// Robust weighted regression over three or more distinct distances
    #[serde(rename = "robust-weighted-cv")]
    RobustWeighted,
    /// Structural variant (recent window, race-effort substitution)
    #[serde(rename = "structural-cv")]
    Structural,
}

impl CvMethod {
    /// Wire label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RiegelFallback => "riegel-fallback",
            Self::TwoPoint => "two-point-cv",
            Self::RobustWeighted => "robust-weighted-cv",
            Self::Structural => "structural-cv",
        }
    }
}

/// A successfully estimated CV and D′
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CvFit {
    /// Critical velocity in km/s, always inside the plausible CV band
    pub cv: f64,
    /// Reserve distance in km, never negative
    pub d_prime: f64,
    /// Weighted r² of the fit, when defined
    pub r_squared: Option<f64>,
    /// Distinct distances the estimate was based on
    pub distance_count: usize,
    /// Whether the fit is trustworthy
    pub stable: bool,
    /// Estimation path
    pub method: CvMethod,
}

/// Outcome of CV estimation
///
/// `Fallback` carries no CV at all, so "no CV but a fitted method" cannot be
/// represented.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CvProfile {
    /// No usable estimate
    Fallback {
        /// Distinct distances that were available
        distance_count: usize,
    },
    /// Usable estimate
    Fitted(CvFit),
}

impl CvProfile {
    /// Critical velocity, if estimated
    #[must_use]
    pub const fn cv(&self) -> Option<f64> {
        match self {
            Self::Fallback { .. } => None,
            Self::Fitted(fit) => Some(fit.cv),
        }
    }

    /// Reserve distance, zero without an estimate
    #[must_use]
    pub const fn d_prime(&self) -> f64 {
        match self {
            Self::Fallback { .. } => 0.0,
            Self::Fitted(fit) => fit.d_prime,
        }
    }

    /// Fit quality, if defined
    #[must_use]
    pub const fn r_squared(&self) -> Option<f64> {
        match self {
            Self::Fallback { .. } => None,
            Self::Fitted(fit) => fit.r_squared,
        }
    }

    /// Distinct distances considered
    #[must_use]
    pub const fn distance_count(&self) -> usize {
        match self {
            Self::Fallback { distance_count } => *distance_count,
            Self::Fitted(fit) => fit.distance_count,
        }
    }

    /// Whether the estimate is stable; a fallback never is
    #[must_use]
    pub const fn is_stable(&self) -> bool {
        match self {
            Self::Fallback { .. } => false,
            Self::Fitted(fit) => fit.stable,
        }
    }

    /// Estimation path
    #[must_use]
    pub const fn method(&self) -> CvMethod {
        match self {
            Self::Fallback { .. } => CvMethod::RiegelFallback,
            Self::Fitted(fit) => fit.method,
        }
    }

    /// The fit, if any
    #[must_use]
    pub const fn fit(&self) -> Option<&CvFit> {
        match self {
            Self::Fallback { .. } => None,
            Self::Fitted(fit) => Some(fit),
        }
    }
}

/// Samples prepared for a distance-on-duration fit
struct FitSamples {
    durations: Vec<f64>,
    distances: Vec<f64>,
    weights: Vec<f64>,
}

/// Result of the outlier-rejecting robust fit
struct RobustFit {
    line: LinearFit,
    r_squared: Option<f64>,
}

/// Critical velocity estimator
pub struct CriticalVelocityEstimator;

impl CriticalVelocityEstimator {
    /// General-purpose estimate over the whole history
    ///
    /// Zero or one distinct distance yields a fallback, two distinct distances
    /// the two-point slope, and three or more the robust weighted fit over the
    /// most recent runs.
    #[must_use]
    pub fn estimate(digest: &HistoryDigest<'_>) -> CvProfile {
        let bests = digest.personal_bests();
        let distance_count = bests.len();

        let profile = match distance_count {
            0 | 1 => CvProfile::Fallback { distance_count },
            2 => {
                let (short, long) = (bests[0], bests[1]);
                Self::two_point(
                    short.distance_km(),
                    short.duration_seconds(),
                    long.distance_km(),
                    long.duration_seconds(),
                )
                .map_or(CvProfile::Fallback { distance_count }, |(cv, d_prime)| {
                    CvProfile::Fitted(CvFit {
                        cv,
                        d_prime,
                        r_squared: None,
                        distance_count,
                        stable: true,
                        method: CvMethod::TwoPoint,
                    })
                })
            }
            _ => Self::general_fit(digest, distance_count),
        };

        let profile = Self::cross_check(profile, digest.best_race_effort_cv());
        tracing::debug!(
            method = profile.method().as_str(),
            cv = ?profile.cv(),
            d_prime = profile.d_prime(),
            distance_count,
            "critical velocity estimated"
        );
        profile
    }

    /// Structural estimate over the last 90 days with race-effort substitution
    #[must_use]
    pub fn structural(digest: &HistoryDigest<'_>) -> CvProfile {
        let recent: Vec<DatedRun<'_>> = digest.dated_within(STRUCTURAL_WINDOW_DAYS).collect();
        let distance_count = personal_bests(recent.iter().map(|dated| dated.run)).len();
        let race_cv = digest.best_race_effort_cv();

        let profile = if distance_count < MIN_FIT_POINTS {
            race_cv.map_or(CvProfile::Fallback { distance_count }, |cv| {
                tracing::debug!(cv, distance_count, "structural CV substituted by race effort");
                CvProfile::Fitted(CvFit {
                    cv,
                    d_prime: 0.0,
                    r_squared: None,
                    distance_count,
                    stable: true,
                    method: CvMethod::Structural,
                })
            })
        } else {
            let samples = FitSamples {
                durations: recent.iter().map(|d| d.run.duration_seconds()).collect(),
                distances: recent.iter().map(|d| d.run.distance_km()).collect(),
                weights: recent.iter().map(|d| recency_weight(Some(d.age_days))).collect(),
            };
            match Self::robust_fit(&samples) {
                Some(fit) if fit.line.slope > 0.0 => CvProfile::Fitted(CvFit {
                    cv: cv_band::clip(fit.line.slope),
                    d_prime: fit.line.intercept.max(0.0),
                    r_squared: fit.r_squared,
                    distance_count,
                    stable: true,
                    method: CvMethod::Structural,
                }),
                _ => CvProfile::Fallback { distance_count },
            }
        };

        let profile = Self::cross_check(profile, race_cv);
        tracing::debug!(
            cv = ?profile.cv(),
            d_prime = profile.d_prime(),
            r_squared = ?profile.r_squared(),
            distance_count,
            "structural critical velocity estimated"
        );
        profile
    }

    /// CV and D′ from two points
    ///
    /// Returns `None` when the durations coincide or the slope is not positive.
    #[must_use]
    pub fn two_point(
        distance_a_km: f64,
        duration_a_s: f64,
        distance_b_km: f64,
        duration_b_s: f64,
    ) -> Option<(f64, f64)> {
        let delta_t = duration_b_s - duration_a_s;
        if delta_t.abs() < TWO_POINT_MIN_DELTA_SECONDS {
            return None;
        }
        let cv = (distance_b_km - distance_a_km) / delta_t;
        if !cv.is_finite() || cv <= 0.0 {
            return None;
        }
        let d_prime = cv.mul_add(-duration_a_s, distance_a_km).max(0.0);
        Some((cv_band::clip(cv), d_prime))
    }

    /// Cap the CV at 1.02 times the recent race-effort CV
    fn cross_check(profile: CvProfile, race_cv: Option<f64>) -> CvProfile {
        match (profile, race_cv) {
            (CvProfile::Fitted(mut fit), Some(race_cv)) => {
                let checked = fit.cv.min(cv_band::clip(race_cv * CV_CAP_FACTOR));
                if checked < fit.cv {
                    tracing::debug!(
                        fitted = fit.cv,
                        race_cv,
                        checked,
                        "CV capped by race-effort cross-check"
                    );
                }
                fit.cv = checked;
                CvProfile::Fitted(fit)
            }
            (profile, _) => profile,
        }
    }

    fn general_fit(digest: &HistoryDigest<'_>, distance_count: usize) -> CvProfile {
        let mut runs: Vec<(Option<i64>, f64, f64, f64)> = digest
            .valid()
            .iter()
            .map(|run| {
                let age = run.date().map(|date| (digest.as_of() - date).num_days());
                let weight = regression_weight(run.distance_km(), run.avg_pace()) * recency_weight(age);
                (age, run.duration_seconds(), run.distance_km(), weight)
            })
            .collect();

        // Oldest first; undated runs rank oldest. Stable sort keeps input order within ties.
        runs.sort_by_key(|(age, ..)| Reverse(age.unwrap_or(i64::MAX)));
        let start = runs.len().saturating_sub(MAX_FIT_RUNS);
        let window = &runs[start..];

        let samples = FitSamples {
            durations: window.iter().map(|(_, duration, ..)| *duration).collect(),
            distances: window.iter().map(|(_, _, distance, _)| *distance).collect(),
            weights: window.iter().map(|(.., weight)| *weight).collect(),
        };

        match Self::robust_fit(&samples) {
            Some(fit) if fit.line.slope > 0.0 => {
                let stable = fit.line.slope.is_finite()
                    && fit.r_squared.map_or(true, |r2| r2.is_finite() && r2 >= 0.0);
                CvProfile::Fitted(CvFit {
                    cv: cv_band::clip(fit.line.slope),
                    d_prime: fit.line.intercept.max(0.0),
                    r_squared: fit.r_squared,
                    distance_count,
                    stable,
                    method: CvMethod::RobustWeighted,
                })
            }
            _ => CvProfile::Fallback { distance_count },
        }
    }

    /// Huber fit, outlier rejection at 2.5 residual standard deviations, refit
    fn robust_fit(samples: &FitSamples) -> Option<RobustFit> {
        let initial =
            WeightedRegression::huber(&samples.durations, &samples.distances, &samples.weights)?;
        let residuals = initial.residuals(&samples.durations, &samples.distances);
        let spread = std_dev(&residuals);

        let keep: Vec<bool> = if spread > 0.0 {
            residuals
                .iter()
                .map(|residual| residual.abs() <= OUTLIER_SIGMA * spread)
                .collect()
        } else {
            vec![true; residuals.len()]
        };

        let kept = keep.iter().filter(|k| **k).count();
        let (durations, distances, weights) = if kept >= MIN_FIT_POINTS && kept < keep.len() {
            tracing::debug!(rejected = keep.len() - kept, "outliers rejected before refit");
            let select = |values: &[f64]| -> Vec<f64> {
                values
                    .iter()
                    .zip(&keep)
                    .filter_map(|(value, k)| k.then_some(*value))
                    .collect()
            };
            (
                select(&samples.durations),
                select(&samples.distances),
                select(&samples.weights),
            )
        } else {
            (
                samples.durations.clone(),
                samples.distances.clone(),
                samples.weights.clone(),
            )
        };

        let line = WeightedRegression::huber(&durations, &distances, &weights)?;
        let predicted: Vec<f64> = durations.iter().map(|t| line.predict(*t)).collect();
        Some(RobustFit {
            line,
            r_squared: WeightedRegression::r_squared(&distances, &predicted, &weights),
        })
    }
}

/// Weight favouring longer, easier efforts in the general estimator
#[must_use]
pub fn regression_weight(distance_km: f64, avg_pace: f64) -> f64 {
    let distance_weight =
        (-(distance_km - REGRESSION_DISTANCE_FREE_KM).max(0.0) / REGRESSION_DISTANCE_SCALE_KM).exp();
    let pace_weight = (REGRESSION_REFERENCE_PACE / avg_pace.max(REGRESSION_PACE_FLOOR))
        .clamp(REGRESSION_PACE_WEIGHT_MIN, REGRESSION_PACE_WEIGHT_MAX);
    (distance_weight * pace_weight).clamp(REGRESSION_WEIGHT_MIN, REGRESSION_WEIGHT_MAX)
}

/// Exponential recency decay with a 21-day half-life; undated runs count as 90 days old
#[must_use]
pub fn recency_weight(age_days: Option<i64>) -> f64 {
    let age = age_days.map_or(UNDATED_AGE_DAYS, |days| days.max(0) as f64);
    0.5_f64
        .powf(age / RECENCY_HALF_LIFE_DAYS)
        .clamp(RECENCY_WEIGHT_MIN, RECENCY_WEIGHT_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recency_weight_half_life() {
        assert!((recency_weight(Some(0)) - 1.0).abs() < 1e-12);
        assert!((recency_weight(Some(21)) - 0.5).abs() < 1e-12);
        assert!((recency_weight(Some(-4)) - 1.0).abs() < 1e-12);
        assert!((recency_weight(Some(1_000)) - RECENCY_WEIGHT_MIN).abs() < 1e-12);
        assert!((recency_weight(None) - 0.5_f64.powf(90.0 / 21.0)).abs() < 1e-12);
    }

    #[test]
    fn test_regression_weight_bounds() {
        assert!((regression_weight(5.0, 5.5) - 1.0).abs() < 1e-12);
        assert!((regression_weight(3.0, 2.0) - REGRESSION_PACE_WEIGHT_MAX).abs() < 1e-12);
        assert!((regression_weight(100.0, 9.0) - REGRESSION_WEIGHT_MIN).abs() < 1e-12);
    }

    #[test]
    fn test_two_point_formula() {
        let (cv, d_prime) = CriticalVelocityEstimator::two_point(5.0, 1_200.0, 10.0, 2_500.0).unwrap();
        assert!((cv - 5.0 / 1_300.0).abs() < 1e-15);
        assert!((d_prime - (5.0 - cv * 1_200.0)).abs() < 1e-12);
        assert!(CriticalVelocityEstimator::two_point(5.0, 1_200.0, 10.0, 1_200.0).is_none());
        assert!(CriticalVelocityEstimator::two_point(5.0, 1_200.0, 10.0, 1_100.0).is_none());
    }

    #[test]
    fn test_cross_check_only_caps() {
        let fitted = |cv| {
            CvProfile::Fitted(CvFit {
                cv,
                d_prime: 0.0,
                r_squared: None,
                distance_count: 3,
                stable: true,
                method: CvMethod::Structural,
            })
        };
        let slower = CriticalVelocityEstimator::cross_check(fitted(0.003), Some(0.004));
        assert!((slower.cv().unwrap() - 0.003).abs() < 1e-15);
        let capped = CriticalVelocityEstimator::cross_check(fitted(0.005), Some(0.004));
        assert!((capped.cv().unwrap() - 0.004 * 1.02).abs() < 1e-15);
        let fallback = CvProfile::Fallback { distance_count: 1 };
        assert_eq!(CriticalVelocityEstimator::cross_check(fallback, Some(0.004)), fallback);
    }
}
