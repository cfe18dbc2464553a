// ABOUTME: Prediction orchestrator combining CV estimation, readiness, taper and curve guarantees
// ABOUTME: Produces the full prediction payload for current or race-day mode from one request
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use vantage_core::constants::critical_velocity::clip;
use vantage_core::constants::versions::LOGIC_VERSION;
use vantage_core::models::{
    DistanceKey, ModelSource, PredictionCurve, PredictionMode, PredictionRequest,
    PredictionResult,
};

use crate::critical_velocity::{CriticalVelocityEstimator, CvProfile};
use crate::curve::{generate_curve_from_cv, personalized_exponent, riegel_curve, round3};
use crate::digest::HistoryDigest;
use crate::guarantees::{apply_recent_pb_floor, enforce_guarantees, race_day_clamp};
use crate::physiological_constants::taper::{CV_FACTOR_MAX, CV_FACTOR_MIN, MAX_GAIN_OVER_CURRENT};
use crate::physiological_constants::training_load::{READINESS_MAX, READINESS_MIN};
use crate::taper::TaperSimulator;
use crate::training_load::{ReadinessCalculator, ReadinessState};
use crate::uncertainty::UncertaintyEstimator;

/// Divisor floor when recovering the applied factor from two velocities
const MIN_CV_DIVISOR: f64 = 1e-6;

/// Curve and factor chosen before the final guarantees
struct Projection {
    curve: PredictionCurve,
    factor: f64,
    source: ModelSource,
    /// Structural CV before any readiness or taper factor
    base_cv: Option<f64>,
}

/// Race time predictor
///
/// Stateless: every call derives its result from the request alone and the
/// supplied reference instant.
pub struct RacePredictor;

impl RacePredictor {
    /// Predict race times for the request
    ///
    /// `as_of` anchors every recency rule. Sparse or empty histories degrade
    /// to a power-law projection with reduced confidence rather than failing.
    #[must_use]
    pub fn predict(request: &PredictionRequest, as_of: DateTime<Utc>) -> PredictionResult {
        let digest = HistoryDigest::new(&request.user_history, as_of);
        let profile = CriticalVelocityEstimator::structural(&digest);
        let readiness = ReadinessCalculator::compute(&digest);
        let current_factor = readiness.readiness_modifier.clamp(READINESS_MIN, READINESS_MAX);

        tracing::debug!(
            user_id = request.user_id.as_deref().unwrap_or("anonymous"),
            mode = request.mode.as_str(),
            history = digest.record_count(),
            method = profile.method().as_str(),
            cv = ?profile.cv(),
            tsb = readiness.tsb,
            "prediction started"
        );

        let projection = match profile.cv() {
            Some(cv) => Self::structural_projection(cv, &profile, &readiness, current_factor, request.mode),
            None => Self::fallback_projection(request, &digest),
        };

        let allow_breakthrough = request.mode == PredictionMode::RaceDay && readiness.tsb > 0.0;
        let guaranteed = enforce_guarantees(&projection.curve);
        let floored = apply_recent_pb_floor(&guaranteed, &digest, allow_breakthrough);
        let mut predicted_times = enforce_guarantees(&floored);

        if let (PredictionMode::RaceDay, Some(cv)) = (request.mode, projection.base_cv) {
            let current = enforce_guarantees(&generate_curve_from_cv(
                clip(cv * current_factor),
                profile.d_prime(),
            ));
            // The clamp rounds to the cent, which can undercut a ratio floor by a fraction of one
            predicted_times = enforce_guarantees(&race_day_clamp(&predicted_times, &current));
        }

        let prediction_std = UncertaintyEstimator::prediction_std(
            &request.user_history,
            &request.cohort_history,
            &profile,
            &predicted_times,
        );
        let confidence = UncertaintyEstimator::confidence(digest.record_count(), &profile);

        tracing::debug!(
            source = projection.source.as_str(),
            factor = projection.factor,
            confidence,
            marathon = predicted_times.get(DistanceKey::Marathon),
            "prediction complete"
        );

        PredictionResult {
            predicted_marathon_time: predicted_times.get(DistanceKey::Marathon),
            predicted_times,
            prediction_std,
            readiness_adjustment_factor: round3(projection.factor),
            confidence: round3(confidence),
            model_source: projection.source,
            model_version: LOGIC_VERSION.to_owned(),
        }
    }

    fn structural_projection(
        cv: f64,
        profile: &CvProfile,
        readiness: &ReadinessState,
        current_factor: f64,
        mode: PredictionMode,
    ) -> Projection {
        let current_cv = clip(cv * current_factor);
        let (selected_cv, factor) = match mode {
            PredictionMode::Current => (current_cv, current_factor),
            PredictionMode::RaceDay => {
                let taper = TaperSimulator::simulate(readiness);
                let taper_factor = taper.race_day_modifier.clamp(CV_FACTOR_MIN, CV_FACTOR_MAX);
                let selected = clip(cv * taper_factor).min(current_cv * MAX_GAIN_OVER_CURRENT);
                (selected, selected / cv.max(MIN_CV_DIVISOR))
            }
        };

        Projection {
            curve: generate_curve_from_cv(selected_cv, profile.d_prime()),
            factor,
            source: ModelSource::structural(mode),
            base_cv: Some(cv),
        }
    }

    fn fallback_projection(request: &PredictionRequest, digest: &HistoryDigest<'_>) -> Projection {
        let (base_km, base_seconds) = digest.latest().map_or(
            (request.distance_km, request.duration_seconds),
            |run| (run.distance_km(), run.duration_seconds()),
        );
        let exponent = personalized_exponent(digest).exponent_or_default();
        tracing::debug!(base_km, base_seconds, exponent, "power-law fallback");

        Projection {
            curve: riegel_curve(base_seconds, base_km, exponent),
            factor: 1.0,
            source: ModelSource::RiegelFallback,
            base_cv: None,
        }
    }
}
