// ABOUTME: Endurance diagnostics from heart-rate decoupling, pace fade and speed/endurance balance
// ABOUTME: Penalty multipliers for long targets and CV/D-prime attenuation for speed-biased profiles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(clippy::cast_precision_loss)] // Safe: history sizes are small

use serde::{Deserialize, Serialize};
use vantage_core::models::RunRecord;

use crate::curve::project_time_with_cv;
use crate::physiological_constants::endurance::{
    DECOUPLING_FLOOR, DECOUPLING_RATE, DECOUPLING_THRESHOLD, FADE_FLOOR, FADE_RATE,
    FADE_THRESHOLD, LONG_RUN_MIN_KM, MIN_TARGET_KM, SHORT_RUN_MAX_KM,
};

/// Split speeds are floored at this many seconds per km
const MIN_SPLIT_SECONDS_PER_KM: f64 = 1.0;

/// Aerobic decoupling of a run
///
/// Uses the precomputed ratio when present; otherwise derives it from half
/// splits as the relative drop in speed per heartbeat between the halves.
#[must_use]
pub fn heart_rate_decoupling(run: &RunRecord) -> Option<f64> {
    if let Some(ratio) = run.heart_rate_decoupling() {
        return Some(ratio);
    }
    let (first_pace, second_pace) = (run.first_half_pace()?, run.second_half_pace()?);
    let (first_hr, second_hr) = (run.first_half_heart_rate()?, run.second_half_heart_rate()?);
    if first_hr <= 0.0 || second_hr <= 0.0 {
        return None;
    }
    let first_speed = 1_000.0 / (first_pace * 60.0).max(MIN_SPLIT_SECONDS_PER_KM);
    let second_speed = 1_000.0 / (second_pace * 60.0).max(MIN_SPLIT_SECONDS_PER_KM);
    let first_efficiency = first_speed / first_hr;
    let second_efficiency = second_speed / second_hr;
    (first_efficiency > 0.0).then(|| (first_efficiency - second_efficiency) / first_efficiency)
}

/// Penalty multiplier in (0, 1] for projecting `run` onto a long target
///
/// Targets up to 21 km are unaffected. Beyond that, decoupling above 5 % or,
/// failing that, a second-half fade above 4 % reduce the multiplier
/// exponentially.
#[must_use]
pub fn endurance_modifier(run: &RunRecord, target_km: f64) -> f64 {
    if target_km <= MIN_TARGET_KM {
        return 1.0;
    }

    if let Some(decoupling) = heart_rate_decoupling(run).filter(|d| *d > DECOUPLING_THRESHOLD) {
        return (-(decoupling - DECOUPLING_THRESHOLD) * DECOUPLING_RATE)
            .exp()
            .clamp(DECOUPLING_FLOOR, 1.0);
    }

    if let (Some(first), Some(second)) = (run.first_half_pace(), run.second_half_pace()) {
        if first > 0.0 {
            let fade = (second - first) / first;
            if fade > FADE_THRESHOLD {
                return (-(fade - FADE_THRESHOLD) * FADE_RATE).exp().clamp(FADE_FLOOR, 1.0);
            }
        }
    }

    1.0
}

/// CV and D′ after attenuating for a speed-biased profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileAdjustment {
    /// Attenuated critical velocity (km/s)
    pub cv: f64,
    /// Attenuated reserve distance (km)
    pub d_prime: f64,
    /// Best short-run speed (km/s), when short runs exist
    pub speed_index: Option<f64>,
    /// Best long-run speed (km/s), when long runs exist
    pub endurance_index: Option<f64>,
}

/// Attenuate CV and D′ when short-distance speed outstrips long-run endurance
///
/// Requires both short (≤ 5 km) and long (≥ 10 km) runs. The attenuation is
/// `1 / (1 + profile_gap × endurance_gap)` where the profile gap is how much
/// faster the best short run is than the best long run, and the endurance gap
/// is how much slower long runs actually were than the CV projection.
#[must_use]
pub fn attenuate_for_profile(cv: f64, d_prime: f64, history: &[RunRecord]) -> ProfileAdjustment {
    let unchanged = |speed_index, endurance_index| ProfileAdjustment {
        cv,
        d_prime,
        speed_index,
        endurance_index,
    };

    let best_speed = |filter: &dyn Fn(&RunRecord) -> bool| {
        history
            .iter()
            .filter(|run| run.duration_seconds() > 0.0 && filter(run))
            .map(RunRecord::implied_velocity)
            .reduce(f64::max)
    };
    let (Some(speed_index), Some(endurance_index)) = (
        best_speed(&|run| run.distance_km() <= SHORT_RUN_MAX_KM),
        best_speed(&|run| run.distance_km() >= LONG_RUN_MIN_KM),
    ) else {
        return unchanged(None, None);
    };
    if endurance_index <= 0.0 {
        return unchanged(Some(speed_index), Some(endurance_index));
    }

    let profile_gap = (speed_index / endurance_index - 1.0).max(0.0);
    let ratios: Vec<f64> = history
        .iter()
        .filter(|run| run.distance_km() >= LONG_RUN_MIN_KM && run.duration_seconds() > 0.0)
        .filter_map(|run| {
            project_time_with_cv(run.distance_km(), cv, d_prime)
                .filter(|projected| *projected > 0.0)
                .map(|projected| run.duration_seconds() / projected)
        })
        .collect();
    if ratios.is_empty() {
        return unchanged(Some(speed_index), Some(endurance_index));
    }

    let endurance_gap = (ratios.iter().sum::<f64>() / ratios.len() as f64 - 1.0).max(0.0);
    let attenuation = 1.0 / profile_gap.mul_add(endurance_gap, 1.0);
    tracing::debug!(profile_gap, endurance_gap, attenuation, "profile attenuation");

    ProfileAdjustment {
        cv: cv * attenuation,
        d_prime: (d_prime * attenuation).max(0.0),
        speed_index: Some(speed_index),
        endurance_index: Some(endurance_index),
    }
}
