// ABOUTME: Post-processing that makes a prediction curve physically consistent
// ABOUTME: Monotonic pace, minimum distance ratios, recent personal-best floor and the race-day clamp
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Guarantee Enforcement
//!
//! Every operation here only ever raises times. The ratio and pace rules are
//! applied in a single walk over the distances in increasing order: each key
//! is first lifted to its ratio floor relative to an already-final shorter
//! key, then to the pace of its predecessor. Because later keys only depend
//! on earlier, already-final keys, one walk satisfies every rule and a second
//! walk changes nothing.

use vantage_core::models::{DistanceKey, PredictionCurve};

use crate::curve::round2;
use crate::digest::{is_race_effort, HistoryDigest};
use crate::physiological_constants::curve::{
    HALF_OVER_TEN_K, MARATHON_OVER_HALF, MONOTONIC_EPSILON_SECONDS, PB_FLOOR_RATIO,
    PB_RECENCY_DAYS, PB_TOLERANCE_KM, PB_TOLERANCE_RATIO, TEN_K_OVER_FIVE_K,
};
use crate::physiological_constants::race_effort::{RECENCY_DAYS, SUPPORT_RATIO};
use crate::physiological_constants::taper::MIN_TIME_RATIO_TO_CURRENT;

/// Minimum time ratio of a key to a shorter key
const fn ratio_floor(key: DistanceKey) -> Option<(DistanceKey, f64)> {
    match key {
        DistanceKey::TenK => Some((DistanceKey::FiveK, TEN_K_OVER_FIVE_K)),
        DistanceKey::HalfMarathon => Some((DistanceKey::TenK, HALF_OVER_TEN_K)),
        DistanceKey::Marathon => Some((DistanceKey::HalfMarathon, MARATHON_OVER_HALF)),
        DistanceKey::FiveK | DistanceKey::TwentyFiveK => None,
    }
}

/// Round up to the cent of a second
fn ceil2(value: f64) -> f64 {
    (value * 100.0).ceil() / 100.0
}

/// Lift `curve[key]` so its pace is not faster than `last_pace`, returning the resulting pace
fn lift_to_pace(curve: &mut PredictionCurve, key: DistanceKey, last_pace: f64) -> f64 {
    let distance = key.distance_km();
    if curve.pace(key) < last_pace {
        let min_time = last_pace * distance;
        curve.set(key, ceil2(min_time));
        if curve.pace(key) < last_pace {
            curve.set(key, round2(min_time + MONOTONIC_EPSILON_SECONDS));
        }
    }
    curve.pace(key)
}

/// Make pace non-decreasing with distance
#[must_use]
pub fn enforce_pace_monotonicity(curve: &PredictionCurve) -> PredictionCurve {
    let mut corrected = *curve;
    let mut last_pace: Option<f64> = None;
    for key in DistanceKey::ALL {
        last_pace = Some(match last_pace {
            Some(previous) => lift_to_pace(&mut corrected, key, previous),
            None => corrected.pace(key),
        });
    }
    corrected
}

/// Enforce the ratio floors (10K ≥ 1.95×5K, half ≥ 2.0×10K, marathon ≥
/// 2.02×half) together with pace monotonicity
///
/// Idempotent: applying it to its own output returns the same curve.
#[must_use]
pub fn enforce_guarantees(curve: &PredictionCurve) -> PredictionCurve {
    let mut corrected = *curve;
    let mut last_pace: Option<f64> = None;
    for key in DistanceKey::ALL {
        if let Some((shorter, ratio)) = ratio_floor(key) {
            let floor = corrected.get(shorter) * ratio;
            if corrected.get(key) < floor {
                let lifted = ceil2(floor);
                corrected.set(
                    key,
                    if lifted < floor {
                        round2(floor + MONOTONIC_EPSILON_SECONDS)
                    } else {
                        lifted
                    },
                );
            }
        }
        last_pace = Some(match last_pace {
            Some(previous) => lift_to_pace(&mut corrected, key, previous),
            None => corrected.pace(key),
        });
    }
    corrected
}

/// Whether the curve satisfies monotonic pace and every ratio floor
#[must_use]
pub fn satisfies_guarantees(curve: &PredictionCurve) -> bool {
    let monotonic = DistanceKey::ALL
        .windows(2)
        .all(|pair| curve.pace(pair[0]) <= curve.pace(pair[1]));
    let ratios = DistanceKey::ALL.iter().all(|key| {
        ratio_floor(*key).map_or(true, |(shorter, ratio)| curve.get(*key) >= curve.get(shorter) * ratio)
    });
    monotonic && ratios
}

/// Fastest recent personal best matching a target distance
///
/// Matches dated runs no older than 365 days whose distance is within
/// max(1 km, 10 %) of the target. The relative band widens with distance, so a
/// 23 km run counts towards the half marathon and a 45 km run towards the
/// marathon, while short keys keep the 1 km band.
#[must_use]
pub fn recent_distance_pb(digest: &HistoryDigest<'_>, target_km: f64) -> Option<f64> {
    let tolerance = PB_TOLERANCE_KM.max(target_km * PB_TOLERANCE_RATIO);
    digest
        .dated_within(PB_RECENCY_DAYS)
        .filter(|dated| (dated.run.distance_km() - target_km).abs() <= tolerance)
        .map(|dated| dated.run.duration_seconds())
        .reduce(f64::min)
}

/// Whether a recent race effort supports predicting `predicted_s` over `distance_km`
#[must_use]
pub fn recent_race_support(digest: &HistoryDigest<'_>, distance_km: f64, predicted_s: f64) -> bool {
    let candidate_cv = distance_km / predicted_s.max(1e-6);
    digest
        .dated_within(RECENCY_DAYS)
        .filter(|dated| is_race_effort(dated.run.distance_km()))
        .any(|dated| dated.run.implied_velocity() >= candidate_cv * SUPPORT_RATIO)
}

/// Keep predictions from undercutting 98 % of a recent personal best
///
/// Skipped for a key when `allow_breakthrough` holds or a recent race effort
/// supports the faster time.
#[must_use]
pub fn apply_recent_pb_floor(
    curve: &PredictionCurve,
    digest: &HistoryDigest<'_>,
    allow_breakthrough: bool,
) -> PredictionCurve {
    let mut adjusted = *curve;
    for key in DistanceKey::ALL {
        let Some(pb) = recent_distance_pb(digest, key.distance_km()) else {
            continue;
        };
        let floor = PB_FLOOR_RATIO * pb;
        let predicted = adjusted.get(key);
        if predicted < floor
            && !(allow_breakthrough || recent_race_support(digest, key.distance_km(), predicted))
        {
            tracing::debug!(key = %key, predicted, floor, "prediction floored at recent personal best");
            adjusted.set(key, round2(floor));
        }
    }
    adjusted
}

/// Keep race-day times from undercutting 97 % of the current-mode times
#[must_use]
pub fn race_day_clamp(race_day: &PredictionCurve, current: &PredictionCurve) -> PredictionCurve {
    race_day.map(|key, seconds| round2(seconds.max(current.get(key) * MIN_TIME_RATIO_TO_CURRENT)))
}
