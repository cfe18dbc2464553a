// ABOUTME: Acute and chronic training load (ATL/CTL), their balance (TSB) and a readiness multiplier
// ABOUTME: Daily loads from heart-rate or grade intensity, decayed with 7- and 42-day exponential averages
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use vantage_core::models::RunRecord;

use crate::digest::HistoryDigest;
use crate::physiological_constants::training_load::{
    ATL_TIME_CONSTANT_DAYS, CTL_TIME_CONSTANT_DAYS, FRESH_BONUS_PER_POINT, FRESH_CEILING,
    FRESH_TSB, GRADE_INTENSITY_MAX, GRADE_INTENSITY_MIN, GRADE_INTENSITY_SCALE,
    GRADE_MIN_DISTANCE_KM, HR_INTENSITY_MAX, HR_INTENSITY_MIN, OVERREACH_FLOOR,
    OVERREACH_PENALTY_PER_POINT, OVERREACH_TSB, READINESS_MAX, READINESS_MIN,
};

/// Fitness/fatigue balance derived from the full history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadinessState {
    /// Acute training load (fatigue)
    pub atl: f64,
    /// Chronic training load (fitness)
    pub ctl: f64,
    /// Training stress balance, `ctl - atl`
    pub tsb: f64,
    /// Multiplier applied to CV, within [0.97, 1.03]
    pub readiness_modifier: f64,
}

impl Default for ReadinessState {
    fn default() -> Self {
        Self {
            atl: 0.0,
            ctl: 0.0,
            tsb: 0.0,
            readiness_modifier: 1.0,
        }
    }
}

/// Calculator for ATL/CTL/TSB readiness
pub struct ReadinessCalculator;

impl ReadinessCalculator {
    /// Training load of a single run
    ///
    /// With average and maximum heart rate: `minutes × (avg/max)²`, the ratio
    /// clipped to [0.45, 1.2]. Otherwise `minutes × intensity` where intensity
    /// grows with metres climbed per km, clipped to [0.85, 1.3].
    #[must_use]
    pub fn run_load(run: &RunRecord) -> f64 {
        let minutes = run.duration_seconds() / 60.0;
        match (run.average_heart_rate(), run.max_heart_rate()) {
            (Some(average), Some(max)) if average > 0.0 && max > 0.0 => {
                let intensity = (average / max).clamp(HR_INTENSITY_MIN, HR_INTENSITY_MAX);
                minutes * intensity * intensity
            }
            _ => {
                let grade = run.elevation_gain() / run.distance_km().max(GRADE_MIN_DISTANCE_KM);
                let intensity =
                    (1.0 + grade / GRADE_INTENSITY_SCALE).clamp(GRADE_INTENSITY_MIN, GRADE_INTENSITY_MAX);
                minutes * intensity
            }
        }
    }

    /// Compute the readiness state from every dated run in the digest
    ///
    /// Loads are summed per calendar day (UTC) and walked day by day from the
    /// earliest to the latest dated run; rest days contribute zero load.
    #[must_use]
    pub fn compute(digest: &HistoryDigest<'_>) -> ReadinessState {
        let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for dated in digest.dated() {
            if let Some(date) = dated.run.date() {
                *daily.entry(date.date_naive()).or_insert(0.0) += Self::run_load(dated.run);
            }
        }

        let (Some((&first, _)), Some((&last, _))) = (daily.first_key_value(), daily.last_key_value())
        else {
            return ReadinessState::default();
        };

        let atl_decay = (-1.0 / ATL_TIME_CONSTANT_DAYS).exp();
        let ctl_decay = (-1.0 / CTL_TIME_CONSTANT_DAYS).exp();
        let mut atl = 0.0;
        let mut ctl = 0.0;

        for day in first.iter_days().take_while(|day| *day <= last) {
            let load = daily.get(&day).copied().unwrap_or(0.0);
            atl = atl_decay.mul_add(atl, load * (1.0 - atl_decay));
            ctl = ctl_decay.mul_add(ctl, load * (1.0 - ctl_decay));
        }

        let tsb = ctl - atl;
        let state = ReadinessState {
            atl,
            ctl,
            tsb,
            readiness_modifier: Self::readiness_modifier(tsb),
        };
        tracing::debug!(
            atl = state.atl,
            ctl = state.ctl,
            tsb = state.tsb,
            modifier = state.readiness_modifier,
            days = daily.len(),
            "readiness computed"
        );
        state
    }

    /// Bounded readiness multiplier for a training stress balance
    #[must_use]
    pub fn readiness_modifier(tsb: f64) -> f64 {
        let modifier = if tsb < OVERREACH_TSB {
            (OVERREACH_TSB - tsb).mul_add(-OVERREACH_PENALTY_PER_POINT, 1.0).clamp(OVERREACH_FLOOR, 1.0)
        } else if tsb > FRESH_TSB {
            (1.0 + (tsb - FRESH_TSB) * FRESH_BONUS_PER_POINT).clamp(1.0, FRESH_CEILING)
        } else {
            1.0
        };
        modifier.clamp(READINESS_MIN, READINESS_MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use vantage_core::models::RunRecordBuilder;

    #[test]
    fn test_heart_rate_load() {
        let run = RunRecordBuilder::new(10.0, 3_600.0).heart_rate(150.0, 200.0).build();
        assert!((ReadinessCalculator::run_load(&run) - 60.0 * 0.75 * 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_grade_load_without_heart_rate() {
        let flat = RunRecordBuilder::new(10.0, 3_600.0).build();
        assert!((ReadinessCalculator::run_load(&flat) - 60.0).abs() < 1e-9);
        let hilly = RunRecordBuilder::new(10.0, 3_600.0).elevation_gain(4_000.0).build();
        assert!((ReadinessCalculator::run_load(&hilly) - 60.0 * 1.3).abs() < 1e-9);
    }

    #[test]
    fn test_readiness_modifier_bands() {
        assert!((ReadinessCalculator::readiness_modifier(0.0) - 1.0).abs() < 1e-12);
        assert!((ReadinessCalculator::readiness_modifier(-25.0) - 0.96).abs() < 1e-12);
        assert!((ReadinessCalculator::readiness_modifier(-200.0) - 0.97).abs() < 1e-12);
        assert!((ReadinessCalculator::readiness_modifier(10.0) - 1.01).abs() < 1e-12);
        assert!((ReadinessCalculator::readiness_modifier(100.0) - 1.03).abs() < 1e-12);
    }

    #[test]
    fn test_undated_history_is_neutral() {
        let runs = vec![RunRecordBuilder::new(10.0, 3_000.0).build()];
        let as_of = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let digest = HistoryDigest::new(&runs, as_of);
        assert_eq!(ReadinessCalculator::compute(&digest), ReadinessState::default());
    }

    #[test]
    fn test_same_day_loads_aggregate() {
        let as_of = Utc.with_ymd_and_hms(2025, 6, 1, 18, 0, 0).unwrap();
        let morning = as_of - Duration::hours(10);
        let runs = vec![
            RunRecordBuilder::new(10.0, 3_000.0).date(morning).build(),
            RunRecordBuilder::new(5.0, 1_500.0).date(morning + Duration::hours(2)).build(),
        ];
        let digest = HistoryDigest::new(&runs, as_of);
        let state = ReadinessCalculator::compute(&digest);
        let decay = (-1.0_f64 / 7.0).exp();
        assert!((state.atl - 75.0 * (1.0 - decay)).abs() < 1e-9);
        assert!((state.tsb - (state.ctl - state.atl)).abs() < 1e-12);
    }
}
