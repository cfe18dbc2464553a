// ABOUTME: Nearest-neighbour critical velocity estimate from comparable runners' history
// ABOUTME: Similarity-weighted mean implied CV over the runs closest to the submitted effort
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use vantage_core::models::RunRecord;

use crate::physiological_constants::cohort::{FEATURE_SCALES, NEIGHBOURS};

/// Feature vector of an effort: distance, duration, pace, elevation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffortFeatures(pub [f64; 4]);

impl EffortFeatures {
    /// Features of a run record
    #[must_use]
    pub const fn from_run(run: &RunRecord) -> Self {
        Self([
            run.distance_km(),
            run.duration_seconds(),
            run.avg_pace(),
            run.elevation_gain(),
        ])
    }

    /// `1 / (1 + scaled Euclidean distance)`
    #[must_use]
    pub fn similarity(&self, other: &Self) -> f64 {
        let distance = self
            .0
            .iter()
            .zip(other.0)
            .zip(FEATURE_SCALES)
            .map(|((a, b), scale)| ((a - b) / scale).powi(2))
            .sum::<f64>()
            .sqrt();
        1.0 / (1.0 + distance)
    }
}

/// Similarity-weighted mean implied CV of the 14 cohort runs closest to `effort`
///
/// `None` for an empty cohort.
#[must_use]
pub fn top_similar_cv(effort: &EffortFeatures, cohort: &[RunRecord]) -> Option<f64> {
    let mut candidates: Vec<(f64, f64)> = cohort
        .iter()
        .map(|run| {
            (
                effort.similarity(&EffortFeatures::from_run(run)),
                run.implied_velocity(),
            )
        })
        .collect();
    candidates.sort_by(|a, b| b.0.total_cmp(&a.0));
    candidates.truncate(NEIGHBOURS);

    let total: f64 = candidates.iter().map(|(weight, _)| weight).sum();
    (total > 0.0).then(|| {
        candidates
            .iter()
            .map(|(weight, cv)| weight * cv)
            .sum::<f64>()
            / total
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vantage_core::models::RunRecordBuilder;

    #[test]
    fn test_empty_cohort() {
        let effort = EffortFeatures([10.0, 3_000.0, 5.0, 50.0]);
        assert_eq!(top_similar_cv(&effort, &[]), None);
    }

    #[test]
    fn test_closest_runs_dominate() {
        let effort = EffortFeatures([10.0, 3_000.0, 5.0, 0.0]);
        let mut cohort = vec![RunRecordBuilder::new(10.0, 3_000.0).build()];
        cohort.extend((0..20).map(|_| RunRecordBuilder::new(40.0, 20_000.0).elevation_gain(900.0).build()));
        let cv = top_similar_cv(&effort, &cohort).unwrap();
        assert!(cv > 40.0 / 20_000.0);
        assert!(cv < 10.0 / 3_000.0);
    }
}
