// ABOUTME: Single pre-processing pass over a runner's history shared by every engine component
// ABOUTME: Holds valid runs, per-distance personal bests, dated runs with ages and race-effort evidence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use vantage_core::constants::{critical_velocity, distances};
use vantage_core::models::RunRecord;

use crate::physiological_constants::critical_velocity::DISTANCE_BUCKET_SCALE;
use crate::physiological_constants::race_effort;

/// A dated run together with its age relative to the digest's reference instant
#[derive(Debug, Clone, Copy)]
pub struct DatedRun<'a> {
    /// The run itself
    pub run: &'a RunRecord,
    /// Whole days between the run and `as_of` (negative for future-dated runs)
    pub age_days: i64,
}

/// Everything the engine derives from the raw history, computed once per request
#[derive(Debug, Clone)]
pub struct HistoryDigest<'a> {
    as_of: DateTime<Utc>,
    records: &'a [RunRecord],
    valid: Vec<&'a RunRecord>,
    personal_bests: Vec<&'a RunRecord>,
    dated: Vec<DatedRun<'a>>,
    latest: Option<&'a RunRecord>,
    best_race_effort_cv: Option<f64>,
}

impl<'a> HistoryDigest<'a> {
    /// Digest a history against a reference instant
    #[must_use]
    pub fn new(records: &'a [RunRecord], as_of: DateTime<Utc>) -> Self {
        let valid: Vec<&RunRecord> = records.iter().filter(|run| run.is_valid_effort()).collect();
        let personal_bests = personal_bests(valid.iter().copied());

        let dated: Vec<DatedRun<'a>> = valid
            .iter()
            .copied()
            .filter_map(|run| {
                run.date().map(|date| DatedRun {
                    run,
                    age_days: (as_of - date).num_days(),
                })
            })
            .collect();

        let latest = latest_run(&valid);

        let best_race_effort_cv = dated
            .iter()
            .filter(|dated| {
                dated.age_days <= race_effort::RECENCY_DAYS && is_race_effort(dated.run.distance_km())
            })
            .map(|dated| dated.run.implied_velocity())
            .reduce(f64::max)
            .map(critical_velocity::clip);

        tracing::debug!(
            records = records.len(),
            valid = valid.len(),
            distinct_distances = personal_bests.len(),
            dated = dated.len(),
            race_effort_cv = ?best_race_effort_cv,
            "history digested"
        );

        Self {
            as_of,
            records,
            valid,
            personal_bests,
            dated,
            latest,
            best_race_effort_cv,
        }
    }

    /// Reference instant every recency rule is evaluated against
    #[must_use]
    pub const fn as_of(&self) -> DateTime<Utc> {
        self.as_of
    }

    /// Every record as supplied, including invalid ones
    #[must_use]
    pub const fn records(&self) -> &'a [RunRecord] {
        self.records
    }

    /// Number of records as supplied
    #[must_use]
    pub const fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Records with positive distance and duration, in input order
    #[must_use]
    pub fn valid(&self) -> &[&'a RunRecord] {
        &self.valid
    }

    /// Fastest valid run per distance bucket, sorted by distance
    #[must_use]
    pub fn personal_bests(&self) -> &[&'a RunRecord] {
        &self.personal_bests
    }

    /// Valid runs that carry a date, in input order
    #[must_use]
    pub fn dated(&self) -> &[DatedRun<'a>] {
        &self.dated
    }

    /// Dated valid runs no older than `days`
    pub fn dated_within(&self, days: i64) -> impl Iterator<Item = DatedRun<'a>> + '_ {
        self.dated.iter().copied().filter(move |dated| dated.age_days <= days)
    }

    /// Most recent valid run; undated runs rank oldest and the first one seen wins ties
    #[must_use]
    pub const fn latest(&self) -> Option<&'a RunRecord> {
        self.latest
    }

    /// Best implied CV among race efforts in the race-effort window, clipped to the CV band
    #[must_use]
    pub const fn best_race_effort_cv(&self) -> Option<f64> {
        self.best_race_effort_cv
    }
}

/// Whether a distance is close enough to a canonical race distance to count as a race effort
#[must_use]
pub fn is_race_effort(distance_km: f64) -> bool {
    distances::CANONICAL_KM.iter().any(|canonical| {
        (distance_km - canonical).abs()
            <= race_effort::DISTANCE_TOLERANCE_KM.max(canonical * race_effort::DISTANCE_TOLERANCE_RATIO)
    })
}

/// Keep the fastest run per distance rounded to two decimals, sorted by distance
///
/// On equal durations the first run seen is kept.
pub fn personal_bests<'a>(runs: impl IntoIterator<Item = &'a RunRecord>) -> Vec<&'a RunRecord> {
    let mut by_bucket: BTreeMap<i64, &RunRecord> = BTreeMap::new();
    for run in runs {
        #[allow(clippy::cast_possible_truncation)]
        let bucket = (run.distance_km() * DISTANCE_BUCKET_SCALE).round() as i64;
        by_bucket
            .entry(bucket)
            .and_modify(|best| {
                if run.duration_seconds() < best.duration_seconds() {
                    *best = run;
                }
            })
            .or_insert(run);
    }
    by_bucket.into_values().collect()
}

fn latest_run<'a>(valid: &[&'a RunRecord]) -> Option<&'a RunRecord> {
    let mut latest: Option<&RunRecord> = None;
    for &run in valid {
        let newer = match latest {
            None => true,
            Some(current) => match (run.date(), current.date()) {
                (Some(candidate), Some(existing)) => candidate > existing,
                (Some(_), None) => true,
                (None, _) => false,
            },
        };
        if newer {
            latest = Some(run);
        }
    }
    latest
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use vantage_core::models::RunRecordBuilder;

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_personal_bests_keep_fastest_per_bucket() {
        let runs = vec![
            RunRecordBuilder::new(10.0, 2_700.0).build(),
            RunRecordBuilder::new(10.001, 2_500.0).build(),
            RunRecordBuilder::new(5.0, 1_250.0).build(),
        ];
        let digest = HistoryDigest::new(&runs, as_of());
        let bests = digest.personal_bests();
        assert_eq!(bests.len(), 2);
        assert!((bests[0].distance_km() - 5.0).abs() < 1e-9);
        assert!((bests[1].duration_seconds() - 2_500.0).abs() < 1e-9);
    }

    #[test]
    fn test_latest_prefers_dated_runs() {
        let runs = vec![
            RunRecordBuilder::new(8.0, 2_400.0).build(),
            RunRecordBuilder::new(12.0, 3_600.0)
                .date(as_of() - Duration::days(10))
                .build(),
            RunRecordBuilder::new(6.0, 1_800.0)
                .date(as_of() - Duration::days(3))
                .build(),
        ];
        let digest = HistoryDigest::new(&runs, as_of());
        assert!((digest.latest().unwrap().distance_km() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_latest_falls_back_to_first_undated() {
        let runs = vec![
            RunRecordBuilder::new(8.0, 2_400.0).build(),
            RunRecordBuilder::new(12.0, 3_600.0).build(),
        ];
        let digest = HistoryDigest::new(&runs, as_of());
        assert!((digest.latest().unwrap().distance_km() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_race_effort_window_and_tolerance() {
        assert!(is_race_effort(10.4));
        assert!(is_race_effort(42.0));
        assert!(!is_race_effort(7.5));

        let runs = vec![
            RunRecordBuilder::new(10.0, 2_400.0)
                .date(as_of() - Duration::days(75))
                .build(),
            RunRecordBuilder::new(5.0, 1_300.0)
                .date(as_of() - Duration::days(20))
                .build(),
        ];
        let digest = HistoryDigest::new(&runs, as_of());
        let cv = digest.best_race_effort_cv().unwrap();
        assert!((cv - 5.0 / 1_300.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_records_are_excluded() {
        let runs = vec![
            RunRecordBuilder::new(0.0, 1_000.0).build(),
            RunRecordBuilder::new(5.0, 1_500.0).build(),
        ];
        let digest = HistoryDigest::new(&runs, as_of());
        assert_eq!(digest.record_count(), 2);
        assert_eq!(digest.valid().len(), 1);
    }
}
