// ABOUTME: Property tests for curve guarantees, CV bounds and confidence bounds over random histories
// ABOUTME: Also checks that CV projected curves fed back as runs recover the same CV
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{as_of, dated_run, request, undated_run};
use proptest::prelude::*;
use vantage_core::constants::critical_velocity::{CV_MAX, CV_MIN};
use vantage_core::models::{DistanceKey, PredictionCurve, PredictionMode, RunRecord};
use vantage_intelligence::curve::generate_curve_from_cv;
use vantage_intelligence::guarantees::{enforce_guarantees, satisfies_guarantees};
use vantage_intelligence::{CriticalVelocityEstimator, CvMethod, HistoryDigest, RacePredictor};

fn arbitrary_curve() -> impl Strategy<Value = PredictionCurve> {
    prop::array::uniform5(300.0f64..20_000.0).prop_map(|values| {
        PredictionCurve::from_fn(|key| {
            let index = DistanceKey::ALL.iter().position(|k| *k == key).unwrap();
            (values[index] * 100.0).round() / 100.0
        })
    })
}

fn arbitrary_history() -> impl Strategy<Value = Vec<RunRecord>> {
    prop::collection::vec(
        (1.0f64..45.0, 3.0f64..10.0, prop::option::of(0i64..400)),
        0..25,
    )
    .prop_map(|runs| {
        runs.into_iter()
            .map(|(distance, pace, age)| {
                let duration = distance * pace * 60.0;
                age.map_or_else(
                    || undated_run(distance, duration),
                    |age| dated_run(distance, duration, age),
                )
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn guarantees_hold_and_are_idempotent(curve in arbitrary_curve()) {
        let once = enforce_guarantees(&curve);
        prop_assert!(satisfies_guarantees(&once));
        prop_assert_eq!(enforce_guarantees(&once), once);
        for key in DistanceKey::ALL {
            prop_assert!(once.get(key) >= curve.get(key));
        }
    }

    #[test]
    fn marathon_chain_holds(curve in arbitrary_curve()) {
        let guaranteed = enforce_guarantees(&curve);
        let five_k = guaranteed.get(DistanceKey::FiveK);
        let ten_k = guaranteed.get(DistanceKey::TenK);
        let half = guaranteed.get(DistanceKey::HalfMarathon);
        let marathon = guaranteed.get(DistanceKey::Marathon);
        prop_assert!(ten_k >= 1.95 * five_k);
        prop_assert!(half >= 2.0 * ten_k);
        prop_assert!(marathon >= 2.02 * half);
    }

    #[test]
    fn critical_velocity_stays_in_band(history in arbitrary_history()) {
        let digest = HistoryDigest::new(&history, as_of());
        for profile in [
            CriticalVelocityEstimator::estimate(&digest),
            CriticalVelocityEstimator::structural(&digest),
        ] {
            if let Some(cv) = profile.cv() {
                prop_assert!((CV_MIN..=CV_MAX).contains(&cv), "cv {} out of band", cv);
                prop_assert!(profile.d_prime() >= 0.0);
            }
        }
    }

    #[test]
    fn predictions_are_consistent_for_any_history(
        history in arbitrary_history(),
        race_day in any::<bool>(),
    ) {
        let mode = if race_day { PredictionMode::RaceDay } else { PredictionMode::Current };
        let result = RacePredictor::predict(&request(10.0, 3_000.0, mode, history), as_of());

        prop_assert!(satisfies_guarantees(&result.predicted_times));
        prop_assert!((0.3..=0.95).contains(&result.confidence));
        prop_assert_eq!(
            result.predicted_marathon_time,
            result.predicted_times.get(DistanceKey::Marathon)
        );
        for (_, seconds) in result.predicted_times.iter() {
            prop_assert!(seconds.is_finite() && seconds >= 300.0);
        }
    }

    #[test]
    fn projected_curve_round_trips_through_the_fit(cv in 0.0015f64..0.0054) {
        let curve = generate_curve_from_cv(cv, 0.0);
        let runs: Vec<RunRecord> = curve
            .iter()
            .map(|(key, seconds)| undated_run(key.distance_km(), seconds))
            .collect();
        let digest = HistoryDigest::new(&runs, as_of());
        let profile = CriticalVelocityEstimator::estimate(&digest);

        prop_assert_eq!(profile.method(), CvMethod::RobustWeighted);
        let recovered = profile.cv().unwrap();
        prop_assert!((recovered - cv).abs() < 1e-6, "{} vs {}", recovered, cv);

        let (two_point_cv, _) = CriticalVelocityEstimator::two_point(
            5.0,
            curve.get(DistanceKey::FiveK),
            10.0,
            curve.get(DistanceKey::TenK),
        )
        .unwrap();
        prop_assert!((two_point_cv - cv).abs() < 1e-6);
    }
}
