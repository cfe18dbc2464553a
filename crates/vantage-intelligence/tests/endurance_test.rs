// ABOUTME: Integration tests for endurance diagnostics and the cohort similarity estimate
// ABOUTME: Covers decoupling and fade penalties plus speed-biased profile attenuation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::undated_run;
use vantage_core::models::RunRecordBuilder;
use vantage_intelligence::cohort::{top_similar_cv, EffortFeatures};
use vantage_intelligence::endurance::{
    attenuate_for_profile, endurance_modifier, heart_rate_decoupling,
};

#[test]
fn test_short_targets_unpenalised() {
    let run = RunRecordBuilder::new(18.0, 6_000.0).heart_rate_decoupling(0.2).build();
    assert!((endurance_modifier(&run, 10.0) - 1.0).abs() < f64::EPSILON);
    assert!((endurance_modifier(&run, 21.0) - 1.0).abs() < f64::EPSILON);
}

#[test]
fn test_decoupling_penalty() {
    let mild = RunRecordBuilder::new(25.0, 8_000.0).heart_rate_decoupling(0.07).build();
    assert!((endurance_modifier(&mild, 42.195) - (-0.12_f64).exp()).abs() < 1e-12);

    let severe = RunRecordBuilder::new(25.0, 8_000.0).heart_rate_decoupling(0.2).build();
    assert!((endurance_modifier(&severe, 42.195) - 0.78).abs() < 1e-12);
}

#[test]
fn test_decoupling_derived_from_half_splits() {
    let run = RunRecordBuilder::new(20.0, 6_000.0)
        .half_paces(5.0, 5.0)
        .half_heart_rates(150.0, 160.0)
        .build();
    let decoupling = heart_rate_decoupling(&run).unwrap();
    assert!((decoupling - 0.0625).abs() < 1e-12);
    assert!((endurance_modifier(&run, 42.195) - (-0.075_f64).exp()).abs() < 1e-12);
}

#[test]
fn test_pace_fade_penalty() {
    let fading = RunRecordBuilder::new(20.0, 6_300.0).half_paces(5.0, 5.25).build();
    assert!((endurance_modifier(&fading, 25.0) - (-0.08_f64).exp()).abs() < 1e-12);

    let collapse = RunRecordBuilder::new(20.0, 6_300.0).half_paces(5.0, 6.0).build();
    assert!((endurance_modifier(&collapse, 25.0) - 0.8).abs() < 1e-12);

    let even = RunRecordBuilder::new(20.0, 6_000.0).half_paces(5.0, 5.1).build();
    assert!((endurance_modifier(&even, 25.0) - 1.0).abs() < f64::EPSILON);
}

#[test]
fn test_speed_biased_profile_attenuated() {
    let history = vec![undated_run(5.0, 1_200.0), undated_run(20.0, 6_000.0)];
    let adjusted = attenuate_for_profile(0.004, 0.0, &history);

    // profile gap 0.25, endurance gap 0.2
    let attenuation = 1.0 / 1.05;
    assert!((adjusted.cv - 0.004 * attenuation).abs() < 1e-12);
    assert!(adjusted.d_prime.abs() < f64::EPSILON);
    assert!((adjusted.speed_index.unwrap() - 5.0 / 1_200.0).abs() < 1e-12);
    assert!((adjusted.endurance_index.unwrap() - 20.0 / 6_000.0).abs() < 1e-12);
}

#[test]
fn test_profile_without_long_runs_unchanged() {
    let history = vec![undated_run(5.0, 1_200.0), undated_run(8.0, 2_100.0)];
    let adjusted = attenuate_for_profile(0.004, 0.3, &history);
    assert!((adjusted.cv - 0.004).abs() < f64::EPSILON);
    assert!((adjusted.d_prime - 0.3).abs() < f64::EPSILON);
    assert_eq!(adjusted.speed_index, None);
    assert_eq!(adjusted.endurance_index, None);
}

#[test]
fn test_cohort_estimate_weights_by_similarity() {
    let cohort = vec![undated_run(10.0, 2_500.0), undated_run(10.0, 2_500.0)];
    let effort = EffortFeatures([10.0, 2_600.0, 4.3, 0.0]);
    assert!((top_similar_cv(&effort, &cohort).unwrap() - 0.004).abs() < 1e-12);
}
