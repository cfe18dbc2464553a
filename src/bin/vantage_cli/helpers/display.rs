// ABOUTME: Output formatting helpers for vantage-cli
// ABOUTME: Renders predictions and accuracy reports as plain-text tables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use vantage_core::models::{DistanceKey, PredictionResult};
use vantage_intelligence::accuracy::AccuracyReport;

/// Format seconds as `h:mm:ss`
fn clock(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    format!("{}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

/// Format a pace in seconds per km as `m:ss/km`
fn pace(seconds_per_km: f64) -> String {
    let total = seconds_per_km.max(0.0).round() as u64;
    format!("{}:{:02}/km", total / 60, total % 60)
}

/// Print a prediction as a table
pub fn print_prediction(result: &PredictionResult) {
    println!("{:<15} {:>10} {:>10} {:>10}", "Distance", "Time", "Pace", "±1σ");
    println!("{}", "=".repeat(48));
    for key in DistanceKey::ALL {
        let seconds = result.predicted_times.get(key);
        println!(
            "{:<15} {:>10} {:>10} {:>10}",
            key.to_string(),
            clock(seconds),
            pace(seconds / key.distance_km()),
            clock(result.prediction_std.get(key)),
        );
    }
    println!("{}", "=".repeat(48));
    println!("Source:     {}", result.model_source.as_str());
    println!("Readiness:  {:.3}", result.readiness_adjustment_factor);
    println!("Confidence: {:.3}", result.confidence);
    println!("Version:    {}", result.model_version);
}

/// Print an accuracy report as a table
pub fn print_accuracy(report: &AccuracyReport) {
    println!("{:<15} {:>8} {:>10} {:>8}", "Distance", "Samples", "MAE (s)", "MAPE %");
    println!("{}", "=".repeat(44));
    for (key, accuracy) in report {
        println!(
            "{:<15} {:>8} {:>10.1} {:>8.2}",
            key.to_string(),
            accuracy.samples,
            accuracy.mae,
            accuracy.mape,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_and_pace_formatting() {
        assert_eq!(clock(10_987.4), "3:03:07");
        assert_eq!(clock(299.6), "0:05:00");
        assert_eq!(pace(245.0), "4:05/km");
    }
}
