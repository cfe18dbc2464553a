// ABOUTME: Feature extraction and synthetic training data for the auxiliary regressor
// ABOUTME: Maps run records to a four-feature row with implied velocity as the target
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use vantage_core::models::RunRecord;

/// Number of features per training row
pub const FEATURE_COUNT: usize = 4;

/// Rows generated for a synthetic bootstrap
pub const SYNTHETIC_ROWS: usize = 300;

/// Feature row: distance (km), duration (s), pace (min/km), elevation gain (m)
pub type FeatureRow = [f64; FEATURE_COUNT];

/// A design matrix and its target vector
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingSet {
    /// Feature rows
    pub rows: Vec<FeatureRow>,
    /// Implied velocity (km/s) per row
    pub targets: Vec<f64>,
}

impl TrainingSet {
    /// Number of samples
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the set holds no samples
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Build a training set from caller supplied runs
    #[must_use]
    pub fn from_runs(runs: &[RunRecord]) -> Self {
        let (rows, targets) = runs
            .iter()
            .map(|run| (feature_row(run), run.implied_velocity()))
            .unzip();
        Self { rows, targets }
    }

    /// Seeded synthetic set used when too few real runs are available
    ///
    /// Distances are drawn from U(3, 25) km, paces from U(4.2, 7.0) min/km,
    /// elevation from U(0, 600) m and duration is the pace-implied time plus
    /// N(0, 120) seconds of noise.
    #[must_use]
    pub fn synthetic(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut rows = Vec::with_capacity(SYNTHETIC_ROWS);
        let mut targets = Vec::with_capacity(SYNTHETIC_ROWS);

        for _ in 0..SYNTHETIC_ROWS {
            let distance: f64 = rng.gen_range(3.0..25.0);
            let pace: f64 = rng.gen_range(4.2..7.0);
            let elevation = rng.gen_range(0.0..600.0);
            let duration = (distance * pace).mul_add(60.0, gaussian(&mut rng) * 120.0);

            rows.push([distance, duration, pace, elevation]);
            targets.push(distance / duration.max(1e-6));
        }

        Self { rows, targets }
    }
}

/// Feature row for a single run
#[must_use]
pub fn feature_row(run: &RunRecord) -> FeatureRow {
    [
        run.distance_km(),
        run.duration_seconds(),
        run.avg_pace(),
        run.elevation_gain(),
    ]
}

/// Standard normal sample via the Box-Muller transform
fn gaussian(rng: &mut impl Rng) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vantage_core::models::RunRecordBuilder;

    #[test]
    fn test_synthetic_set_is_seeded() {
        let a = TrainingSet::synthetic(7);
        let b = TrainingSet::synthetic(7);
        assert_eq!(a, b);
        assert_eq!(a.len(), SYNTHETIC_ROWS);
        assert_ne!(a, TrainingSet::synthetic(8));
    }

    #[test]
    fn test_synthetic_rows_within_ranges() {
        let set = TrainingSet::synthetic(7);
        for (row, target) in set.rows.iter().zip(&set.targets) {
            assert!((3.0..25.0).contains(&row[0]));
            assert!((4.2..7.0).contains(&row[2]));
            assert!((0.0..600.0).contains(&row[3]));
            assert!(*target > 0.0);
        }
    }

    #[test]
    fn test_target_is_implied_velocity() {
        let run = RunRecordBuilder::new(10.0, 2_500.0).elevation_gain(40.0).build();
        let set = TrainingSet::from_runs(&[run]);
        assert_eq!(set.rows[0], [10.0, 2_500.0, 2_500.0 / 600.0, 40.0]);
        assert!((set.targets[0] - 0.004).abs() < 1e-12);
    }
}
