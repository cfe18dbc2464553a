// ABOUTME: Prediction request/response models, distance keys and the fixed-key prediction curve
// ABOUTME: Curve serializes as a map keyed by canonical distance names (five_k ... marathon)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::BTreeMap;
use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use super::run::{require_positive, RunRecord};
use crate::constants::distances;
use crate::errors::{AppError, AppResult};

/// Canonical race distance keys, ordered by increasing distance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceKey {
    /// 5 km
    FiveK,
    /// 10 km
    TenK,
    /// 21.0975 km
    HalfMarathon,
    /// 25 km
    TwentyFiveK,
    /// 42.195 km
    Marathon,
}

impl DistanceKey {
    /// All keys in increasing distance order
    pub const ALL: [Self; 5] = [
        Self::FiveK,
        Self::TenK,
        Self::HalfMarathon,
        Self::TwentyFiveK,
        Self::Marathon,
    ];

    /// Distance in kilometres
    #[must_use]
    pub const fn distance_km(self) -> f64 {
        match self {
            Self::FiveK => distances::FIVE_K_KM,
            Self::TenK => distances::TEN_K_KM,
            Self::HalfMarathon => distances::HALF_MARATHON_KM,
            Self::TwentyFiveK => distances::TWENTY_FIVE_K_KM,
            Self::Marathon => distances::MARATHON_KM,
        }
    }

    /// Wire name of the key
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FiveK => "five_k",
            Self::TenK => "ten_k",
            Self::HalfMarathon => "half_marathon",
            Self::TwentyFiveK => "twenty_five_k",
            Self::Marathon => "marathon",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::FiveK => 0,
            Self::TenK => 1,
            Self::HalfMarathon => 2,
            Self::TwentyFiveK => 3,
            Self::Marathon => 4,
        }
    }
}

impl fmt::Display for DistanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Predicted times (seconds) for every canonical distance
///
/// Also used for the per-distance standard deviation band, which shares the keys.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionCurve {
    seconds: [f64; 5],
}

impl PredictionCurve {
    /// Build a curve by evaluating `f` for every key
    pub fn from_fn(mut f: impl FnMut(DistanceKey) -> f64) -> Self {
        Self {
            seconds: DistanceKey::ALL.map(&mut f),
        }
    }

    /// Time in seconds for a key
    #[must_use]
    pub const fn get(&self, key: DistanceKey) -> f64 {
        self.seconds[key.index()]
    }

    /// Replace the time for a key
    pub fn set(&mut self, key: DistanceKey, seconds: f64) {
        self.seconds[key.index()] = seconds;
    }

    /// Pace in seconds per kilometre for a key
    #[must_use]
    pub fn pace(&self, key: DistanceKey) -> f64 {
        self.get(key) / key.distance_km()
    }

    /// Iterate `(key, seconds)` in increasing distance order
    pub fn iter(&self) -> impl Iterator<Item = (DistanceKey, f64)> + '_ {
        DistanceKey::ALL.iter().map(move |key| (*key, self.get(*key)))
    }

    /// Apply `f` to every entry
    #[must_use]
    pub fn map(&self, mut f: impl FnMut(DistanceKey, f64) -> f64) -> Self {
        Self::from_fn(|key| f(key, self.get(key)))
    }
}

impl Serialize for PredictionCurve {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.iter().map(|(key, seconds)| (key.as_str(), seconds)))
    }
}

impl<'de> Deserialize<'de> for PredictionCurve {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<DistanceKey, f64>::deserialize(deserializer)?;
        let mut curve = Self { seconds: [0.0; 5] };
        for key in DistanceKey::ALL {
            let seconds = raw
                .get(&key)
                .copied()
                .ok_or_else(|| de::Error::missing_field(key.as_str()))?;
            curve.set(key, seconds);
        }
        Ok(curve)
    }
}

/// Which state the prediction describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionMode {
    /// Today's fitness and fatigue
    #[default]
    Current,
    /// Simulated post-taper race day
    RaceDay,
}

impl PredictionMode {
    /// Wire name of the mode
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::RaceDay => "race_day",
        }
    }
}

/// Which projection path produced the curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelSource {
    /// Power-law projection from a single effort
    #[serde(rename = "riegel-fallback")]
    RiegelFallback,
    /// Structural CV, current mode
    #[serde(rename = "structural-current")]
    StructuralCurrent,
    /// Structural CV, race-day mode
    #[serde(rename = "structural-race_day")]
    StructuralRaceDay,
}

impl ModelSource {
    /// Structural source label for a prediction mode
    #[must_use]
    pub const fn structural(mode: PredictionMode) -> Self {
        match mode {
            PredictionMode::Current => Self::StructuralCurrent,
            PredictionMode::RaceDay => Self::StructuralRaceDay,
        }
    }

    /// Wire label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RiegelFallback => "riegel-fallback",
            Self::StructuralCurrent => "structural-current",
            Self::StructuralRaceDay => "structural-race_day",
        }
    }
}

/// Prediction request: the effort being submitted plus request-scoped history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRequest {
    /// Distance of the submitted effort (km)
    pub distance_km: f64,
    /// Duration of the submitted effort (s)
    pub duration_seconds: f64,
    /// Pace of the submitted effort (min/km)
    pub avg_pace: f64,
    /// Elevation gain of the submitted effort (m)
    pub elevation_gain: f64,
    /// Prediction mode
    #[serde(default)]
    pub mode: PredictionMode,
    /// Opaque caller identifier, only used for log correlation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// The runner's own history
    #[serde(default)]
    pub user_history: Vec<RunRecord>,
    /// Comparable runners' history, used for uncertainty only
    #[serde(default)]
    pub cohort_history: Vec<RunRecord>,
}

impl PredictionRequest {
    /// Validate the request at the transport boundary
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidInput` for the first violated constraint,
    /// including constraints on individual history records.
    pub fn validate(&self) -> AppResult<()> {
        require_positive("distance_km", self.distance_km)?;
        require_positive("duration_seconds", self.duration_seconds)?;
        require_positive("avg_pace", self.avg_pace)?;
        if !self.elevation_gain.is_finite() || self.elevation_gain < 0.0 {
            return Err(AppError::invalid_input(format!(
                "elevation_gain must be >= 0, got {}",
                self.elevation_gain
            )));
        }
        for (index, run) in self.user_history.iter().enumerate() {
            run.validate().map_err(|e| {
                AppError::invalid_input(format!("user_history[{index}]: {}", e.message))
            })?;
        }
        for (index, run) in self.cohort_history.iter().enumerate() {
            run.validate().map_err(|e| {
                AppError::invalid_input(format!("cohort_history[{index}]: {}", e.message))
            })?;
        }
        Ok(())
    }
}

/// Final prediction payload returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Marathon time (s), equal to `predicted_times.marathon`
    pub predicted_marathon_time: f64,
    /// Predicted times (s), 2-decimal rounding
    pub predicted_times: PredictionCurve,
    /// One standard deviation per distance (s)
    pub prediction_std: PredictionCurve,
    /// Readiness or taper factor applied to CV (3-decimal)
    pub readiness_adjustment_factor: f64,
    /// Confidence in [0.3, 0.95] (3-decimal)
    pub confidence: f64,
    /// Projection path
    pub model_source: ModelSource,
    /// Engine logic version label
    pub model_version: String,
}
