// ABOUTME: Run record model with builder and one-time timestamp normalisation to UTC
// ABOUTME: The only place where naive timestamps are coerced; everything downstream sees UTC
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::errors::{AppError, AppResult};

/// A single training run as supplied by the caller
///
/// Run records are immutable value types. Use [`RunRecordBuilder`] to construct
/// them in code; deserialization accepts the wire schema directly.
///
/// # Examples
///
/// ```rust
/// use vantage_core::models::RunRecordBuilder;
/// use chrono::Utc;
///
/// let run = RunRecordBuilder::new(10.0, 2_400.0)
///     .date(Utc::now())
///     .elevation_gain(45.0)
///     .heart_rate(152.0, 186.0)
///     .build();
///
/// assert!((run.avg_pace() - 4.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Distance in kilometres
    distance_km: f64,
    /// Elapsed time in seconds
    duration_seconds: f64,
    /// Average pace in minutes per kilometre
    avg_pace: f64,
    /// Elevation gain in metres
    elevation_gain: f64,
    /// Start time, normalised to UTC on entry
    #[serde(
        default,
        deserialize_with = "deserialize_optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    average_heart_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_heart_rate: Option<f64>,
    /// First-half pace in minutes per kilometre
    #[serde(default, skip_serializing_if = "Option::is_none")]
    first_half_pace: Option<f64>,
    /// Second-half pace in minutes per kilometre
    #[serde(default, skip_serializing_if = "Option::is_none")]
    second_half_pace: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    first_half_heart_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    second_half_heart_rate: Option<f64>,
    /// Precomputed aerobic decoupling ratio (0.05 = 5 %)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    heart_rate_decoupling: Option<f64>,
}

impl RunRecord {
    /// Distance in kilometres
    #[must_use]
    pub const fn distance_km(&self) -> f64 {
        self.distance_km
    }

    /// Elapsed time in seconds
    #[must_use]
    pub const fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    /// Average pace in minutes per kilometre
    #[must_use]
    pub const fn avg_pace(&self) -> f64 {
        self.avg_pace
    }

    /// Elevation gain in metres
    #[must_use]
    pub const fn elevation_gain(&self) -> f64 {
        self.elevation_gain
    }

    /// Start time in UTC, if known
    #[must_use]
    pub const fn date(&self) -> Option<DateTime<Utc>> {
        self.date
    }

    /// Average heart rate in BPM
    #[must_use]
    pub const fn average_heart_rate(&self) -> Option<f64> {
        self.average_heart_rate
    }

    /// Maximum heart rate in BPM
    #[must_use]
    pub const fn max_heart_rate(&self) -> Option<f64> {
        self.max_heart_rate
    }

    /// First-half pace in minutes per kilometre
    #[must_use]
    pub const fn first_half_pace(&self) -> Option<f64> {
        self.first_half_pace
    }

    /// Second-half pace in minutes per kilometre
    #[must_use]
    pub const fn second_half_pace(&self) -> Option<f64> {
        self.second_half_pace
    }

    /// First-half average heart rate in BPM
    #[must_use]
    pub const fn first_half_heart_rate(&self) -> Option<f64> {
        self.first_half_heart_rate
    }

    /// Second-half average heart rate in BPM
    #[must_use]
    pub const fn second_half_heart_rate(&self) -> Option<f64> {
        self.second_half_heart_rate
    }

    /// Precomputed heart-rate decoupling ratio
    #[must_use]
    pub const fn heart_rate_decoupling(&self) -> Option<f64> {
        self.heart_rate_decoupling
    }

    /// Whether the record carries a usable distance and duration
    #[must_use]
    pub fn is_valid_effort(&self) -> bool {
        self.distance_km > 0.0 && self.duration_seconds > 0.0
    }

    /// Average speed in km/s (the unit critical velocity is expressed in)
    #[must_use]
    pub fn implied_velocity(&self) -> f64 {
        self.distance_km / self.duration_seconds.max(1e-6)
    }

    /// Validate the record against the wire schema constraints
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidInput` when distance, duration or pace is not
    /// strictly positive, elevation gain is negative, or any value is not finite.
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
        Ok(())
    }
}

/// Reject non-finite or non-positive values for a named field
///
/// # Errors
///
/// Returns `AppError::InvalidInput` naming the offending field.
pub fn require_positive(field: &str, value: f64) -> AppResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(AppError::invalid_input(format!(
            "{field} must be > 0, got {value}"
        )))
    }
}

/// Builder for [`RunRecord`]
#[derive(Debug, Clone)]
pub struct RunRecordBuilder {
    record: RunRecord,
    pace_set: bool,
}

impl RunRecordBuilder {
    /// Start a record from distance (km) and duration (s)
    #[must_use]
    pub fn new(distance_km: f64, duration_seconds: f64) -> Self {
        Self {
            record: RunRecord {
                distance_km,
                duration_seconds,
                avg_pace: 0.0,
                elevation_gain: 0.0,
                date: None,
                average_heart_rate: None,
                max_heart_rate: None,
                first_half_pace: None,
                second_half_pace: None,
                first_half_heart_rate: None,
                second_half_heart_rate: None,
                heart_rate_decoupling: None,
            },
            pace_set: false,
        }
    }

    /// Override the average pace (min/km); derived from distance and duration otherwise
    #[must_use]
    pub fn avg_pace(mut self, pace: f64) -> Self {
        self.record.avg_pace = pace;
        self.pace_set = true;
        self
    }

    /// Set elevation gain in metres
    #[must_use]
    pub fn elevation_gain(mut self, metres: f64) -> Self {
        self.record.elevation_gain = metres;
        self
    }

    /// Set the start time
    #[must_use]
    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.record.date = Some(date);
        self
    }

    /// Set average and maximum heart rate
    #[must_use]
    pub fn heart_rate(mut self, average: f64, max: f64) -> Self {
        self.record.average_heart_rate = Some(average);
        self.record.max_heart_rate = Some(max);
        self
    }

    /// Set first/second half paces (min/km)
    #[must_use]
    pub fn half_paces(mut self, first: f64, second: f64) -> Self {
        self.record.first_half_pace = Some(first);
        self.record.second_half_pace = Some(second);
        self
    }

    /// Set first/second half heart rates (BPM)
    #[must_use]
    pub fn half_heart_rates(mut self, first: f64, second: f64) -> Self {
        self.record.first_half_heart_rate = Some(first);
        self.record.second_half_heart_rate = Some(second);
        self
    }

    /// Set a precomputed decoupling ratio
    #[must_use]
    pub fn heart_rate_decoupling(mut self, ratio: f64) -> Self {
        self.record.heart_rate_decoupling = Some(ratio);
        self
    }

    /// Finish the record
    #[must_use]
    pub fn build(mut self) -> RunRecord {
        if !self.pace_set && self.record.distance_km > 0.0 {
            self.record.avg_pace = self.record.duration_seconds / 60.0 / self.record.distance_km;
        }
        self.record
    }
}

/// Timestamps arrive either as text or as Unix seconds
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Text(String),
    Unix(i64),
}

fn deserialize_optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<RawTimestamp> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(RawTimestamp::Text(text)) => normalize_timestamp(&text)
            .map(Some)
            .map_err(de::Error::custom),
        Some(RawTimestamp::Unix(seconds)) => Utc
            .timestamp_opt(seconds, 0)
            .single()
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("timestamp {seconds} out of range"))),
    }
}

/// Parse a timestamp, interpreting values without an offset as UTC
///
/// Accepts RFC 3339 (`2025-03-01T07:30:00+01:00`), naive date-times
/// (`2025-03-01T07:30:00`, `2025-03-01 07:30:00.250`) and bare dates
/// (`2025-03-01`, taken as midnight UTC).
///
/// # Errors
///
/// Returns a description of the input when no supported format matches.
pub fn normalize_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = raw.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(with_offset.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| format!("unrecognised timestamp '{trimmed}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_naive_timestamp_is_utc() {
        let parsed = normalize_timestamp("2025-03-01T07:30:00").unwrap();
        assert_eq!(parsed.hour(), 7);
        assert_eq!(parsed.to_rfc3339(), "2025-03-01T07:30:00+00:00");
    }

    #[test]
    fn test_offset_timestamp_converted() {
        let parsed = normalize_timestamp("2025-03-01T07:30:00+02:00").unwrap();
        assert_eq!(parsed.hour(), 5);
    }

    #[test]
    fn test_bare_date_is_midnight() {
        let parsed = normalize_timestamp("2025-03-01").unwrap();
        assert_eq!(parsed.hour(), 0);
        assert!(normalize_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_builder_derives_pace() {
        let run = RunRecordBuilder::new(5.0, 1_500.0).build();
        assert!((run.avg_pace() - 5.0).abs() < 1e-9);
        let explicit = RunRecordBuilder::new(5.0, 1_500.0).avg_pace(4.8).build();
        assert!((explicit.avg_pace() - 4.8).abs() < 1e-9);
    }

    #[test]
    fn test_validate_rejects_negative_elevation() {
        let run = RunRecordBuilder::new(5.0, 1_500.0)
            .elevation_gain(-3.0)
            .build();
        assert!(run.validate().is_err());
        assert!(RunRecordBuilder::new(5.0, 1_500.0).build().validate().is_ok());
    }
}
