//! Physiological and modelling constants for the race projection engine
//!
//! Grouped by the component that consumes them. The CV band itself lives in
//! `vantage_core::constants::critical_velocity` because the model registry
//! and the transport layer share it.

/// Critical velocity estimation
pub mod critical_velocity {
    /// Distances are bucketed to this many decimals when picking personal bests
    pub const DISTANCE_BUCKET_SCALE: f64 = 100.0;

    /// Half-life of the recency weight in days
    pub const RECENCY_HALF_LIFE_DAYS: f64 = 21.0;

    /// Recency weight bounds
    pub const RECENCY_WEIGHT_MIN: f64 = 0.05;
    /// Upper bound of the recency weight
    pub const RECENCY_WEIGHT_MAX: f64 = 1.0;

    /// Age assumed for undated runs when weighting by recency
    pub const UNDATED_AGE_DAYS: f64 = 90.0;

    /// Structural variant only looks at runs this recent
    pub const STRUCTURAL_WINDOW_DAYS: i64 = 90;

    /// General variant fits at most this many of the most recent runs
    pub const MAX_FIT_RUNS: usize = 120;

    /// Residuals beyond this many standard deviations are rejected before refitting
    pub const OUTLIER_SIGMA: f64 = 2.5;

    /// Minimum points a fit may keep after outlier rejection
    pub const MIN_FIT_POINTS: usize = 3;

    /// Durations closer than this are considered identical in the two-point fit
    pub const TWO_POINT_MIN_DELTA_SECONDS: f64 = 1e-6;

    /// Distance decay scale for the regression weight (km)
    pub const REGRESSION_DISTANCE_SCALE_KM: f64 = 28.0;
    /// Distances up to this carry no distance decay (km)
    pub const REGRESSION_DISTANCE_FREE_KM: f64 = 5.0;
    /// Reference pace for the easy-effort weight (min/km)
    pub const REGRESSION_REFERENCE_PACE: f64 = 5.5;
    /// Paces faster than this are treated as this pace (min/km)
    pub const REGRESSION_PACE_FLOOR: f64 = 3.0;
    /// Pace weight bounds
    pub const REGRESSION_PACE_WEIGHT_MIN: f64 = 0.65;
    /// Upper pace weight bound
    pub const REGRESSION_PACE_WEIGHT_MAX: f64 = 1.2;
    /// Combined regression weight bounds
    pub const REGRESSION_WEIGHT_MIN: f64 = 0.25;
    /// Upper combined regression weight bound
    pub const REGRESSION_WEIGHT_MAX: f64 = 1.5;
}

/// Race-effort detection and the cross-check against fitted CV
pub mod race_effort {
    /// Race efforts older than this do not count as evidence (days)
    pub const RECENCY_DAYS: i64 = 60;
    /// Absolute distance tolerance to a canonical distance (km)
    pub const DISTANCE_TOLERANCE_KM: f64 = 0.6;
    /// Relative distance tolerance to a canonical distance
    pub const DISTANCE_TOLERANCE_RATIO: f64 = 0.05;
    /// Fitted CV may exceed the race-effort CV by at most this factor
    pub const CV_CAP_FACTOR: f64 = 1.02;
    /// A race effort supports a prediction when its CV reaches this fraction of the prediction's
    pub const SUPPORT_RATIO: f64 = 0.99;
}

/// Acute/chronic training load
pub mod training_load {
    /// ATL time constant (days)
    pub const ATL_TIME_CONSTANT_DAYS: f64 = 7.0;
    /// CTL time constant (days)
    pub const CTL_TIME_CONSTANT_DAYS: f64 = 42.0;

    /// Relative heart-rate intensity bounds
    pub const HR_INTENSITY_MIN: f64 = 0.45;
    /// Upper relative heart-rate intensity bound
    pub const HR_INTENSITY_MAX: f64 = 1.2;

    /// Metres of climb per km that add one unit of intensity
    pub const GRADE_INTENSITY_SCALE: f64 = 800.0;
    /// Grade-derived intensity bounds
    pub const GRADE_INTENSITY_MIN: f64 = 0.85;
    /// Upper grade-derived intensity bound
    pub const GRADE_INTENSITY_MAX: f64 = 1.3;
    /// Distance floor when computing grade (km)
    pub const GRADE_MIN_DISTANCE_KM: f64 = 0.1;

    /// TSB below this is penalised
    pub const OVERREACH_TSB: f64 = -15.0;
    /// Penalty per TSB point below the overreach threshold
    pub const OVERREACH_PENALTY_PER_POINT: f64 = 0.004;
    /// Floor of the overreach penalty
    pub const OVERREACH_FLOOR: f64 = 0.95;

    /// TSB above this earns a freshness bonus
    pub const FRESH_TSB: f64 = 5.0;
    /// Bonus per TSB point above the freshness threshold
    pub const FRESH_BONUS_PER_POINT: f64 = 0.002;
    /// Ceiling of the freshness bonus
    pub const FRESH_CEILING: f64 = 1.04;

    /// Final readiness modifier bounds
    pub const READINESS_MIN: f64 = 0.97;
    /// Upper final readiness modifier bound
    pub const READINESS_MAX: f64 = 1.03;
}

/// Race-day taper simulation
pub mod taper {
    /// Default ATL reduction
    pub const DEFAULT_REDUCTION: f64 = 0.4;
    /// ATL reduction when ATL exceeds CTL
    pub const OVERREACHED_REDUCTION: f64 = 0.5;
    /// ATL reduction when ATL is well below CTL
    pub const FRESH_REDUCTION: f64 = 0.3;
    /// "Well below" means under this fraction of CTL
    pub const FRESH_ATL_RATIO: f64 = 0.5;
    /// Loads below this are treated as this value when comparing
    pub const LOAD_FLOOR: f64 = 1.0;

    /// Simulated TSB band
    pub const TSB_MIN: f64 = 5.0;
    /// Upper simulated TSB bound
    pub const TSB_MAX: f64 = 15.0;

    /// Race-day modifier at the bottom of the TSB band
    pub const MODIFIER_BASE: f64 = 1.01;
    /// Modifier gained across the full TSB band
    pub const MODIFIER_SPAN: f64 = 0.03;
    /// Race-day modifier bounds
    pub const MODIFIER_MIN: f64 = 1.01;
    /// Upper race-day modifier bound
    pub const MODIFIER_MAX: f64 = 1.04;

    /// Taper factor applied to CV is clipped to this band
    pub const CV_FACTOR_MIN: f64 = 1.0;
    /// Upper taper factor bound
    pub const CV_FACTOR_MAX: f64 = 1.03;
    /// Race-day CV may not exceed current CV by more than this factor
    pub const MAX_GAIN_OVER_CURRENT: f64 = 1.03;
    /// Race-day times may not undercut this fraction of current-mode times
    pub const MIN_TIME_RATIO_TO_CURRENT: f64 = 0.97;
}

/// Curve projection and guarantees
pub mod curve {
    /// Default Riegel exponent
    pub const RIEGEL_EXPONENT: f64 = 1.06;
    /// Personalised exponents are floored here
    pub const MIN_PERSONAL_EXPONENT: f64 = 1.0;
    /// Base distances below this are treated as this (km)
    pub const MIN_BASE_DISTANCE_KM: f64 = 0.1;
    /// No projected time is shorter than this (s)
    pub const MIN_PROJECTED_SECONDS: f64 = 300.0;
    /// D-prime only shortens targets up to this multiple of itself
    pub const D_PRIME_REACH: f64 = 4.0;

    /// 10K must take at least this multiple of 5K
    pub const TEN_K_OVER_FIVE_K: f64 = 1.95;
    /// Half marathon must take at least this multiple of 10K
    pub const HALF_OVER_TEN_K: f64 = 2.0;
    /// Marathon must take at least this multiple of the half
    pub const MARATHON_OVER_HALF: f64 = 2.02;
    /// Tie-breaking nudge when enforcing pace monotonicity (s)
    pub const MONOTONIC_EPSILON_SECONDS: f64 = 0.01;

    /// Personal bests older than this do not floor predictions (days)
    pub const PB_RECENCY_DAYS: i64 = 365;
    /// Absolute distance tolerance for matching a PB (km)
    pub const PB_TOLERANCE_KM: f64 = 1.0;
    /// Relative distance tolerance for matching a PB
    pub const PB_TOLERANCE_RATIO: f64 = 0.1;
    /// Predictions may not undercut this fraction of a recent PB
    pub const PB_FLOOR_RATIO: f64 = 0.98;
}

/// Confidence and uncertainty
pub mod uncertainty {
    /// Confidence with no evidence at all
    pub const CONFIDENCE_BASE: f64 = 0.3;
    /// Confidence gained per history record
    pub const CONFIDENCE_PER_RUN: f64 = 0.03;
    /// Cap on the history-size term
    pub const CONFIDENCE_RUNS_CAP: f64 = 0.45;
    /// Confidence gained per distinct distance
    pub const CONFIDENCE_PER_DISTANCE: f64 = 0.05;
    /// Cap on the distinct-distance term
    pub const CONFIDENCE_DISTANCE_CAP: f64 = 0.2;
    /// Weight of r² in confidence (and its cap)
    pub const CONFIDENCE_R2_WEIGHT: f64 = 0.2;
    /// Penalty for an unstable CV profile
    pub const UNSTABLE_PENALTY: f64 = 0.08;
    /// Confidence bounds
    pub const CONFIDENCE_MIN: f64 = 0.3;
    /// Upper confidence bound
    pub const CONFIDENCE_MAX: f64 = 0.95;

    /// Blend weight of regression uncertainty
    pub const WEIGHT_REGRESSION: f64 = 0.22;
    /// Blend weight of the user's pace variability
    pub const WEIGHT_PACE_VARIABILITY: f64 = 0.36;
    /// Blend weight of cohort dispersion
    pub const WEIGHT_COHORT: f64 = 0.22;
    /// Blend weight of the sparsity penalty
    pub const WEIGHT_SPARSITY: f64 = 0.20;

    /// Regression uncertainty when r² is unavailable
    pub const DEFAULT_REGRESSION_UNCERTAINTY: f64 = 0.2;
    /// Regression uncertainty bounds
    pub const REGRESSION_UNCERTAINTY_MIN: f64 = 0.05;
    /// Upper regression uncertainty bound
    pub const REGRESSION_UNCERTAINTY_MAX: f64 = 0.5;
    /// Pace variability with fewer than two samples
    pub const DEFAULT_PACE_VARIABILITY: f64 = 0.18;
    /// Cohort dispersion with fewer than two samples
    pub const DEFAULT_COHORT_DISPERSION: f64 = 0.12;

    /// Relative standard deviation bounds
    pub const RELATIVE_STD_MIN: f64 = 0.03;
    /// Upper relative standard deviation bound
    pub const RELATIVE_STD_MAX: f64 = 0.30;
}

/// Endurance profile diagnostics
pub mod endurance {
    /// Targets at or below this are unaffected by decoupling (km)
    pub const MIN_TARGET_KM: f64 = 21.0;
    /// Decoupling above this is penalised
    pub const DECOUPLING_THRESHOLD: f64 = 0.05;
    /// Exponential rate of the decoupling penalty
    pub const DECOUPLING_RATE: f64 = 6.0;
    /// Floor of the decoupling penalty
    pub const DECOUPLING_FLOOR: f64 = 0.78;
    /// Pace fade above this is penalised
    pub const FADE_THRESHOLD: f64 = 0.04;
    /// Exponential rate of the fade penalty
    pub const FADE_RATE: f64 = 8.0;
    /// Floor of the fade penalty
    pub const FADE_FLOOR: f64 = 0.8;
    /// Runs up to this count as short efforts (km)
    pub const SHORT_RUN_MAX_KM: f64 = 5.0;
    /// Runs from this count as long efforts (km)
    pub const LONG_RUN_MIN_KM: f64 = 10.0;
}

/// Cohort similarity
pub mod cohort {
    /// Number of nearest cohort runs blended
    pub const NEIGHBOURS: usize = 14;
    /// Feature scales: distance (km), duration (s), pace (min/km), elevation (m)
    pub const FEATURE_SCALES: [f64; 4] = [12.0, 4800.0, 1.6, 260.0];
}
