// ABOUTME: Application-wide constants for race distances, CV bounds and version labels
// ABOUTME: Shared by the projection engine, the model registry and the HTTP layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Canonical race distances in kilometres
pub mod distances {
    /// 5K
    pub const FIVE_K_KM: f64 = 5.0;
    /// 10K
    pub const TEN_K_KM: f64 = 10.0;
    /// Half marathon
    pub const HALF_MARATHON_KM: f64 = 21.0975;
    /// 25K
    pub const TWENTY_FIVE_K_KM: f64 = 25.0;
    /// Marathon
    pub const MARATHON_KM: f64 = 42.195;

    /// All canonical distances in increasing order
    pub const CANONICAL_KM: [f64; 5] = [
        FIVE_K_KM,
        TEN_K_KM,
        HALF_MARATHON_KM,
        TWENTY_FIVE_K_KM,
        MARATHON_KM,
    ];
}

/// Physiologically plausible critical velocity band (km/s)
pub mod critical_velocity {
    /// Slowest accepted CV, roughly 20:50 min/km
    pub const CV_MIN: f64 = 0.0008;
    /// Fastest accepted CV, roughly 3:02 min/km
    pub const CV_MAX: f64 = 0.0055;

    /// Clip a velocity into the plausible CV band
    #[must_use]
    pub fn clip(cv: f64) -> f64 {
        cv.clamp(CV_MIN, CV_MAX)
    }
}

/// Version labels reported by the service
pub mod versions {
    /// Logic version of the projection engine, reported as `model_version`
    pub const LOGIC_VERSION: &str = "v3-clean-physiology";
}

/// Service identity
pub mod service_names {
    /// Name reported by the health endpoint
    pub const VANTAGE_ML: &str = "vantage-ml";
    /// Service name used in structured logs
    pub const VANTAGE_FORECAST: &str = "vantage-forecast";
}
