// ABOUTME: Race-day taper simulation projecting a reduced-fatigue state from current ATL/CTL
// ABOUTME: Produces the race-day modifier applied to critical velocity in race-day mode
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

use crate::physiological_constants::taper::{
    DEFAULT_REDUCTION, FRESH_ATL_RATIO, FRESH_REDUCTION, LOAD_FLOOR, MODIFIER_BASE, MODIFIER_MAX,
    MODIFIER_MIN, MODIFIER_SPAN, OVERREACHED_REDUCTION, TSB_MAX, TSB_MIN,
};
use crate::training_load::ReadinessState;

/// Simulated post-taper state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaperState {
    /// ATL after the taper
    pub atl: f64,
    /// CTL, unchanged by the taper
    pub ctl: f64,
    /// Simulated TSB, within [5, 15]
    pub tsb: f64,
    /// Race-day multiplier, within [1.01, 1.04]
    pub race_day_modifier: f64,
}

/// Race-day taper simulator
pub struct TaperSimulator;

impl TaperSimulator {
    /// Fraction of ATL shed by the taper given current strain
    #[must_use]
    pub fn reduction(readiness: &ReadinessState) -> f64 {
        if readiness.atl > readiness.ctl.max(LOAD_FLOOR) {
            OVERREACHED_REDUCTION
        } else if readiness.atl < (FRESH_ATL_RATIO * readiness.ctl).max(LOAD_FLOOR) {
            FRESH_REDUCTION
        } else {
            DEFAULT_REDUCTION
        }
    }

    /// Simulate the tapered state
    #[must_use]
    pub fn simulate(readiness: &ReadinessState) -> TaperState {
        let reduction = Self::reduction(readiness);
        let atl = (readiness.atl * (1.0 - reduction)).max(0.0);
        let tsb = (readiness.ctl - atl).clamp(TSB_MIN, TSB_MAX);
        let race_day_modifier = ((tsb - TSB_MIN) / (TSB_MAX - TSB_MIN))
            .mul_add(MODIFIER_SPAN, MODIFIER_BASE)
            .clamp(MODIFIER_MIN, MODIFIER_MAX);

        tracing::debug!(reduction, atl, tsb, race_day_modifier, "taper simulated");
        TaperState {
            atl,
            ctl: readiness.ctl,
            tsb,
            race_day_modifier,
        }
    }
}
