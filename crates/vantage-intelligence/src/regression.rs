// ABOUTME: Weighted least squares, Huber robust regression via IRLS and weighted goodness of fit
// ABOUTME: Numeric building blocks for critical velocity fitting and the personalised Riegel exponent
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(clippy::cast_precision_loss)] // Safe: sample counts are history-sized

//! Every routine returns `None` on degenerate input (empty data, zero
//! variance, non-finite output) instead of failing, so callers can map the
//! outcome straight onto a fallback.

/// Huber threshold on residuals scaled by the robust scale estimate
const HUBER_EPSILON: f64 = 1.35;

/// Consistency constant turning the median absolute deviation into a normal scale estimate
const MAD_TO_SIGMA: f64 = 0.674_489_75;

/// Consistency constant turning the mean absolute deviation into a normal scale estimate
const MEAN_DEVIATION_TO_SIGMA: f64 = 1.253_314_14;

/// IRLS iteration cap
const MAX_IRLS_ITERATIONS: usize = 50;

/// IRLS stops once both coefficients move less than this (relative)
const IRLS_TOLERANCE: f64 = 1e-10;

/// Straight line `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    /// Slope of the fitted line
    pub slope: f64,
    /// Intercept of the fitted line
    pub intercept: f64,
}

impl LinearFit {
    /// Evaluate the line at `x`
    #[must_use]
    pub fn predict(&self, x: f64) -> f64 {
        self.slope.mul_add(x, self.intercept)
    }

    /// Residuals `y - predict(x)` for paired samples
    #[must_use]
    pub fn residuals(&self, x: &[f64], y: &[f64]) -> Vec<f64> {
        x.iter().zip(y).map(|(xi, yi)| yi - self.predict(*xi)).collect()
    }

    fn is_finite(&self) -> bool {
        self.slope.is_finite() && self.intercept.is_finite()
    }
}

/// Power-law fit in log-log space, `ln y = exponent * ln x + ln scale`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogLogFit {
    /// Fitted exponent (slope in log space)
    pub exponent: f64,
    /// Intercept in log space
    pub log_intercept: f64,
    /// Unweighted r² in log space, `None` when the targets have no spread
    pub r_squared: Option<f64>,
}

/// Regression primitives over paired samples
pub struct WeightedRegression;

impl WeightedRegression {
    /// Weighted ordinary least squares
    ///
    /// Returns `None` when the inputs are empty or mismatched, the total weight
    /// is not positive, or `x` has no weighted spread.
    #[must_use]
    pub fn least_squares(x: &[f64], y: &[f64], weights: &[f64]) -> Option<LinearFit> {
        if x.is_empty() || x.len() != y.len() || x.len() != weights.len() {
            return None;
        }
        let total_weight: f64 = weights.iter().sum();
        if !total_weight.is_finite() || total_weight <= 0.0 {
            return None;
        }

        let x_mean = weighted_mean(x, weights, total_weight);
        let y_mean = weighted_mean(y, weights, total_weight);

        let mut sxx = 0.0;
        let mut sxy = 0.0;
        for ((xi, yi), wi) in x.iter().zip(y).zip(weights) {
            let dx = xi - x_mean;
            sxx += wi * dx * dx;
            sxy += wi * dx * (yi - y_mean);
        }

        // Relative threshold: identical x values leave only rounding noise in sxx
        let scale = total_weight * x_mean.mul_add(x_mean, 1.0);
        if !sxx.is_finite() || sxx <= scale * 1e-12 {
            return None;
        }

        let slope = sxy / sxx;
        let fit = LinearFit {
            slope,
            intercept: slope.mul_add(-x_mean, y_mean),
        };
        fit.is_finite().then_some(fit)
    }

    /// Weighted robust regression with Huber loss
    ///
    /// Solved by iteratively reweighted least squares starting from the
    /// weighted least-squares line. Residuals are scaled by a MAD-based
    /// estimate each iteration; samples beyond the Huber threshold are
    /// down-weighted by `epsilon / |scaled residual|`. A perfect fit (zero
    /// scale) returns the least-squares line unchanged.
    #[must_use]
    pub fn huber(x: &[f64], y: &[f64], weights: &[f64]) -> Option<LinearFit> {
        let mut fit = Self::least_squares(x, y, weights)?;
        let mut effective = vec![0.0; weights.len()];

        for _ in 0..MAX_IRLS_ITERATIONS {
            let residuals = fit.residuals(x, y);
            let scale = mad_scale(&residuals);
            if scale <= f64::EPSILON {
                break;
            }

            for ((slot, residual), base) in effective.iter_mut().zip(&residuals).zip(weights) {
                let scaled = (residual / scale).abs();
                let huber = if scaled <= HUBER_EPSILON {
                    1.0
                } else {
                    HUBER_EPSILON / scaled
                };
                *slot = base * huber;
            }

            let next = Self::least_squares(x, y, &effective)?;
            let converged = relative_change(fit.slope, next.slope) < IRLS_TOLERANCE
                && relative_change(fit.intercept, next.intercept) < IRLS_TOLERANCE;
            fit = next;
            if converged {
                break;
            }
        }

        Some(fit)
    }

    /// Weighted coefficient of determination
    ///
    /// `None` when there are no samples, the total weight is not positive or
    /// the weighted total sum of squares is not positive.
    #[must_use]
    pub fn r_squared(y: &[f64], predicted: &[f64], weights: &[f64]) -> Option<f64> {
        if y.is_empty() || y.len() != predicted.len() || y.len() != weights.len() {
            return None;
        }
        let total_weight: f64 = weights.iter().sum();
        if total_weight <= 0.0 {
            return None;
        }
        let mean = weighted_mean(y, weights, total_weight);
        let mut ss_res = 0.0;
        let mut ss_tot = 0.0;
        for ((yi, pi), wi) in y.iter().zip(predicted).zip(weights) {
            ss_res += wi * (yi - pi).powi(2);
            ss_tot += wi * (yi - mean).powi(2);
        }
        if ss_tot <= 0.0 {
            return None;
        }
        Some(1.0 - ss_res / ss_tot)
    }

    /// Unweighted least squares of `ln y` on `ln x`
    ///
    /// Requires at least two samples with positive coordinates and distinct `x`.
    #[must_use]
    pub fn log_log(x: &[f64], y: &[f64]) -> Option<LogLogFit> {
        if x.len() < 2 || x.len() != y.len() || x.iter().chain(y).any(|v| *v <= 0.0) {
            return None;
        }
        let log_x: Vec<f64> = x.iter().map(|v| v.ln()).collect();
        let log_y: Vec<f64> = y.iter().map(|v| v.ln()).collect();
        let ones = vec![1.0; log_x.len()];
        let fit = Self::least_squares(&log_x, &log_y, &ones)?;
        let predicted: Vec<f64> = log_x.iter().map(|v| fit.predict(*v)).collect();
        Some(LogLogFit {
            exponent: fit.slope,
            log_intercept: fit.intercept,
            r_squared: Self::r_squared(&log_y, &predicted, &ones),
        })
    }
}

/// Population standard deviation
#[must_use]
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt()
}

/// Coefficient of variation (population std over mean)
///
/// `None` with fewer than two values or a non-positive mean.
#[must_use]
pub fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    (mean > 0.0).then(|| std_dev(values) / mean)
}

fn weighted_mean(values: &[f64], weights: &[f64], total_weight: f64) -> f64 {
    values.iter().zip(weights).map(|(v, w)| v * w).sum::<f64>() / total_weight
}

fn median(values: &mut [f64]) -> f64 {
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

fn mad_scale(residuals: &[f64]) -> f64 {
    if residuals.is_empty() {
        return 0.0;
    }
    let mut sorted = residuals.to_vec();
    let center = median(&mut sorted);
    let mut deviations: Vec<f64> = residuals.iter().map(|r| (r - center).abs()).collect();
    let mean_deviation = deviations.iter().sum::<f64>() / deviations.len() as f64;
    let mad = median(&mut deviations) / MAD_TO_SIGMA;
    if mad > f64::EPSILON {
        mad
    } else {
        // More than half the residuals coincide; fall back to the mean absolute deviation
        mean_deviation * MEAN_DEVIATION_TO_SIGMA
    }
}

fn relative_change(previous: f64, next: f64) -> f64 {
    (next - previous).abs() / previous.abs().max(f64::MIN_POSITIVE)
}
