// ABOUTME: Environment configuration for bind address, model storage and retraining settings
// ABOUTME: Parses environment variables with defaults and reports malformed values as config errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration management for deployment

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;
use vantage_core::errors::{AppError, AppResult};

/// Default bind address
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default HTTP port
pub const DEFAULT_HTTP_PORT: u16 = 8001;
/// Default model directory
pub const DEFAULT_MODEL_DIR: &str = "./model_store";
/// Default seed for the synthetic bootstrap regressor
pub const DEFAULT_SYNTHETIC_SEED: u64 = 7;
/// Default minimum number of runs for a real-runs retrain
pub const DEFAULT_MIN_TRAINING_RUNS: usize = 10;

/// Deployment environment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Test runs
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// HTTP port
    pub http_port: u16,
    /// Directory holding `model.json` and `model_meta.json`
    pub model_dir: PathBuf,
    /// Deployment environment
    pub environment: Environment,
    /// Seed for the synthetic bootstrap regressor
    pub synthetic_seed: u64,
    /// Minimum runs for a real-runs retrain
    pub min_training_runs: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            http_port: DEFAULT_HTTP_PORT,
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            environment: Environment::default(),
            synthetic_seed: DEFAULT_SYNTHETIC_SEED,
            min_training_runs: DEFAULT_MIN_TRAINING_RUNS,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns a config error when a numeric variable cannot be parsed or the
    /// minimum training run count is zero.
    pub fn from_env() -> AppResult<Self> {
        info!("Loading configuration from environment variables");

        let config = Self {
            host: env_var_or("VANTAGE_HOST", DEFAULT_HOST),
            http_port: parse_env("HTTP_PORT", DEFAULT_HTTP_PORT)?,
            model_dir: PathBuf::from(env_var_or("VANTAGE_MODEL_DIR", DEFAULT_MODEL_DIR)),
            environment: Environment::from_str_or_default(&env_var_or("ENVIRONMENT", "development")),
            synthetic_seed: parse_env("VANTAGE_SYNTHETIC_SEED", DEFAULT_SYNTHETIC_SEED)?,
            min_training_runs: parse_env("VANTAGE_MIN_TRAINING_RUNS", DEFAULT_MIN_TRAINING_RUNS)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that parse but make no sense
    ///
    /// # Errors
    ///
    /// Returns a config error for a zero minimum training run count.
    pub fn validate(&self) -> AppResult<()> {
        if self.min_training_runs == 0 {
            return Err(AppError::config_invalid(
                "VANTAGE_MIN_TRAINING_RUNS must be at least 1",
            ));
        }
        Ok(())
    }

    /// Socket address string for binding
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }

    /// One-line description for startup logs
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Vantage Forecast configuration: bind={}, model_dir={}, environment={}, synthetic_seed={}, min_training_runs={}",
            self.bind_address(),
            self.model_dir.display(),
            self.environment,
            self.synthetic_seed,
            self.min_training_runs
        )
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse an environment variable, falling back to `default` when unset
fn parse_env<T>(key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::config(format!("Invalid {key} value {raw:?}: {e}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parsing() {
        assert_eq!(Environment::from_str_or_default("PROD"), Environment::Production);
        assert_eq!(Environment::from_str_or_default("test"), Environment::Testing);
        assert_eq!(Environment::from_str_or_default("staging"), Environment::Development);
    }

    #[test]
    fn test_summary_mentions_bind_address() {
        let config = ServerConfig::default();
        assert!(config.summary().contains("0.0.0.0:8001"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_min_training_runs_rejected() {
        let config = ServerConfig {
            min_training_runs: 0,
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
