// ABOUTME: Versioned, file-backed registry owning the active auxiliary regressor
// ABOUTME: Loads or bootstraps at startup and swaps model plus metadata atomically on retrain
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Model Registry
//!
//! The registry is the single owner of the auxiliary regressor and its
//! `{logic_version, train_revision}` metadata. Readers take an
//! `Arc<ActiveModel>` snapshot and never observe a model paired with another
//! model's metadata: retraining fits and persists the replacement off the
//! lock, then swaps both in one write.
//!
//! On disk the store holds two JSON documents in the configured directory:
//! `model.json` (the serialized [`Regressor`]) and `model_meta.json`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};
use vantage_core::constants::versions::LOGIC_VERSION;
use vantage_core::errors::{AppError, AppResult};
use vantage_core::models::RunRecord;

use super::features::{feature_row, TrainingSet};
use super::regressor::{Regressor, RegressorAlgorithm};
use crate::config::ServerConfig;

/// Serialized regressor file name
pub const MODEL_FILE: &str = "model.json";
/// Metadata file name
pub const META_FILE: &str = "model_meta.json";

/// Persisted version metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Logic version of the service that last wrote the model
    #[serde(default = "current_logic_version")]
    pub logic_version: String,
    /// Number of retrains since the store was created
    #[serde(default)]
    pub train_revision: u64,
}

fn current_logic_version() -> String {
    LOGIC_VERSION.to_owned()
}

impl Default for ModelMetadata {
    fn default() -> Self {
        Self {
            logic_version: current_logic_version(),
            train_revision: 0,
        }
    }
}

impl ModelMetadata {
    /// Composite version string, e.g. `v3-clean-physiology.r4`
    #[must_use]
    pub fn version(&self) -> String {
        format!("{}.r{}", self.logic_version, self.train_revision)
    }
}

/// Where the training samples of a retrain came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrainingMode {
    /// Fitted on the caller's runs with the requested algorithm
    RealRuns,
    /// Too few runs; fitted on seeded synthetic data with gradient boosting
    SyntheticBootstrap,
}

/// A regressor paired with the metadata it was persisted with
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveModel {
    /// Fitted regressor
    pub regressor: Regressor,
    /// Version metadata
    pub metadata: ModelMetadata,
}

impl ActiveModel {
    /// Composite version string
    #[must_use]
    pub fn version(&self) -> String {
        self.metadata.version()
    }

    /// Implied velocity (km/s) the regressor predicts for a run
    #[must_use]
    pub fn predict_velocity(&self, run: &RunRecord) -> f64 {
        self.regressor.predict(&feature_row(run))
    }
}

/// Result of a retrain, returned verbatim by `POST /train`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainOutcome {
    /// Always `retrained`
    pub status: String,
    /// Algorithm requested by the caller
    pub algorithm: RegressorAlgorithm,
    /// Source of the training samples
    pub mode: TrainingMode,
    /// Number of runs supplied
    pub samples: usize,
    /// Version string after the retrain
    pub model_version: String,
}

/// File layout of the model store
#[derive(Debug, Clone)]
struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    fn model_path(&self) -> PathBuf {
        self.dir.join(MODEL_FILE)
    }

    fn meta_path(&self) -> PathBuf {
        self.dir.join(META_FILE)
    }

    fn read_json<T: DeserializeOwned>(path: &Path) -> AppResult<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Write to a sibling temp file, returning its path
    fn stage_json<T: Serialize>(path: &Path, value: &T) -> AppResult<PathBuf> {
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec(value)?)?;
        Ok(tmp)
    }

    fn commit(tmp: &Path, path: &Path) -> AppResult<()> {
        fs::rename(tmp, path).map_err(|e| {
            AppError::storage(format!("failed to replace {}: {e}", path.display())).with_source(e)
        })
    }

    /// Write to a sibling temp file, then rename over the target
    fn write_json<T: Serialize>(path: &Path, value: &T) -> AppResult<()> {
        let tmp = Self::stage_json(path, value)?;
        Self::commit(&tmp, path)
    }

    /// Stage both files before renaming either, so a failed write leaves the stored pair intact
    fn persist(&self, model: &ActiveModel) -> AppResult<()> {
        let model_path = self.model_path();
        let meta_path = self.meta_path();

        let model_tmp = Self::stage_json(&model_path, &model.regressor)?;
        let meta_tmp = match Self::stage_json(&meta_path, &model.metadata) {
            Ok(tmp) => tmp,
            Err(e) => {
                let _ = fs::remove_file(&model_tmp);
                return Err(e);
            }
        };

        Self::commit(&model_tmp, &model_path)?;
        Self::commit(&meta_tmp, &meta_path)
    }

    /// Load the stored model, or fit and persist a synthetic one
    fn load_or_bootstrap(&self, seed: u64) -> AppResult<ActiveModel> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            let message = format!("cannot create model directory {}: {e}", self.dir.display());
            AppError::storage(message).with_source(e)
        })?;

        let stored = match Self::read_json::<Regressor>(&self.model_path()) {
            Ok(stored) => stored,
            Err(e) => {
                warn!(path = %self.model_path().display(), "Discarding unreadable model: {e}");
                None
            }
        };
        let regressor = match stored {
            Some(regressor) => regressor,
            None => {
                info!(seed, "No stored model, fitting synthetic bootstrap");
                let regressor = Regressor::fit(
                    RegressorAlgorithm::GradientBoosting,
                    &TrainingSet::synthetic(seed),
                )?;
                Self::write_json(&self.model_path(), &regressor)?;
                regressor
            }
        };

        let mut metadata = match Self::read_json::<ModelMetadata>(&self.meta_path()) {
            Ok(Some(metadata)) => metadata,
            Ok(None) => ModelMetadata::default(),
            Err(e) => {
                warn!(path = %self.meta_path().display(), "Resetting unreadable metadata: {e}");
                ModelMetadata::default()
            }
        };
        metadata.logic_version = current_logic_version();
        Self::write_json(&self.meta_path(), &metadata)?;

        Ok(ActiveModel {
            regressor,
            metadata,
        })
    }
}

/// Owner of the active auxiliary model
pub struct ModelRegistry {
    store: ModelStore,
    active: RwLock<Arc<ActiveModel>>,
    retrain_guard: Mutex<()>,
    synthetic_seed: u64,
    min_training_runs: usize,
}

impl ModelRegistry {
    /// Open the store in `config.model_dir`, bootstrapping it when empty
    ///
    /// # Errors
    ///
    /// Returns a storage error when the directory or files cannot be written
    pub async fn open(config: &ServerConfig) -> AppResult<Self> {
        let store = ModelStore {
            dir: config.model_dir.clone(),
        };
        let seed = config.synthetic_seed;
        let loader = store.clone();
        let active = tokio::task::spawn_blocking(move || loader.load_or_bootstrap(seed))
            .await
            .map_err(|e| AppError::internal(format!("model loading task failed: {e}")))??;

        info!(
            dir = %store.dir.display(),
            algorithm = %active.regressor.algorithm(),
            version = %active.version(),
            "Model registry ready"
        );

        Ok(Self {
            store,
            active: RwLock::new(Arc::new(active)),
            retrain_guard: Mutex::new(()),
            synthetic_seed: seed,
            min_training_runs: config.min_training_runs,
        })
    }

    /// Current model and metadata
    pub async fn snapshot(&self) -> Arc<ActiveModel> {
        Arc::clone(&*self.active.read().await)
    }

    /// Current composite version string
    pub async fn model_version(&self) -> String {
        self.snapshot().await.version()
    }

    /// Refit, persist and swap the active model
    ///
    /// With fewer than the configured minimum runs the model is rebuilt from
    /// synthetic data. Either way the train revision advances by one.
    ///
    /// # Errors
    ///
    /// Returns an error when fitting fails or the store cannot be written;
    /// the previously active model stays in place.
    pub async fn retrain(
        &self,
        algorithm: RegressorAlgorithm,
        runs: Vec<RunRecord>,
    ) -> AppResult<TrainOutcome> {
        let _guard = self.retrain_guard.lock().await;

        let samples = runs.len();
        let mode = if samples >= self.min_training_runs {
            TrainingMode::RealRuns
        } else {
            TrainingMode::SyntheticBootstrap
        };
        let revision = self.snapshot().await.metadata.train_revision + 1;
        let store = self.store.clone();
        let seed = self.synthetic_seed;

        let replacement = tokio::task::spawn_blocking(move || -> AppResult<ActiveModel> {
            let regressor = match mode {
                TrainingMode::RealRuns => {
                    Regressor::fit(algorithm, &TrainingSet::from_runs(&runs))?
                }
                TrainingMode::SyntheticBootstrap => Regressor::fit(
                    RegressorAlgorithm::GradientBoosting,
                    &TrainingSet::synthetic(seed),
                )?,
            };
            let model = ActiveModel {
                regressor,
                metadata: ModelMetadata {
                    logic_version: current_logic_version(),
                    train_revision: revision,
                },
            };
            store.persist(&model)?;
            Ok(model)
        })
        .await
        .map_err(|e| AppError::internal(format!("retrain task failed: {e}")))??;

        let model_version = replacement.version();
        *self.active.write().await = Arc::new(replacement);

        info!(%algorithm, ?mode, samples, %model_version, "Model retrained");
        Ok(TrainOutcome {
            status: "retrained".to_owned(),
            algorithm,
            mode,
            samples,
            model_version,
        })
    }
}
