// ABOUTME: Shared server resources injected into every HTTP handler
// ABOUTME: Holds the configuration and the auxiliary model registry behind Arc
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Server Resources
//!
//! Built once at startup and shared with every route via axum state. The
//! projection engine is stateless and needs nothing from here.

use std::sync::Arc;

use vantage_core::errors::AppResult;

use crate::config::ServerConfig;
use crate::model::ModelRegistry;

/// Centralized resource container for dependency injection
#[derive(Clone)]
pub struct ServerResources {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
    /// Auxiliary model registry
    pub registry: Arc<ModelRegistry>,
}

impl ServerResources {
    /// Assemble resources from already constructed parts
    #[must_use]
    pub const fn new(config: Arc<ServerConfig>, registry: Arc<ModelRegistry>) -> Self {
        Self { config, registry }
    }

    /// Open the model registry described by `config`
    ///
    /// # Errors
    ///
    /// Returns an error when the model store cannot be loaded or bootstrapped
    pub async fn from_config(config: ServerConfig) -> AppResult<Self> {
        let registry = ModelRegistry::open(&config).await?;
        Ok(Self::new(Arc::new(config), Arc::new(registry)))
    }
}
