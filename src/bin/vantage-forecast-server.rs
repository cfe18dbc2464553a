// ABOUTME: HTTP server binary for the Vantage race forecasting service
// ABOUTME: Loads configuration, opens the model registry and serves until Ctrl-C
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Vantage Forecast Server Binary
//!
//! Serves `/health`, `/predict` and `/train` over HTTP.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use vantage_forecast::{config::ServerConfig, logging, resources::ServerResources, routes};

#[derive(Parser)]
#[command(name = "vantage-forecast-server")]
#[command(about = "Vantage race forecasting service - critical velocity race time prediction")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    logging::init_from_env()?;
    info!("{}", config.summary());

    let bind_address = config.bind_address();
    let resources = Arc::new(
        ServerResources::from_config(config)
            .await
            .context("failed to open model registry")?,
    );
    let app = routes::router(resources);

    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;
    info!("Listening on http://{bind_address}");
    info!("   Health:  GET  /health");
    info!("   Predict: POST /predict");
    info!("   Train:   POST /train");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        return;
    }
    info!("Shutdown signal received, draining connections");
}
