// ABOUTME: Vantage CLI - offline race predictions and accuracy reports from JSON files
// ABOUTME: Runs the projection engine without the HTTP server
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Predict from a request file, as of now
//! vantage-cli predict --request request.json
//!
//! # Predict as of a fixed instant, printing a table instead of JSON
//! vantage-cli predict --request request.json --as-of 2025-06-01T07:30:00Z --table
//!
//! # Score previously issued predictions against actual results
//! vantage-cli evaluate --runs evaluated_runs.json
//! ```

mod commands;
mod helpers;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use vantage_forecast::AppResult;

#[derive(Parser)]
#[command(
    name = "vantage-cli",
    about = "Vantage race forecasting CLI",
    long_about = "Runs race predictions and accuracy evaluation against JSON files, without a server."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging of engine decisions
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Predict race times from a prediction request file
    Predict {
        /// Path to a JSON prediction request
        #[arg(long)]
        request: PathBuf,

        /// Reference instant (RFC 3339 or naive UTC); defaults to now
        #[arg(long)]
        as_of: Option<String>,

        /// Print a table instead of JSON
        #[arg(long)]
        table: bool,
    },

    /// Evaluate issued predictions against the runs that followed them
    Evaluate {
        /// Path to a JSON array of runs, each optionally carrying `prediction.predicted_times`
        #[arg(long)]
        runs: PathBuf,

        /// Print a table instead of JSON
        #[arg(long)]
        table: bool,
    },
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Predict {
            request,
            as_of,
            table,
        } => commands::predict::run(&request, as_of.as_deref(), table),
        Command::Evaluate { runs, table } => commands::evaluate::run(&runs, table),
    }
}
