// ABOUTME: Re-exports command modules for vantage-cli
// ABOUTME: Provides the predict and evaluate subcommands
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub mod evaluate;
pub mod predict;
