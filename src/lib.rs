// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava heatmap: minutes of activity per day, drawn as a calendar.
//!
//! This crate handles the Strava OAuth flow, pages through a user's
//! activities for a date window, and reduces them to a per-day aggregate
//! for a heatmap renderer.

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use services::{HeatmapConfig, HeatmapRenderer, StravaClient};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub strava: StravaClient,
    pub heatmap: HeatmapConfig,
    pub renderer: Arc<dyn HeatmapRenderer>,
}
