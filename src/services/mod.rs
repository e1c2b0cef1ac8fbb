// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - Strava client and heatmap rendering.

pub mod heatmap;
pub mod strava;

pub use heatmap::{demo_year, HeatmapConfig, HeatmapRenderer, JsonHeatmapRenderer};
pub use strava::StravaClient;
