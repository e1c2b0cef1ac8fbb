// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Render a synthetic year without touching Strava.
//!
//! `HEATMAP_YEAR` picks the year (default 2022); output goes to
//! `HEATMAP_OUT` (default `heatmap-demo.json`).

use anyhow::Context;
use std::env;
use strava_heatmap::{
    logging,
    services::{demo_year, HeatmapConfig, HeatmapRenderer, JsonHeatmapRenderer},
};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init();

    let year: i32 = match env::var("HEATMAP_YEAR") {
        Ok(v) => v.trim().parse().context("HEATMAP_YEAR must be a year")?,
        Err(_) => 2022,
    };
    let counts = demo_year(year);

    let out = env::var("HEATMAP_OUT").unwrap_or_else(|_| "heatmap-demo.json".to_string());
    let bytes = JsonHeatmapRenderer.render(&HeatmapConfig::default(), &counts)?;
    std::fs::write(&out, bytes).with_context(|| format!("Failed to write {}", out))?;

    tracing::info!(path = %out, year, days = counts.len(), "Demo heatmap written");
    Ok(())
}
