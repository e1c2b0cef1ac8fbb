// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Render this year's heatmap from the command line.
//!
//! Credentials come from the environment, first match wins:
//! - `STRAVA_ACCESS`: an access token, used as-is
//! - `STRAVA_REFRESH_TOKEN`: exchanged via the refresh grant
//!   (needs `STRAVA_CLIENT_ID` and `STRAVA_CLIENT_SECRET`)
//! - `STRAVA_API_KEY`: exchanged via the client-credentials grant
//!
//! Output goes to `HEATMAP_OUT` (default `heatmap.json`).

use anyhow::Context;
use std::env;
use strava_heatmap::{
    config::DEFAULT_STRAVA_URL,
    logging,
    models::DateWindow,
    services::{HeatmapConfig, HeatmapRenderer, JsonHeatmapRenderer, StravaClient},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init();

    let strava = StravaClient::with_base_url(
        &env::var("STRAVA_URL").unwrap_or_else(|_| DEFAULT_STRAVA_URL.to_string()),
        env::var("STRAVA_CLIENT_ID").unwrap_or_default(),
        env::var("STRAVA_CLIENT_SECRET").unwrap_or_default(),
    );

    let access_token = if let Ok(token) = env::var("STRAVA_ACCESS") {
        token
    } else if let Ok(refresh_token) = env::var("STRAVA_REFRESH_TOKEN") {
        strava.refresh(&refresh_token).await?.access_token
    } else if let Ok(apikey) = env::var("STRAVA_API_KEY") {
        strava.client_credentials(&apikey).await?.access_token
    } else {
        anyhow::bail!("Set STRAVA_ACCESS, STRAVA_REFRESH_TOKEN or STRAVA_API_KEY");
    };

    let window = DateWindow::current_year().context("Local calendar year has no midnight")?;
    let counts = strava.fetch_aggregate(&access_token, &window).await?;

    let out = env::var("HEATMAP_OUT").unwrap_or_else(|_| "heatmap.json".to_string());
    let bytes = JsonHeatmapRenderer.render(&HeatmapConfig::default(), &counts)?;
    std::fs::write(&out, bytes).with_context(|| format!("Failed to write {}", out))?;

    tracing::info!(
        path = %out,
        days = counts.len(),
        max_minutes = counts.max_minutes().unwrap_or(0),
        "Heatmap written"
    );
    Ok(())
}
