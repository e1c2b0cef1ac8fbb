// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava Heatmap Server
//!
//! Walks the user through Strava OAuth and serves a heatmap of this year's
//! activity.

use std::sync::Arc;
use strava_heatmap::{
    config::Config,
    logging,
    services::{HeatmapConfig, JsonHeatmapRenderer, StravaClient},
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        app_url = %config.app_url,
        "Starting Strava heatmap server"
    );

    let strava = StravaClient::from_config(&config)?;

    let state = Arc::new(AppState {
        config: config.clone(),
        strava,
        heatmap: HeatmapConfig::default(),
        renderer: Arc::new(JsonHeatmapRenderer),
    });

    let app = strava_heatmap::routes::create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
