// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Heatmap chart routes.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{ActivityAggregate, DateWindow};
use crate::routes::auth::ACCESS_TOKEN_COOKIE;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(chart))
        .route("/chart", get(chart))
}

/// Render the heatmap for the session in the request.
///
/// Without a session an empty heatmap is rendered. With a session, a failed
/// fetch is an error and nothing is rendered.
async fn chart(State(state): State<Arc<AppState>>, jar: CookieJar) -> Result<Response> {
    match jar
        .get(ACCESS_TOKEN_COOKIE)
        .map(|c| c.value())
        .filter(|v| !v.is_empty())
    {
        Some(access_token) => render_session_chart(&state, access_token).await,
        None => {
            tracing::info!("No session, rendering empty heatmap");
            render(&state, &ActivityAggregate::new())
        }
    }
}

/// Fetch the current year's activities and render them.
pub(crate) async fn render_session_chart(
    state: &AppState,
    access_token: &str,
) -> Result<Response> {
    let window = DateWindow::current_year().ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!("Local calendar year has no midnight"))
    })?;

    let counts = state.strava.fetch_aggregate(access_token, &window).await?;
    tracing::info!(days = counts.len(), "Aggregated activities for heatmap");

    render(state, &counts)
}

fn render(state: &AppState, counts: &ActivityAggregate) -> Result<Response> {
    let bytes = state.renderer.render(&state.heatmap, counts)?;
    Ok(([(header::CONTENT_TYPE, state.renderer.content_type())], bytes).into_response())
}
