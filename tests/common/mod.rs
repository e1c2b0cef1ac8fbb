// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared test helpers: an in-process fake Strava and a test app.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Form, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use strava_heatmap::config::Config;
use strava_heatmap::models::ActivityAggregate;
use strava_heatmap::routes::create_router;
use strava_heatmap::services::{HeatmapConfig, HeatmapRenderer, StravaClient};
use strava_heatmap::AppState;

/// What the fake returns for one page of the activity listing.
#[allow(dead_code)]
#[derive(Clone)]
pub enum PageResponse {
    Activities(Vec<Value>),
    Status(u16),
    Raw(String),
}

/// A request as seen by the fake.
#[allow(dead_code)]
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub query: HashMap<String, String>,
    pub form: HashMap<String, String>,
    pub authorization: Option<String>,
}

pub struct FakeState {
    /// Status and body for every token request
    pub token_response: Mutex<(u16, String)>,
    /// Listing pages, indexed by `page - 1`; missing pages are empty
    pub pages: Mutex<Vec<PageResponse>>,
    pub token_requests: Mutex<Vec<RecordedRequest>>,
    pub activity_requests: Mutex<Vec<RecordedRequest>>,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            token_response: Mutex::new((200, token_json(21600))),
            pages: Mutex::new(Vec::new()),
            token_requests: Mutex::new(Vec::new()),
            activity_requests: Mutex::new(Vec::new()),
        }
    }
}

pub struct FakeStrava {
    pub base_url: String,
    pub state: Arc<FakeState>,
}

#[allow(dead_code)]
impl FakeStrava {
    pub fn set_token_response(&self, status: u16, body: impl Into<String>) {
        *self.state.token_response.lock().unwrap() = (status, body.into());
    }

    pub fn set_pages(&self, pages: Vec<PageResponse>) {
        *self.state.pages.lock().unwrap() = pages;
    }

    pub fn token_requests(&self) -> Vec<RecordedRequest> {
        self.state.token_requests.lock().unwrap().clone()
    }

    pub fn activity_requests(&self) -> Vec<RecordedRequest> {
        self.state.activity_requests.lock().unwrap().clone()
    }

    pub fn client(&self) -> StravaClient {
        StravaClient::with_base_url(
            &self.base_url,
            "test_client_id".to_string(),
            "test_secret".to_string(),
        )
    }
}

fn json_response(status: u16, body: String) -> axum::response::Response {
    (
        StatusCode::from_u16(status).unwrap(),
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}

fn authorization(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
}

async fn fake_token(
    State(state): State<Arc<FakeState>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> axum::response::Response {
    state.token_requests.lock().unwrap().push(RecordedRequest {
        query,
        form,
        authorization: authorization(&headers),
    });
    let (status, body) = state.token_response.lock().unwrap().clone();
    json_response(status, body)
}

async fn fake_activities(
    State(state): State<Arc<FakeState>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> axum::response::Response {
    let page: usize = query
        .get("page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(1);

    state.activity_requests.lock().unwrap().push(RecordedRequest {
        query,
        form: HashMap::new(),
        authorization: authorization(&headers),
    });

    let response = state
        .pages
        .lock()
        .unwrap()
        .get(page.saturating_sub(1))
        .cloned()
        .unwrap_or(PageResponse::Activities(Vec::new()));

    match response {
        PageResponse::Activities(items) => json_response(200, Value::Array(items).to_string()),
        PageResponse::Status(status) => json_response(status, r#"{"message":"error"}"#.into()),
        PageResponse::Raw(body) => json_response(200, body),
    }
}

/// Start a fake Strava on an ephemeral port.
#[allow(dead_code)]
pub async fn spawn_fake_strava() -> FakeStrava {
    let state = Arc::new(FakeState::default());
    let app = Router::new()
        .route("/oauth/token", post(fake_token))
        .route("/api/v3/athlete/activities", get(fake_activities))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeStrava {
        base_url: format!("http://{}", addr),
        state,
    }
}

/// A base URL nothing is listening on.
#[allow(dead_code)]
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Token endpoint response body.
#[allow(dead_code)]
pub fn token_json(expires_in: i64) -> String {
    json!({
        "token_type": "Bearer",
        "access_token": "fake-access",
        "refresh_token": "fake-refresh",
        "expires_at": 1_700_000_000 + expires_in,
        "expires_in": expires_in,
    })
    .to_string()
}

/// One summary activity as Strava serializes it.
#[allow(dead_code)]
pub fn activity_json(start_date: &str, moving_time: i64) -> Value {
    json!({
        "resource_state": 2,
        "name": "Afternoon Ride",
        "distance": 24500.3,
        "moving_time": moving_time,
        "elapsed_time": moving_time + 600,
        "type": "Ride",
        "sport_type": "Ride",
        "start_date": start_date,
    })
}

/// A page of `n` identical ten-minute activities.
#[allow(dead_code)]
pub fn activity_page(n: usize, start_date: &str) -> PageResponse {
    PageResponse::Activities((0..n).map(|_| activity_json(start_date, 600)).collect())
}

/// Renderer that records every aggregate it is asked to draw.
#[derive(Default)]
pub struct RecordingRenderer {
    pub calls: Mutex<Vec<ActivityAggregate>>,
}

#[allow(dead_code)]
impl RecordingRenderer {
    pub fn calls(&self) -> Vec<ActivityAggregate> {
        self.calls.lock().unwrap().clone()
    }
}

impl HeatmapRenderer for RecordingRenderer {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn render(
        &self,
        _config: &HeatmapConfig,
        counts: &ActivityAggregate,
    ) -> anyhow::Result<Vec<u8>> {
        self.calls.lock().unwrap().push(counts.clone());
        Ok(serde_json::to_vec(counts)?)
    }
}

/// Create a test app talking to `strava_url`.
/// Returns the router, the shared state and the renderer.
#[allow(dead_code)]
pub fn create_test_app(strava_url: &str) -> (Router, Arc<AppState>, Arc<RecordingRenderer>) {
    create_test_app_with_config(Config {
        strava_url: strava_url.to_string(),
        ..Config::test_default()
    })
}

/// Create a test app from a full configuration.
#[allow(dead_code)]
pub fn create_test_app_with_config(
    config: Config,
) -> (Router, Arc<AppState>, Arc<RecordingRenderer>) {
    let strava = StravaClient::from_config(&config).unwrap();
    let renderer = Arc::new(RecordingRenderer::default());

    let state = Arc::new(AppState {
        config,
        strava,
        heatmap: HeatmapConfig::default(),
        renderer: renderer.clone(),
    });

    (create_router(state.clone()), state, renderer)
}
