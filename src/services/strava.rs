// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client.
//!
//! Handles:
//! - OAuth token exchange (authorization code, client credentials, refresh)
//! - Paginated activity listing within a date window
//!
//! Nothing here retries. Every failure is returned to the caller.

use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::{AppError, Result, MIN_TOKEN_LIFETIME_SECS};
use crate::models::{ActivityAggregate, ActivityRecord, DateWindow, OAuthToken, SummaryActivityV3};

/// Page size for the activity listing endpoint.
pub const ACTIVITIES_PER_PAGE: u32 = 100;

/// Scopes requested during authorization.
pub const OAUTH_SCOPES: &str = "profile:read_all,activity:read_all";

/// Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
}

impl StravaClient {
    /// Create a new Strava client against the public Strava host.
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self::with_base_url(crate::config::DEFAULT_STRAVA_URL, client_id, client_secret)
    }

    /// Create a client against an arbitrary provider base URL.
    pub fn with_base_url(base_url: &str, client_id: String, client_secret: String) -> Self {
        Self::with_http(reqwest::Client::new(), base_url, client_id, client_secret)
    }

    fn with_http(
        http: reqwest::Client,
        base_url: &str,
        client_id: String,
        client_secret: String,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id,
            client_secret,
        }
    }

    /// Build a client from application configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.strava_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_http(
            builder.build()?,
            &config.strava_url,
            config.strava_client_id.clone(),
            config.strava_client_secret.clone(),
        ))
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    fn token_url(&self) -> String {
        format!("{}/oauth/token", self.base_url)
    }

    /// Authorization URL the user is redirected to.
    pub fn authorize_url(&self, redirect_uri: &str, state: &str) -> String {
        format!(
            "{}/oauth/authorize?\
             client_id={}&\
             response_type=code&\
             redirect_uri={}&\
             scope={}&\
             state={}",
            self.base_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(OAUTH_SCOPES),
            urlencoding::encode(state),
        )
    }

    // ─── Token Exchange ──────────────────────────────────────────────────────

    /// Exchange an authorization code for tokens.
    ///
    /// A short-lived token is still returned; it only triggers a warning since
    /// the interactive flow can simply re-authorize.
    pub async fn exchange_code(&self, code: &str) -> Result<OAuthToken> {
        let response = self
            .http
            .post(self.token_url())
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "authorization_code"),
                ("code", code),
            ])
            .send()
            .await
            .map_err(AppError::Transport)?;

        let token: OAuthToken = check_response_json(response).await?;
        warn_if_short_lived(&token, "authorization_code");
        Ok(token)
    }

    /// Exchange a refresh token for a new token pair.
    ///
    /// Only ever called explicitly; nothing refreshes tokens automatically.
    pub async fn refresh(&self, refresh_token: &str) -> Result<OAuthToken> {
        let response = self
            .http
            .post(self.token_url())
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(AppError::Transport)?;

        let token: OAuthToken = check_response_json(response).await?;
        warn_if_short_lived(&token, "refresh_token");
        Ok(token)
    }

    /// Obtain a token with the client-credentials grant.
    ///
    /// Used by unattended processes, so a token that expires within a minute
    /// is an error rather than a warning.
    pub async fn client_credentials(&self, apikey: &str) -> Result<OAuthToken> {
        let secret = URL_SAFE.encode(apikey.as_bytes());

        let response = self
            .http
            .post(self.token_url())
            .header(reqwest::header::AUTHORIZATION, format!("Basic {}", secret))
            .form(&[("format", "json"), ("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(AppError::Transport)?;

        let token: OAuthToken = check_response_json(response).await?;
        if token.expires_in < MIN_TOKEN_LIFETIME_SECS {
            return Err(AppError::TokenLifetime {
                expires_in: token.expires_in,
            });
        }
        Ok(token)
    }

    // ─── Activities ──────────────────────────────────────────────────────────

    /// Fetch a single page of activities (1-based page index).
    pub async fn list_activities(
        &self,
        access_token: &str,
        window: &DateWindow,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<SummaryActivityV3>> {
        let url = format!("{}/api/v3/athlete/activities", self.base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("page", page.to_string()),
                ("per_page", per_page.to_string()),
                ("after", window.after_epoch().to_string()),
                ("before", window.before_epoch().to_string()),
            ])
            .send()
            .await
            .map_err(AppError::Transport)?;

        check_response_json(response).await
    }

    /// Fetch every activity in `window`.
    ///
    /// Pages are requested one after another until a page comes back with
    /// fewer than [`ACTIVITIES_PER_PAGE`] entries. A full page is always
    /// followed by another request. Any failure discards everything fetched
    /// so far.
    pub async fn fetch_activities(
        &self,
        access_token: &str,
        window: &DateWindow,
    ) -> Result<Vec<ActivityRecord>> {
        let mut records = Vec::new();
        let mut page = 1u32;

        loop {
            let batch = self
                .list_activities(access_token, window, page, ACTIVITIES_PER_PAGE)
                .await?;
            let count = batch.len();

            tracing::debug!(page, count, "Fetched activity page");
            records.extend(batch.into_iter().map(ActivityRecord::from));

            if count < ACTIVITIES_PER_PAGE as usize {
                break;
            }
            page += 1;
        }

        tracing::info!(
            pages = page,
            activities = records.len(),
            "Fetched activities"
        );
        Ok(records)
    }

    /// Fetch every activity in `window` and reduce it to minutes per day.
    pub async fn fetch_aggregate(
        &self,
        access_token: &str,
        window: &DateWindow,
    ) -> Result<ActivityAggregate> {
        let records = self.fetch_activities(access_token, window).await?;
        Ok(ActivityAggregate::reduce(records))
    }
}

fn warn_if_short_lived(token: &OAuthToken, grant_type: &str) {
    if token.expires_in < MIN_TOKEN_LIFETIME_SECS {
        tracing::warn!(
            grant_type,
            expires_in = token.expires_in,
            "Token will expire in less than a minute"
        );
    }
}

/// Check response status and decode the JSON body.
///
/// The response is consumed on every path, so its connection is released.
async fn check_response_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        if status.as_u16() == 429 {
            tracing::warn!("Strava rate limit hit (429)");
        }
        tracing::debug!(status = %status, body = %body, "Strava request failed");
        return Err(AppError::Remote {
            status: status.as_u16(),
            body,
        });
    }

    let bytes = response.bytes().await.map_err(AppError::Transport)?;
    Ok(serde_json::from_slice(&bytes)?)
}
