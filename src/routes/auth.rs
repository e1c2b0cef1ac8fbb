// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava OAuth authentication routes.
//!
//! A single handler drives the whole flow. Each request is classified once
//! into an [`AuthState`]:
//!
//! - no code, no session: redirect to Strava's authorize page
//! - code present: exchange it, store tokens in cookies, redirect home
//! - session present: render the current year's heatmap

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;

use crate::error::{AppError, Result};
use crate::routes::chart::render_session_chart;
use crate::AppState;

/// Path of the auth handler; also the OAuth callback target.
pub const AUTH_PATH: &str = "/auth/strava";

/// Cookie carrying the Strava access token.
pub const ACCESS_TOKEN_COOKIE: &str = "access-token";
/// Cookie carrying the Strava refresh token.
pub const REFRESH_TOKEN_COOKIE: &str = "refresh-token";

/// How long a signed `state` parameter stays valid.
const STATE_MAX_AGE_MS: u128 = 10 * 60 * 1000;

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(AUTH_PATH, get(authorize))
}

/// Query parameters on the auth handler (Strava adds these on callback).
#[derive(Debug, Default, Deserialize)]
pub struct AuthParams {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Where a request stands in the OAuth flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    NoCode,
    HasCode(String),
    HasSession(String),
}

impl AuthState {
    /// Classify a request from its `code` parameter and session token.
    ///
    /// A code wins over an existing session: a callback always supersedes
    /// a possibly stale cookie.
    pub fn resolve(code: Option<&str>, session: Option<&str>) -> Self {
        let code = code.filter(|c| !c.is_empty());
        let session = session.filter(|s| !s.is_empty());

        match (code, session) {
            (Some(code), _) => AuthState::HasCode(code.to_string()),
            (None, Some(token)) => AuthState::HasSession(token.to_string()),
            (None, None) => AuthState::NoCode,
        }
    }
}

/// Run one step of the OAuth flow.
async fn authorize(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AuthParams>,
    jar: CookieJar,
) -> Result<Response> {
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from Strava");
        return Err(AppError::BadRequest(format!(
            "Strava authorization failed: {}",
            error
        )));
    }

    let session = jar.get(ACCESS_TOKEN_COOKIE).map(|c| c.value());

    match AuthState::resolve(params.code.as_deref(), session) {
        AuthState::NoCode => start_authorization(&state),
        AuthState::HasCode(code) => {
            complete_authorization(&state, jar, &code, params.state.as_deref()).await
        }
        AuthState::HasSession(access_token) => {
            render_session_chart(&state, &access_token).await
        }
    }
}

/// Redirect to Strava's authorize page, asking it to call us back here.
fn start_authorization(state: &AppState) -> Result<Response> {
    let oauth_state = sign_state(&state.config.oauth_state_key, now_millis()?)?;
    let callback_url = format!("{}{}", state.config.app_url, AUTH_PATH);
    let auth_url = state.strava.authorize_url(&callback_url, &oauth_state);

    tracing::info!(
        client_id = %state.strava.client_id(),
        callback_url = %callback_url,
        "Starting OAuth flow, redirecting to Strava"
    );

    Ok(Redirect::temporary(&auth_url).into_response())
}

/// Exchange the code for tokens and hand them to the browser as cookies.
async fn complete_authorization(
    state: &AppState,
    jar: CookieJar,
    code: &str,
    oauth_state: Option<&str>,
) -> Result<Response> {
    let now = now_millis()?;
    let valid = oauth_state
        .map(|s| verify_state(s, &state.config.oauth_state_key, now))
        .unwrap_or(false);
    if !valid {
        tracing::warn!("Missing, tampered or expired OAuth state parameter");
        return Err(AppError::BadRequest("Invalid OAuth state".to_string()));
    }

    tracing::info!("Exchanging authorization code for tokens");
    let token = state.strava.exchange_code(code).await?;

    let secure = state.config.secure_cookies();
    let jar = jar
        .add(session_cookie(ACCESS_TOKEN_COOKIE, token.access_token, secure))
        .add(session_cookie(REFRESH_TOKEN_COOKIE, token.refresh_token, secure));

    tracing::info!(expires_in = token.expires_in, "OAuth successful, session cookies set");

    Ok((jar, Redirect::temporary("/")).into_response())
}

fn session_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

fn now_millis() -> Result<u128> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_millis())
}

/// Produce a signed `state` parameter: base64("timestamp_hex|signature_hex").
pub fn sign_state(key: &[u8], now_ms: u128) -> Result<String> {
    let payload = format!("{:x}", now_ms);
    let signature = hex::encode(state_mac(key, &payload)?);
    Ok(URL_SAFE_NO_PAD.encode(format!("{}|{}", payload, signature)))
}

/// Check a `state` parameter's signature and age.
pub fn verify_state(state: &str, key: &[u8], now_ms: u128) -> bool {
    let Some((payload, signature)) = URL_SAFE_NO_PAD
        .decode(state)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .and_then(|s| {
            s.split_once('|')
                .map(|(p, sig)| (p.to_string(), sig.to_string()))
        })
    else {
        return false;
    };

    let Ok(expected) = state_mac(key, &payload) else {
        return false;
    };
    let Ok(signature) = hex::decode(signature) else {
        return false;
    };
    if !bool::from(expected.as_slice().ct_eq(&signature)) {
        tracing::error!("OAuth state signature mismatch! Potential tampering.");
        return false;
    }

    match u128::from_str_radix(&payload, 16) {
        Ok(issued) => issued <= now_ms && now_ms - issued <= STATE_MAX_AGE_MS,
        Err(_) => false,
    }
}

fn state_mac(key: &[u8], payload: &str) -> Result<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(payload.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"secret_key";

    #[test]
    fn test_resolve_no_code_no_session() {
        assert_eq!(AuthState::resolve(None, None), AuthState::NoCode);
        assert_eq!(AuthState::resolve(Some(""), Some("")), AuthState::NoCode);
    }

    #[test]
    fn test_resolve_code() {
        assert_eq!(
            AuthState::resolve(Some("abc"), None),
            AuthState::HasCode("abc".to_string())
        );
    }

    #[test]
    fn test_resolve_session() {
        assert_eq!(
            AuthState::resolve(None, Some("tok")),
            AuthState::HasSession("tok".to_string())
        );
    }

    #[test]
    fn test_resolve_code_wins_over_session() {
        assert_eq!(
            AuthState::resolve(Some("abc"), Some("tok")),
            AuthState::HasCode("abc".to_string())
        );
    }

    #[test]
    fn test_state_roundtrip() {
        let state = sign_state(KEY, 1_000).unwrap();
        assert!(verify_state(&state, KEY, 1_000));
        assert!(verify_state(&state, KEY, 1_000 + STATE_MAX_AGE_MS));
    }

    #[test]
    fn test_state_is_url_safe() {
        let state = sign_state(KEY, 1_234_567_890).unwrap();
        assert!(!state.contains('+'));
        assert!(!state.contains('/'));
        assert!(!state.contains('='));
    }

    #[test]
    fn test_state_expired() {
        let state = sign_state(KEY, 1_000).unwrap();
        assert!(!verify_state(&state, KEY, 1_001 + STATE_MAX_AGE_MS));
    }

    #[test]
    fn test_state_from_the_future_rejected() {
        let state = sign_state(KEY, 5_000).unwrap();
        assert!(!verify_state(&state, KEY, 4_000));
    }

    #[test]
    fn test_state_wrong_key() {
        let state = sign_state(KEY, 1_000).unwrap();
        assert!(!verify_state(&state, b"wrong_key", 1_000));
    }

    #[test]
    fn test_state_tampered_timestamp() {
        let state = sign_state(KEY, 1_000).unwrap();
        let decoded = String::from_utf8(URL_SAFE_NO_PAD.decode(&state).unwrap()).unwrap();
        let (_, sig) = decoded.split_once('|').unwrap();
        let forged = URL_SAFE_NO_PAD.encode(format!("{:x}|{}", 2_000u128, sig));

        assert!(!verify_state(&forged, KEY, 2_000));
    }

    #[test]
    fn test_state_malformed() {
        assert!(!verify_state("not-valid-base64!!!", KEY, 0));
        assert!(!verify_state(&URL_SAFE_NO_PAD.encode("no-separator"), KEY, 0));
        assert!(!verify_state(&URL_SAFE_NO_PAD.encode("3e8|zz"), KEY, 1_000));
    }
}
