// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Minimum token lifetime (seconds) before a token is considered too short-lived.
pub const MIN_TOKEN_LIFETIME_SECS: i64 = 60;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Network or connection failure talking to Strava.
    #[error("Strava transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Strava answered with a non-2xx status.
    #[error("Strava returned HTTP {status}")]
    Remote { status: u16, body: String },

    /// Strava answered with a body we could not decode.
    #[error("Failed to decode Strava response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Client-credentials token expires too soon to be useful.
    #[error("Token will expire in {expires_in}s (minimum {}s)", MIN_TOKEN_LIFETIME_SECS)]
    TokenLifetime { expires_in: i64 },

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Status code reported by Strava, if this is a remote error.
    pub fn remote_status(&self) -> Option<u16> {
        match self {
            AppError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Transport(err) => {
                tracing::error!(error = %err, "Strava request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "strava_unreachable", None)
            }
            AppError::Remote { status, body } => {
                tracing::error!(status, body = %body, "Strava returned an error");
                (StatusCode::INTERNAL_SERVER_ERROR, "strava_error", None)
            }
            AppError::Decode(err) => {
                tracing::error!(error = %err, "Strava response could not be decoded");
                (StatusCode::INTERNAL_SERVER_ERROR, "strava_error", None)
            }
            AppError::TokenLifetime { expires_in } => {
                tracing::error!(expires_in, "Strava token lifetime too short");
                (StatusCode::INTERNAL_SERVER_ERROR, "token_lifetime", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
