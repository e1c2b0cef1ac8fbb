// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth token issued by Strava's token endpoint.

use serde::Deserialize;

/// Access/refresh token pair with its lifetime.
///
/// Other fields in the provider response (`token_type`, `expires_at`,
/// `athlete`) are ignored.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct OAuthToken {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    /// Seconds until the access token expires
    pub expires_in: i64,
}

// Keep secrets out of logs.
impl std::fmt::Debug for OAuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthToken")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}
