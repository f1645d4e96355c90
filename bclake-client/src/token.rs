//! OAuth2 client-credentials token acquisition and caching.

use crate::config::ClientConfig;
use crate::endpoints::Endpoints;
use crate::error::{ClientError, ClientResult};
use bclake_types::ConnectionConfig;
use chrono::{DateTime, TimeDelta, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Seconds shaved off the server-reported lifetime of every token.
pub const TOKEN_SAFETY_MARGIN_SECS: i64 = 300;

/// A bearer token and the instant it stops being used.
///
/// `expires_at` already has the safety margin applied.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    /// Builds a token from a grant response received at `issued_at`.
    ///
    /// Usable for `expires_in - 300` seconds; when `expires_in <= 300` the
    /// token is already expired, which simply forces a refresh on next use.
    pub fn issued(value: impl Into<String>, expires_in_secs: u64, issued_at: DateTime<Utc>) -> Self {
        let lifetime = i64::try_from(expires_in_secs)
            .unwrap_or(i64::MAX)
            .saturating_sub(TOKEN_SAFETY_MARGIN_SECS);
        let expires_at = TimeDelta::try_seconds(lifetime)
            .and_then(|d| issued_at.checked_add_signed(d))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self::new(value, expires_at)
    }

    /// The raw bearer string.
    pub fn secret(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Obtains and caches a client-credentials token for one connection.
///
/// One manager per `ConnectionConfig`; share it by reference or `Arc`. The
/// cache lock is held across a refresh so concurrent callers wait for a
/// single grant instead of racing.
pub struct TokenManager {
    http: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    scope: String,
    cached: Mutex<Option<AccessToken>>,
}

impl TokenManager {
    pub fn new(http: Client, connection: &ConnectionConfig, config: &ClientConfig) -> Self {
        Self {
            http,
            token_url: Endpoints::new(connection, config).token().to_string(),
            client_id: connection.client_id.clone(),
            client_secret: connection.client_secret.clone(),
            scope: config.scope.clone(),
            cached: Mutex::new(None),
        }
    }

    /// Returns the cached token while it is valid, otherwise requests a new one.
    ///
    /// A failed grant leaves the cache untouched.
    pub async fn get_token(&self) -> ClientResult<AccessToken> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref().filter(|t| t.is_valid()) {
            return Ok(token.clone());
        }

        let token = self.request_token().await?;
        *cached = Some(token.clone());
        Ok(token)
    }

    /// Currently cached token, valid or not.
    pub async fn cached_token(&self) -> Option<AccessToken> {
        self.cached.lock().await.clone()
    }

    /// Drops the cached token so the next call performs a fresh grant.
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }

    async fn request_token(&self) -> ClientResult<AccessToken> {
        debug!(url = %self.token_url, client_id = %self.client_id, "Requesting access token");

        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("scope", self.scope.as_str()),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Auth { status, body });
        }

        let grant: TokenResponse = response.json().await?;
        let token = AccessToken::issued(grant.access_token, grant.expires_in, Utc::now());

        info!(
            expires_in = grant.expires_in,
            usable_until = %token.expires_at(),
            "Obtained access token"
        );
        Ok(token)
    }
}
