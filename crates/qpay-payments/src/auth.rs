//! Gateway Authentication
//!
//! Exchanges the merchant's Basic-Auth credentials for a bearer token and
//! caches it until shortly before the gateway says it expires.
//!
//! The exchange never fails from the caller's point of view. A transport
//! error, an undecodable body and a body without `access_token` all produce
//! an empty token, and business calls then go out with `Bearer ` and let the
//! gateway reject them.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Duration, Utc};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::clock::Clock;
use crate::config::Credentials;

/// Token exchange endpoint
pub const TOKEN_PATH: &str = "/v2/auth/token";

/// Lifetime assumed when the gateway omits `expires_in`
pub const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// Tokens are dropped this long before the gateway-reported expiry
pub const EXPIRY_MARGIN_SECS: i64 = 30;

/// A cached bearer token. Replaced wholesale on every refresh.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenState {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl TokenState {
    /// Build the cache entry from a token-exchange response body
    pub fn from_body(body: &str, now: DateTime<Utc>) -> Self {
        let data: Value = serde_json::from_str(body).unwrap_or(Value::Null);

        let access_token = data
            .get("access_token")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let expires_in = data
            .get("expires_in")
            .and_then(Value::as_i64)
            .unwrap_or(DEFAULT_EXPIRES_IN_SECS);

        Self {
            access_token,
            expires_at: expiry(now, expires_in),
        }
    }

    /// Usable for a business call at `now`. An empty token never is.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.access_token.is_empty() && now < self.expires_at
    }
}

/// `now + expires_in - margin`, saturating at chrono's representable range.
///
/// No lower clamp: a tiny `expires_in` puts the expiry in the past.
fn expiry(now: DateTime<Utc>, expires_in: i64) -> DateTime<Utc> {
    let lifetime = expires_in.saturating_sub(EXPIRY_MARGIN_SECS);

    Duration::try_seconds(lifetime)
        .and_then(|d| now.checked_add_signed(d))
        .unwrap_or(if lifetime > 0 {
            DateTime::<Utc>::MAX_UTC
        } else {
            DateTime::<Utc>::MIN_UTC
        })
}

/// Obtains and caches the gateway bearer token
pub struct GatewayAuthenticator {
    credentials: Arc<Credentials>,
    http: reqwest::Client,
    clock: Arc<dyn Clock>,
    // Held across the exchange so concurrent callers share one fetch.
    state: Mutex<Option<TokenState>>,
}

impl GatewayAuthenticator {
    pub fn new(credentials: Arc<Credentials>, http: reqwest::Client, clock: Arc<dyn Clock>) -> Self {
        Self {
            credentials,
            http,
            clock,
            state: Mutex::new(None),
        }
    }

    /// Return a bearer token, fetching a new one if the cache is empty or stale.
    ///
    /// Issues at most one HTTP request per call and none on a cache hit.
    pub async fn get_token(&self) -> String {
        let mut state = self.state.lock().await;

        if let Some(token) = state.as_ref().filter(|t| t.is_valid_at(self.clock.now())) {
            tracing::debug!(expires_at = %token.expires_at, "Reusing cached gateway token");
            return token.access_token.clone();
        }

        let body = self.exchange().await;
        let fresh = TokenState::from_body(&body, self.clock.now());

        if fresh.access_token.is_empty() {
            tracing::warn!("Gateway token exchange returned no access_token");
        } else {
            tracing::info!(expires_at = %fresh.expires_at, "Obtained gateway token");
        }

        let token = fresh.access_token.clone();
        *state = Some(fresh);
        token
    }

    /// Snapshot of the cached token, if any
    pub async fn cached(&self) -> Option<TokenState> {
        self.state.lock().await.clone()
    }

    /// Forget the cached token; the next call refetches
    pub async fn invalidate(&self) {
        self.state.lock().await.take();
    }

    fn basic_auth(&self) -> String {
        let pair = format!("{}:{}", self.credentials.username, self.credentials.password);
        format!("Basic {}", STANDARD.encode(pair))
    }

    /// POST the token exchange and return the raw body, empty on failure
    async fn exchange(&self) -> String {
        let url = self.credentials.endpoint(TOKEN_PATH);

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, self.basic_auth())
            .header(CONTENT_TYPE, "application/json")
            .body("")
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Gateway token exchange failed");
                return String::new();
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "Gateway token exchange returned non-success status");
        }

        response.text().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to read gateway token response");
            String::new()
        })
    }
}
