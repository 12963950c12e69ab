//! QPay Gateway Client
//!
//! Business operations against the gateway REST API. Every call fetches a
//! bearer token from the [`GatewayAuthenticator`] first, which only hits the
//! network when the cached token is missing or stale.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use serde_json::{Value, json};

use crate::auth::GatewayAuthenticator;
use crate::clock::{Clock, SystemClock};
use crate::config::Credentials;
use crate::error::Result;
use crate::model::{JsonMap, PaymentCheckResult};

/// Invoice creation endpoint
pub const INVOICE_PATH: &str = "/v2/invoice";

/// Payment check endpoint
pub const PAYMENT_CHECK_PATH: &str = "/v2/payment/check";

/// Payment gateway operations used by checkout and callback handlers
///
/// `Ok(None)` means the gateway answered with something that is not a JSON
/// object: the outcome is unknown, not failed.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open an invoice; `data` is passed through untouched
    async fn create_invoice(&self, data: &JsonMap) -> Result<Option<JsonMap>>;

    /// Look up payments made against an invoice
    async fn check_payment(&self, invoice_id: &str) -> Result<Option<JsonMap>>;

    /// Typed view of [`PaymentGateway::check_payment`]
    async fn check_payment_status(&self, invoice_id: &str) -> Result<Option<PaymentCheckResult>> {
        Ok(self
            .check_payment(invoice_id)
            .await?
            .as_ref()
            .map(PaymentCheckResult::from_map))
    }
}

/// Builder for [`GatewayClient`]
pub struct GatewayClientBuilder {
    credentials: Credentials,
    http: Option<reqwest::Client>,
    clock: Option<Arc<dyn Clock>>,
}

impl GatewayClientBuilder {
    /// Override the underlying reqwest client (timeouts, proxies, TLS)
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = Some(client);
        self
    }

    /// Override the clock used for token expiry
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> GatewayClient {
        let credentials = Arc::new(self.credentials);
        let http = self.http.unwrap_or_default();
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        GatewayClient {
            auth: GatewayAuthenticator::new(credentials.clone(), http.clone(), clock),
            credentials,
            http,
        }
    }
}

/// QPay REST client
pub struct GatewayClient {
    credentials: Arc<Credentials>,
    http: reqwest::Client,
    auth: GatewayAuthenticator,
}

impl GatewayClient {
    pub fn builder(credentials: Credentials) -> GatewayClientBuilder {
        GatewayClientBuilder {
            credentials,
            http: None,
            clock: None,
        }
    }

    /// Create a client with a default HTTP client and the system clock
    pub fn new(credentials: Credentials) -> Self {
        Self::builder(credentials).build()
    }

    /// Token cache backing this client
    pub fn authenticator(&self) -> &GatewayAuthenticator {
        &self.auth
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// POST carrying `Bearer {token}`, sent as-is even when the token is empty
    fn authorized_post(&self, url: &str, token: &str) -> reqwest::RequestBuilder {
        self.http
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(CONTENT_TYPE, "application/json")
    }

    /// Authenticated JSON POST; the response body is decoded leniently
    async fn post_json<B>(&self, path: &str, body: &B) -> Result<Option<JsonMap>>
    where
        B: Serialize + ?Sized,
    {
        let token = self.auth.get_token().await;
        let url = self.credentials.endpoint(path);

        let response = self
            .authorized_post(&url, &token)
            .body(serde_json::to_vec(body)?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = %status, "Gateway returned non-success status");
        }

        let text = response.text().await?;
        Ok(decode_object(&text))
    }
}

/// Decode a JSON object, `None` for anything else
fn decode_object(text: &str) -> Option<JsonMap> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map),
        Ok(other) => {
            tracing::warn!(kind = json_kind(&other), "Gateway response is not a JSON object");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "Gateway response is not valid JSON");
            None
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[async_trait]
impl PaymentGateway for GatewayClient {
    async fn create_invoice(&self, data: &JsonMap) -> Result<Option<JsonMap>> {
        tracing::info!("Creating gateway invoice");
        self.post_json(INVOICE_PATH, data).await
    }

    async fn check_payment(&self, invoice_id: &str) -> Result<Option<JsonMap>> {
        tracing::info!(invoice_id = %invoice_id, "Checking invoice payment");

        let body = json!({
            "object_type": "INVOICE",
            "object_id": invoice_id,
        });
        self.post_json(PAYMENT_CHECK_PATH, &body).await
    }
}
