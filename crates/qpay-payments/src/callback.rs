//! Payment Callback Handling
//!
//! The gateway (or the checkout page, polling) posts `{"invoice_id": "..."}`
//! and gets back whether that invoice has been paid. Callers always get an
//! answer: a missing id is reported in the payload, and an unknown or failed
//! check reads as unpaid.
//!
//! Nothing here authenticates the caller; anyone who can reach the endpoint
//! can ask about any invoice id.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::PaymentGateway;
use crate::model::PaymentStatus;

/// Reply sent back to the callback caller
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CallbackResponse {
    Status { status: PaymentStatus },
    Error { error: String },
}

impl CallbackResponse {
    pub fn missing_invoice_id() -> Self {
        Self::Error {
            error: "Missing invoice_id".into(),
        }
    }

    pub fn status(status: PaymentStatus) -> Self {
        Self::Status { status }
    }
}

/// Callback handler
pub struct CallbackHandler<G: PaymentGateway + ?Sized> {
    gateway: Arc<G>,
}

impl<G: PaymentGateway + ?Sized> CallbackHandler<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Extract a non-empty string `invoice_id` from a raw request body
    pub fn invoice_id(body: &str) -> Option<String> {
        let data: Value = serde_json::from_str(body).ok()?;
        data.get("invoice_id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
    }

    /// Process a raw callback body
    pub async fn handle(&self, body: &str) -> CallbackResponse {
        let Some(invoice_id) = Self::invoice_id(body) else {
            tracing::debug!("Callback without invoice_id");
            return CallbackResponse::missing_invoice_id();
        };

        let status = match self.gateway.check_payment(&invoice_id).await {
            Ok(check) => PaymentStatus::from_check(check.as_ref()),
            Err(e) => {
                tracing::error!(invoice_id = %invoice_id, error = %e, "Payment check failed");
                PaymentStatus::Unpaid
            }
        };

        tracing::info!(invoice_id = %invoice_id, status = %status, "Payment callback processed");
        CallbackResponse::status(status)
    }
}
