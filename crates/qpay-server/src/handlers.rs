//! HTTP Handlers

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use qpay_payments::{CallbackHandler, CallbackResponse, InvoiceRequest, JsonMap, PaymentMethod};

use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct StartPaymentRequest {
    pub amount: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>, code: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        payment_method: PaymentMethod::QPAY,
    })
}

/// Open a gateway invoice for a checkout
pub async fn start_payment(
    State(state): State<AppState>,
    Json(payload): Json<StartPaymentRequest>,
) -> Result<Json<JsonMap>, ApiError> {
    if payload.amount <= Decimal::ZERO {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Amount must be positive",
            "INVALID_AMOUNT",
        ));
    }

    let mut request = InvoiceRequest::for_checkout(&state.settings, payload.amount);
    if let Some(order_id) = payload.order_id {
        request = request.sender_invoice_no(order_id);
    }
    let description = payload
        .description
        .unwrap_or_else(|| format!("Order {}", request.sender_invoice_no));
    let request = request.description(description);

    let data = request.to_map().map_err(|e| {
        tracing::error!("Invoice encoding error: {}", e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, e.user_message(), "ENCODING_ERROR")
    })?;

    let invoice = state.gateway.create_invoice(&data).await.map_err(|e| {
        tracing::error!("Invoice creation error: {}", e);
        api_error(StatusCode::BAD_GATEWAY, e.user_message(), "GATEWAY_ERROR")
    })?;

    let invoice = invoice.ok_or_else(|| {
        tracing::warn!(
            sender_invoice_no = %request.sender_invoice_no,
            "Gateway returned an unreadable invoice response"
        );
        api_error(
            StatusCode::BAD_GATEWAY,
            "Invoice status unknown. Please check again shortly.",
            "INVOICE_UNKNOWN",
        )
    })?;

    Ok(Json(invoice))
}

/// Payment status callback. Always answers 200.
pub async fn payment_callback(State(state): State<AppState>, body: Bytes) -> Json<CallbackResponse> {
    let body = String::from_utf8_lossy(&body);
    let handler = CallbackHandler::new(state.gateway.clone());

    Json(handler.handle(&body).await)
}
