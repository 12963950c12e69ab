//! QPay Payment Server
//!
//! Axum-based service that opens QPay invoices for checkouts and answers
//! payment-status callbacks.

mod handlers;
mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use qpay_payments::{CheckoutSettings, Credentials, EnvConfigStore, GatewayClient};

use crate::handlers::{health_check, payment_callback, start_payment};
use crate::state::AppState;

/// Transport timeout for gateway calls when `QPAY_HTTP_TIMEOUT_SECS` is unset
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Build the application router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/qpay/payment/start", post(start_payment))
        .route("/qpay/payment/callback", post(payment_callback))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store = EnvConfigStore;
    let credentials = Credentials::from_store(&store)?;
    let settings = CheckoutSettings::from_store(&store)?;

    let timeout = std::env::var("QPAY_HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout))
        .build()?;

    tracing::info!(base_url = %credentials.base_url, timeout_secs = timeout, "QPay gateway configured");
    if settings.callback_url.is_none() {
        tracing::warn!("payment/qpay/callback_url not set - gateway will not notify this server");
    }

    let gateway = GatewayClient::builder(credentials).with_http_client(http).build();

    let state = AppState {
        gateway: Arc::new(gateway),
        settings: Arc::new(settings),
    };

    let app = router(state);

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("qpay-server running on http://{}", addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health                 - Health check");
    tracing::info!("  POST /qpay/payment/start     - Create QPay invoice");
    tracing::info!("  POST /qpay/payment/callback  - Payment status callback");

    axum::serve(listener, app).await?;

    Ok(())
}
