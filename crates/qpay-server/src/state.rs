//! Application State

use std::sync::Arc;

use qpay_payments::{CheckoutSettings, PaymentGateway};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Gateway client, shared so all handlers reuse one token cache
    pub gateway: Arc<dyn PaymentGateway>,

    /// Merchant invoice settings
    pub settings: Arc<CheckoutSettings>,
}
