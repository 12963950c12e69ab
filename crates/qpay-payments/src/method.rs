//! Payment method descriptor advertised to the checkout

use serde::Serialize;

/// Capabilities of a payment method
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PaymentMethod {
    pub code: &'static str,
    pub is_offline: bool,
    pub can_capture: bool,
    pub can_refund: bool,
}

impl PaymentMethod {
    /// QPay: settled online, captured through the gateway, no refunds
    pub const QPAY: Self = Self {
        code: "qpay",
        is_offline: false,
        can_capture: true,
        can_refund: false,
    };
}
