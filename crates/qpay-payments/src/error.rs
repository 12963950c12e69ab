//! Payment Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Gateway-related errors
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Transport failure talking to the gateway
    #[error("Gateway request failed: {0}")]
    Gateway(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PaymentError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, PaymentError::Gateway(_))
    }

    /// Get user-friendly message
    pub fn user_message(&self) -> &str {
        match self {
            PaymentError::Gateway(_) => "Payment gateway is unreachable. Please try again.",
            PaymentError::Config(_) => "Service configuration error.",
            PaymentError::Serialization(_) => "An error occurred processing your request.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_is_not_retryable() {
        let err = PaymentError::Config("payment/qpay/base_url not set".into());
        assert!(!err.is_retryable());
        assert_eq!(err.user_message(), "Service configuration error.");
        assert!(err.to_string().contains("payment/qpay/base_url"));
    }
}
