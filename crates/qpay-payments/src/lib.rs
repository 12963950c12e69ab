//! # qpay-payments
//!
//! Client for the QPay merchant REST API.
//!
//! ## Flow
//!
//! ```text
//! ┌────────────┐  create_invoice  ┌───────────────┐  POST /v2/invoice        ┌──────────┐
//! │  Checkout  │─────────────────▶│               │─────────────────────────▶│          │
//! └────────────┘                  │ GatewayClient │                          │   QPay   │
//! ┌────────────┐  check_payment   │               │  POST /v2/payment/check  │          │
//! │  Callback  │─────────────────▶│               │─────────────────────────▶│          │
//! └────────────┘                  └───────┬───────┘                          └──────────┘
//!                                         │ get_token (cached)                    ▲
//!                                 ┌───────▼─────────────┐  POST /v2/auth/token    │
//!                                 │ GatewayAuthenticator│─────────────────────────┘
//!                                 └─────────────────────┘
//! ```
//!
//! The bearer token is fetched with the merchant's Basic-Auth credentials on
//! first use and reused until 30 seconds before the gateway says it expires.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use qpay_payments::{Credentials, GatewayClient, PaymentGateway, PaymentStatus};
//!
//! let client = GatewayClient::new(Credentials::new(
//!     "https://merchant.qpay.mn",
//!     "merchant_user",
//!     "merchant_pass",
//! ));
//!
//! let invoice = InvoiceRequest::new("MERCHANT_INVOICE", dec!(5000)).to_map()?;
//! let created = client.create_invoice(&invoice).await?;
//!
//! let check = client.check_payment("inv_123").await?;
//! let status = PaymentStatus::from_check(check.as_ref());
//! ```

mod auth;
mod callback;
mod client;
mod clock;
mod config;
mod error;
mod method;
mod model;

pub use auth::{GatewayAuthenticator, TokenState};
pub use callback::{CallbackHandler, CallbackResponse};
pub use client::{GatewayClient, GatewayClientBuilder, PaymentGateway};
pub use clock::{Clock, MockClock, SystemClock};
pub use config::{CheckoutSettings, ConfigStore, Credentials, EnvConfigStore, MemoryConfigStore};
pub use error::{PaymentError, Result};
pub use method::PaymentMethod;
pub use model::{InvoiceRequest, JsonMap, PaymentCheckResult, PaymentRow, PaymentStatus};
