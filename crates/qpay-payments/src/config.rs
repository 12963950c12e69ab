//! Gateway Configuration
//!
//! Settings live under the `payment/qpay/*` namespace of a configuration
//! store. The server reads them from the environment; tests use an in-memory
//! store.

use std::collections::HashMap;
use std::fmt;

use crate::error::{PaymentError, Result};

/// Namespace prefix for all gateway settings
pub const CONFIG_PREFIX: &str = "payment/qpay/";

/// Key/value configuration source
pub trait ConfigStore: Send + Sync {
    /// Look up a value by its full path, e.g. `payment/qpay/base_url`
    fn get_value(&self, path: &str) -> Option<String>;
}

/// Reads `payment/qpay/base_url` from `PAYMENT_QPAY_BASE_URL`, and so on.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvConfigStore;

impl EnvConfigStore {
    /// Environment variable name for a config path
    pub fn env_key(path: &str) -> String {
        path.replace(['/', '.', '-'], "_").to_uppercase()
    }
}

impl ConfigStore for EnvConfigStore {
    fn get_value(&self, path: &str) -> Option<String> {
        std::env::var(Self::env_key(path)).ok()
    }
}

/// In-memory config store
#[derive(Clone, Debug, Default)]
pub struct MemoryConfigStore {
    values: HashMap<String, String>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, builder style
    pub fn with(mut self, path: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(path.into(), value.into());
        self
    }
}

impl<K, V> FromIterator<(K, V)> for MemoryConfigStore
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get_value(&self, path: &str) -> Option<String> {
        self.values.get(path).cloned()
    }
}

fn field(store: &dyn ConfigStore, name: &str) -> Option<String> {
    store
        .get_value(&format!("{CONFIG_PREFIX}{name}"))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(store: &dyn ConfigStore, name: &str) -> Result<String> {
    field(store, name)
        .ok_or_else(|| PaymentError::Config(format!("{CONFIG_PREFIX}{name} not set")))
}

/// Gateway credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub base_url: String,
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Load `base_url`, `username` and `password` from a config store
    pub fn from_store(store: &dyn ConfigStore) -> Result<Self> {
        Ok(Self::new(
            required(store, "base_url")?,
            required(store, "username")?,
            required(store, "password")?,
        ))
    }

    /// Full URL for a gateway path such as `/v2/invoice`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Merchant settings used when opening invoices at checkout
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckoutSettings {
    /// Merchant invoice template code issued by QPay
    pub invoice_code: String,

    /// Where the gateway should notify us about payments
    pub callback_url: Option<String>,
}

impl CheckoutSettings {
    pub fn from_store(store: &dyn ConfigStore) -> Result<Self> {
        Ok(Self {
            invoice_code: required(store, "invoice_code")?,
            callback_url: field(store, "callback_url"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sandbox_store() -> MemoryConfigStore {
        [
            ("payment/qpay/base_url", "https://sandbox.qpay.mn/"),
            ("payment/qpay/username", "sandbox_user"),
            ("payment/qpay/password", "sandbox_pass"),
            ("payment/qpay/invoice_code", "TEST_INVOICE"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_credentials_from_store() {
        let creds = Credentials::from_store(&sandbox_store()).unwrap();

        assert_eq!(creds.base_url, "https://sandbox.qpay.mn");
        assert_eq!(creds.username, "sandbox_user");
        assert_eq!(creds.password, "sandbox_pass");
        assert_eq!(creds.endpoint("/v2/invoice"), "https://sandbox.qpay.mn/v2/invoice");
    }

    #[test]
    fn test_missing_password_is_config_error() {
        let store = MemoryConfigStore::new()
            .with("payment/qpay/base_url", "https://merchant.qpay.mn")
            .with("payment/qpay/username", "user")
            .with("payment/qpay/password", "  ");

        let err = Credentials::from_store(&store).unwrap_err();
        assert!(matches!(err, PaymentError::Config(ref msg) if msg.contains("password")));
    }

    #[test]
    fn test_debug_hides_password() {
        let creds = Credentials::new("https://merchant.qpay.mn", "user", "secret");
        let debug = format!("{creds:?}");

        assert!(!debug.contains("secret"));
        assert!(debug.contains("user"));
    }

    #[test]
    fn test_checkout_settings() {
        let settings = CheckoutSettings::from_store(&sandbox_store()).unwrap();
        assert_eq!(settings.invoice_code, "TEST_INVOICE");
        assert_eq!(settings.callback_url, None);

        let store = sandbox_store().with("payment/qpay/callback_url", "https://shop.example/qpay/payment/callback");
        let settings = CheckoutSettings::from_store(&store).unwrap();
        assert_eq!(
            settings.callback_url.as_deref(),
            Some("https://shop.example/qpay/payment/callback")
        );
    }

    #[test]
    fn test_env_key() {
        assert_eq!(
            EnvConfigStore::env_key("payment/qpay/base_url"),
            "PAYMENT_QPAY_BASE_URL"
        );
    }
}
