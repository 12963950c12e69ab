//! Gateway Data Model
//!
//! Invoice payloads travel as opaque JSON objects. The typed views here are
//! conveniences layered on top; they never reject a response the gateway
//! sends.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::CheckoutSettings;
use crate::error::Result;

/// Opaque JSON object exchanged with the gateway
pub type JsonMap = serde_json::Map<String, Value>;

/// Invoice creation payload
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRequest {
    /// Merchant invoice template code
    pub invoice_code: String,

    /// Merchant-side unique invoice number
    pub sender_invoice_no: String,

    /// Payer reference shown in the banking app
    pub invoice_receiver_code: String,

    pub invoice_description: String,

    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
}

impl InvoiceRequest {
    /// New invoice with a generated `sender_invoice_no`
    pub fn new(invoice_code: impl Into<String>, amount: Decimal) -> Self {
        Self {
            invoice_code: invoice_code.into(),
            sender_invoice_no: uuid::Uuid::new_v4().simple().to_string(),
            invoice_receiver_code: "terminal".into(),
            invoice_description: String::new(),
            amount,
            callback_url: None,
        }
    }

    /// Start from the merchant's checkout settings
    pub fn for_checkout(settings: &CheckoutSettings, amount: Decimal) -> Self {
        Self {
            callback_url: settings.callback_url.clone(),
            ..Self::new(settings.invoice_code.clone(), amount)
        }
    }

    pub fn sender_invoice_no(mut self, no: impl Into<String>) -> Self {
        self.sender_invoice_no = no.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.invoice_description = description.into();
        self
    }

    pub fn receiver_code(mut self, code: impl Into<String>) -> Self {
        self.invoice_receiver_code = code.into();
        self
    }

    /// Encode as the JSON object sent to `/v2/invoice`
    pub fn to_map(&self) -> Result<JsonMap> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Ok(JsonMap::new()),
        }
    }
}

/// One payment against an invoice
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentRow {
    #[serde(default)]
    pub payment_id: String,

    #[serde(default)]
    pub payment_status: String,

    #[serde(default)]
    pub payment_amount: Decimal,

    /// Fields we do not interpret (currency, wallet, dates, ...)
    #[serde(flatten)]
    pub extra: JsonMap,
}

/// Typed view of a `/v2/payment/check` response
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentCheckResult {
    #[serde(default)]
    pub count: u64,

    #[serde(default)]
    pub paid_amount: Decimal,

    #[serde(default)]
    pub rows: Vec<PaymentRow>,
}

impl PaymentCheckResult {
    /// Read a raw check response field by field.
    ///
    /// Never fails: mistyped fields fall back to their defaults, and every
    /// element of `rows` yields a row, so `rows.len()` matches the raw array.
    pub fn from_map(map: &JsonMap) -> Self {
        let rows = map
            .get("rows")
            .and_then(Value::as_array)
            .map(|rows| rows.iter().map(PaymentRow::from_value).collect())
            .unwrap_or_default();

        Self {
            count: map.get("count").and_then(lenient_u64).unwrap_or_default(),
            paid_amount: map.get("paid_amount").and_then(lenient_decimal).unwrap_or_default(),
            rows,
        }
    }

    /// An invoice counts as paid as soon as any payment row exists
    pub fn is_paid(&self) -> bool {
        !self.rows.is_empty()
    }

    pub fn status(&self) -> PaymentStatus {
        if self.is_paid() {
            PaymentStatus::Paid
        } else {
            PaymentStatus::Unpaid
        }
    }
}

impl PaymentRow {
    fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::default();
        };

        let mut extra = map.clone();
        let payment_id = extra.remove("payment_id");
        let payment_status = extra.remove("payment_status");
        let payment_amount = extra.remove("payment_amount");

        Self {
            payment_id: payment_id.as_ref().and_then(lenient_string).unwrap_or_default(),
            payment_status: payment_status.as_ref().and_then(lenient_string).unwrap_or_default(),
            payment_amount: payment_amount.as_ref().and_then(lenient_decimal).unwrap_or_default(),
            extra,
        }
    }
}

fn lenient_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn lenient_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_decimal(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    text.parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Payment state reported to callback callers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
}

impl PaymentStatus {
    /// Derive the status from a raw check response; an unknown result
    /// (`None`) is unpaid.
    pub fn from_check(response: Option<&JsonMap>) -> Self {
        response.map_or(Self::Unpaid, |map| PaymentCheckResult::from_map(map).status())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::Unpaid => "unpaid",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn as_map(value: Value) -> JsonMap {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_invoice_request_encodes_amount_as_number() {
        let settings = CheckoutSettings {
            invoice_code: "TEST_INVOICE".into(),
            callback_url: Some("https://example.com/callback".into()),
        };

        let map = InvoiceRequest::for_checkout(&settings, dec!(5000))
            .sender_invoice_no("order-42")
            .description("Order #42")
            .to_map()
            .unwrap();

        assert_eq!(map["invoice_code"], "TEST_INVOICE");
        assert_eq!(map["sender_invoice_no"], "order-42");
        assert_eq!(map["amount"], json!(5000.0));
        assert_eq!(map["callback_url"], "https://example.com/callback");
    }

    #[test]
    fn test_invoice_numbers_are_unique() {
        let a = InvoiceRequest::new("CODE", dec!(1));
        let b = InvoiceRequest::new("CODE", dec!(1));
        assert_ne!(a.sender_invoice_no, b.sender_invoice_no);
        assert!(!a.to_map().unwrap().contains_key("callback_url"));
    }

    #[test]
    fn test_paid_check_result() {
        let map = as_map(json!({
            "count": 1,
            "paid_amount": 5000.0,
            "rows": [
                {"payment_id": "pay_1", "payment_status": "PAID", "payment_amount": 5000.0, "payment_currency": "MNT"}
            ]
        }));

        let result = PaymentCheckResult::from_map(&map);
        assert_eq!(result.count, 1);
        assert_eq!(result.paid_amount, dec!(5000));
        assert_eq!(result.rows[0].payment_status, "PAID");
        assert_eq!(result.rows[0].extra["payment_currency"], "MNT");
        assert!(result.is_paid());
        assert_eq!(PaymentStatus::from_check(Some(&map)), PaymentStatus::Paid);
    }

    #[test]
    fn test_unpaid_when_no_rows() {
        let map = as_map(json!({"count": 0, "paid_amount": 0, "rows": []}));

        let result = PaymentCheckResult::from_map(&map);
        assert!(!result.is_paid());
        assert_eq!(result.status(), PaymentStatus::Unpaid);
        assert_eq!(PaymentStatus::from_check(Some(&map)), PaymentStatus::Unpaid);
    }

    #[test]
    fn test_unknown_result_is_unpaid() {
        assert_eq!(PaymentStatus::from_check(None), PaymentStatus::Unpaid);
        assert_eq!(
            PaymentStatus::from_check(Some(&as_map(json!({"count": 0})))),
            PaymentStatus::Unpaid
        );
        assert_eq!(PaymentCheckResult::from_map(&JsonMap::new()), PaymentCheckResult::default());
    }

    #[test]
    fn test_mistyped_rows_agree_with_status() {
        let map = as_map(json!({
            "count": "2",
            "paid_amount": "1500.50",
            "rows": [
                {"payment_id": 981_234, "payment_status": "PAID", "payment_amount": "1000.5"},
                {"payment_id": null, "payment_amount": true},
                "garbage"
            ]
        }));

        let result = PaymentCheckResult::from_map(&map);
        assert_eq!(result.count, 2);
        assert_eq!(result.paid_amount, dec!(1500.50));
        assert_eq!(result.rows.len(), 3);
        assert_eq!(result.rows[0].payment_id, "981234");
        assert_eq!(result.rows[0].payment_amount, dec!(1000.5));
        assert_eq!(result.rows[1], PaymentRow::default());
        assert_eq!(result.rows[2], PaymentRow::default());

        assert!(result.is_paid());
        assert_eq!(PaymentStatus::from_check(Some(&map)), result.status());
    }

    #[test]
    fn test_non_array_rows_is_unpaid() {
        let map = as_map(json!({"count": 1, "rows": {"payment_id": "pay_1"}}));

        let result = PaymentCheckResult::from_map(&map);
        assert!(result.rows.is_empty());
        assert_eq!(PaymentStatus::from_check(Some(&map)), PaymentStatus::Unpaid);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(serde_json::to_value(PaymentStatus::Paid).unwrap(), json!("paid"));
        assert_eq!(PaymentStatus::Unpaid.to_string(), "unpaid");
    }
}
