//! Typed payload envelopes
//!
//! The scenario runner mutates raw `serde_json::Value` payloads the way the
//! fixtures ship them; the stub service parses them through these envelopes
//! so it can validate structure. Unknown fields ride along in the flattened
//! maps so a fixture can carry more than the testkit knows about.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Signature images attached to a payment method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureData {
    pub signature1_data: String,
    pub signature2_data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_logo_data: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    /// Assigned by the service on creation; absent in requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_data: Option<SignatureData>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Request/response wrapper: `{"paymentMethod": {...}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodEnvelope {
    pub payment_method: PaymentMethod,
}

/// Weak reference to a previously created payment method.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_data: Option<SignatureData>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethodRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Request/response wrapper: `{"transaction": {...}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEnvelope {
    pub transaction: Transaction,
}
