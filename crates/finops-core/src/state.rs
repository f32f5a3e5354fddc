//! Per-scenario state store
//!
//! One `ScenarioState` lives for exactly one scenario: created at scenario
//! start, discarded at scenario end. It maps logical payload names to JSON
//! values and remembers the status code of the last gateway call. Nothing is
//! shared across scenarios.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::{FinopsError, Result};

/// Logical storage names used by the scenario runner
pub mod keys {
    pub const PAYMENT_METHOD: &str = "payment_method";
    pub const TRANSACTION_PAYMENT: &str = "transaction_payment";
    pub const JSON_RESPONSE: &str = "json_response";
}

#[derive(Debug, Default)]
pub struct ScenarioState {
    storage: HashMap<String, Value>,
    last_status: Option<u16>,
}

impl ScenarioState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a payload under a logical name, replacing any previous value.
    pub fn put(&mut self, name: &str, payload: Value) {
        self.storage.insert(name.to_string(), payload);
    }

    /// Fetch a stored payload, failing if the name was never stored.
    pub fn get(&self, name: &str) -> Result<&Value> {
        self.storage
            .get(name)
            .ok_or_else(|| FinopsError::PayloadNotStored {
                name: name.to_string(),
            })
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut Value> {
        self.storage
            .get_mut(name)
            .ok_or_else(|| FinopsError::PayloadNotStored {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.storage.contains_key(name)
    }

    /// Resolve a dotted path inside a stored payload.
    ///
    /// `lookup("payment_method", "paymentMethod.signatureData.bankLogoData")`
    /// walks object keys only; any missing segment fails with the full path
    /// in the error.
    pub fn lookup(&self, name: &str, path: &str) -> Result<&Value> {
        lookup_path(self.get(name)?, path)
    }

    pub fn set_last_status(&mut self, status: u16) {
        self.last_status = Some(status);
    }

    pub fn last_status(&self) -> Option<u16> {
        self.last_status
    }

    /// Assert the last gateway call returned the expected status code.
    pub fn expect_status(&self, expected: u16) -> Result<()> {
        match self.last_status {
            Some(actual) if actual == expected => Ok(()),
            Some(actual) => Err(FinopsError::AssertionFailed {
                reason: format!("expected HTTP {expected}, got HTTP {actual}"),
            }),
            None => Err(FinopsError::AssertionFailed {
                reason: format!("expected HTTP {expected}, but no request was sent"),
            }),
        }
    }
}

/// Walk a dotted path through nested JSON objects.
pub fn lookup_path<'a>(root: &'a Value, path: &str) -> Result<&'a Value> {
    let mut current = root;
    for segment in path.split('.') {
        current = current
            .get(segment)
            .ok_or_else(|| FinopsError::MissingField {
                path: path.to_string(),
            })?;
    }
    Ok(current)
}
