//! Error types for the FinOps scenario testkit

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FinopsError>;

#[derive(Error, Debug)]
pub enum FinopsError {
    #[error("Missing field: {path}")]
    MissingField { path: String },

    #[error("Assertion failed: {reason}")]
    AssertionFailed { reason: String },

    #[error("Fixture not found: {entity} ({category}/{variant})")]
    FixtureVariantNotFound {
        entity: String,
        category: String,
        variant: String,
    },

    #[error("Failed to read fixture {entity}: {reason}")]
    FixtureUnreadable { entity: String, reason: String },

    #[error("No payload stored under '{name}'")]
    PayloadNotStored { name: String },

    #[error("Gateway request failed: {reason}")]
    GatewayError { reason: String },

    #[error("Serialization error: {source}")]
    SerializationError {
        #[from]
        source: serde_json::Error,
    },
}

impl FinopsError {
    /// Missing-field and missing-payload lookups; everything else is an
    /// assertion or infrastructure failure.
    pub fn is_missing_field(&self) -> bool {
        matches!(
            self,
            Self::MissingField { .. } | Self::PayloadNotStored { .. }
        )
    }
}
