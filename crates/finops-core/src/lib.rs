//! # FinOps Core
//!
//! Shared types for the FinOps scenario testkit.
//!
//! The testkit drives HTTP requests against a financial-operations service
//! (payment methods and transactions) and asserts on response contents. This
//! crate holds the pieces every other member needs: the error enum, the
//! per-scenario state store, the typed payload envelopes, and the endpoint
//! constants of the service under test.

pub mod error;
pub mod model;
pub mod state;

pub use error::{FinopsError, Result};
pub use model::{
    PaymentMethod, PaymentMethodEnvelope, PaymentMethodRef, SignatureData, Transaction,
    TransactionEnvelope,
};
pub use state::{keys, ScenarioState};

/// Current testkit version for compatibility checks
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Testkit build information for telemetry and debugging
pub const BUILD_INFO: &str = concat!(
    "FinOps Testkit ",
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("CARGO_PKG_NAME"),
    ")"
);

/// Endpoints of the financial-operations service
pub mod endpoints {
    pub const HEALTH: &str = "/health";
    pub const API_V1_PAYMENT_METHODS: &str = "/api/v1/payment-methods";
    pub const API_V1_TRANSACTIONS: &str = "/api/v1/transactions";
}

/// Inclusive transaction amount limits enforced by the service
pub mod limits {
    pub const MIN_AMOUNT: f64 = 0.0;
    pub const MAX_AMOUNT: f64 = 999_999.99;
}
