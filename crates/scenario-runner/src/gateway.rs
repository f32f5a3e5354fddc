//! HTTP boundary
//!
//! The gateway submits a previously stored payload and writes the JSON
//! response and status code back into scenario state. It is a trait so the
//! runner's logic can be exercised against a scripted gateway in unit tests.

use async_trait::async_trait;
use finops_core::state::keys;
use finops_core::{endpoints, FinopsError, Result, ScenarioState};
use serde_json::Value;
use tracing::{info, instrument};

/// Where the request body comes from. Payloads are always staged in scenario
/// state before submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendMode {
    FromStorage,
}

#[async_trait]
pub trait RequestGateway {
    /// Submit `state.storage[payload_name]`, then populate
    /// `state.storage["json_response"]` and the last status code.
    async fn send(
        &self,
        state: &mut ScenarioState,
        payload_name: &str,
        mode: SendMode,
    ) -> Result<()>;
}

/// Gateway backed by a real HTTP client against a base URL.
#[derive(Debug, Clone)]
pub struct HttpRequestGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRequestGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// The remote API routes on payload shape: a top-level `paymentMethod`
    /// goes to the payment-methods endpoint, a top-level `transaction` to
    /// the transactions endpoint.
    fn route_for(payload: &Value) -> Result<&'static str> {
        if payload.get("paymentMethod").is_some() {
            Ok(endpoints::API_V1_PAYMENT_METHODS)
        } else if payload.get("transaction").is_some() {
            Ok(endpoints::API_V1_TRANSACTIONS)
        } else {
            Err(FinopsError::GatewayError {
                reason: "payload has neither 'paymentMethod' nor 'transaction'".to_string(),
            })
        }
    }
}

#[async_trait]
impl RequestGateway for HttpRequestGateway {
    #[instrument(skip(self, state))]
    async fn send(
        &self,
        state: &mut ScenarioState,
        payload_name: &str,
        mode: SendMode,
    ) -> Result<()> {
        let payload = match mode {
            SendMode::FromStorage => state.get(payload_name)?.clone(),
        };
        let url = format!("{}{}", self.base_url, Self::route_for(&payload)?);

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| FinopsError::GatewayError {
                reason: format!("POST {url}: {e}"),
            })?;

        let status = response.status().as_u16();
        let body: Value = response
            .json()
            .await
            .map_err(|e| FinopsError::GatewayError {
                reason: format!("POST {url}: non-JSON response: {e}"),
            })?;

        info!(status, %url, "request submitted");
        state.set_last_status(status);
        state.put(keys::JSON_RESPONSE, body);
        Ok(())
    }
}
