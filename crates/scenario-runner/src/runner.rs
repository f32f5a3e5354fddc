//! Transaction scenario runner
//!
//! Linear create → submit → assert flows over the financial-operations API.
//! All failures propagate to the caller; there are no retries and no
//! partial-failure recovery.

use finops_core::state::keys;
use finops_core::{limits, FinopsError, Result, ScenarioState};
use serde_json::{json, Map, Value};
use tracing::{error, info, instrument};

use crate::fixture::FixtureStore;
use crate::gateway::{RequestGateway, SendMode};

#[derive(Debug)]
pub struct TransactionScenarioRunner<G> {
    fixtures: FixtureStore,
    gateway: G,
    state: ScenarioState,
}

impl<G: RequestGateway> TransactionScenarioRunner<G> {
    /// One runner per scenario; the state it owns starts empty and dies with
    /// the runner.
    pub fn new(fixtures: FixtureStore, gateway: G) -> Self {
        Self {
            fixtures,
            gateway,
            state: ScenarioState::new(),
        }
    }

    pub fn state(&self) -> &ScenarioState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ScenarioState {
        &mut self.state
    }

    /// Load the `ach`/`valid` payment-method template, inject the three
    /// signature fields, submit, and return the id the service assigned.
    #[instrument(skip_all)]
    pub async fn create_payment_method_with_signatures(
        &mut self,
        signature_1: &str,
        signature_2: &str,
        bank_logo: &str,
    ) -> Result<String> {
        let mut body = self.fixtures.load("payment_method", "ach", "valid")?;
        nested_object_mut(&mut body, "paymentMethod")?.insert(
            "signatureData".to_string(),
            json!({
                "signature1Data": signature_1,
                "signature2Data": signature_2,
                "bankLogoData": bank_logo,
            }),
        );

        self.state.put(keys::PAYMENT_METHOD, body);
        self.gateway
            .send(&mut self.state, keys::PAYMENT_METHOD, SendMode::FromStorage)
            .await?;
        self.state.expect_status(200)?;

        let id = self
            .state
            .lookup(keys::JSON_RESPONSE, "paymentMethod.id")?
            .as_str()
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or_else(|| FinopsError::MissingField {
                path: "paymentMethod.id".to_string(),
            })?;

        // After submission the payment method carries its assigned id, so
        // later transactions in the scenario can reference it.
        let stored = self.state.get_mut(keys::PAYMENT_METHOD)?;
        nested_object_mut(stored, "paymentMethod")?
            .insert("id".to_string(), Value::String(id.clone()));

        info!(%id, "Created payment method with signatures and bank logo");
        Ok(id)
    }

    /// Load the `vericast_check`/`valid_check` transaction template, point
    /// it at the given payment method, and submit it.
    ///
    /// A transaction may only reference a payment method that was actually
    /// created, so an empty id is rejected before anything is sent. The
    /// stored payment method's signature data travels with the reference so
    /// later verification can read it off the transaction payload.
    #[instrument(skip(self))]
    pub async fn create_transaction(&mut self, payment_method_id: &str) -> Result<()> {
        if payment_method_id.is_empty() {
            return Err(FinopsError::AssertionFailed {
                reason: "transaction requires the id of a created payment method".to_string(),
            });
        }

        let mut body = self.fixtures.load("transaction", "vericast_check", "valid_check")?;
        let signature_data = self
            .state
            .lookup(keys::PAYMENT_METHOD, "paymentMethod.signatureData")
            .ok()
            .cloned();

        let reference = nested_object_mut(&mut body, "transaction.paymentMethod")?;
        reference.insert(
            "id".to_string(),
            Value::String(payment_method_id.to_string()),
        );
        if let Some(signature_data) = signature_data {
            reference.insert("signatureData".to_string(), signature_data);
        }

        self.state.put(keys::TRANSACTION_PAYMENT, body);
        self.gateway
            .send(
                &mut self.state,
                keys::TRANSACTION_PAYMENT,
                SendMode::FromStorage,
            )
            .await?;
        self.state.expect_status(200)?;

        info!("Transaction created successfully");
        Ok(())
    }

    /// Same transaction template with the amount overridden. When the
    /// scenario already created a payment method, the transaction references
    /// it; otherwise the template's reference goes out as-is.
    #[instrument(skip(self))]
    pub async fn create_transaction_with_amount(&mut self, amount: f64) -> Result<()> {
        let mut body = self.fixtures.load("transaction", "vericast_check", "valid_check")?;
        nested_object_mut(&mut body, "transaction")?
            .insert("amount".to_string(), json!(amount));
        if let Ok(id) = self
            .state
            .lookup(keys::PAYMENT_METHOD, "paymentMethod.id")
            .map(Value::clone)
        {
            nested_object_mut(&mut body, "transaction.paymentMethod")?
                .insert("id".to_string(), id);
        }

        self.state.put(keys::TRANSACTION_PAYMENT, body);
        self.gateway
            .send(
                &mut self.state,
                keys::TRANSACTION_PAYMENT,
                SendMode::FromStorage,
            )
            .await?;
        self.state.expect_status(200)
    }

    /// Re-submit the stored transaction payload.
    #[instrument(skip(self))]
    pub async fn resend_transaction(&mut self) -> Result<()> {
        self.gateway
            .send(
                &mut self.state,
                keys::TRANSACTION_PAYMENT,
                SendMode::FromStorage,
            )
            .await?;
        self.state.expect_status(200)
    }

    /// The stored transaction payload must carry bank-logo signature data.
    pub fn verify_bank_logo_present(&self) -> Result<()> {
        match self.state.lookup(
            keys::TRANSACTION_PAYMENT,
            "transaction.paymentMethod.signatureData.bankLogoData",
        ) {
            Ok(_) => {
                info!("Bank logo verified successfully");
                Ok(())
            }
            Err(e) => {
                error!("Bank logo verification failed");
                Err(e)
            }
        }
    }

    /// The response message must match the amount: inside [0, 999999.99]
    /// the service reports success, outside it reports an invalid amount.
    pub fn verify_amount_message(&self, amount: f64) -> Result<()> {
        let message = self
            .state
            .lookup(keys::JSON_RESPONSE, "message")?
            .as_str()
            .ok_or_else(|| FinopsError::MissingField {
                path: "message".to_string(),
            })?;

        let expected = if amount < limits::MIN_AMOUNT || amount > limits::MAX_AMOUNT {
            "Invalid amount"
        } else {
            "Transaction successful"
        };

        if message.contains(expected) {
            info!(amount, "Transaction message verified successfully");
            Ok(())
        } else {
            error!(amount, message, "Amount message verification failed");
            Err(FinopsError::AssertionFailed {
                reason: format!("expected message containing '{expected}', got '{message}'"),
            })
        }
    }
}

/// Mutable handle on a nested JSON object, failing with the full path if any
/// segment is missing or not an object.
fn nested_object_mut<'a>(root: &'a mut Value, path: &str) -> Result<&'a mut Map<String, Value>> {
    let mut current = root;
    for segment in path.split('.') {
        current = current
            .get_mut(segment)
            .ok_or_else(|| FinopsError::MissingField {
                path: path.to_string(),
            })?;
    }
    current
        .as_object_mut()
        .ok_or_else(|| FinopsError::MissingField {
            path: path.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Gateway that replays scripted (status, body) responses and records
    /// every payload it was asked to send. Clones share the script so the
    /// test can inspect what the runner sent.
    #[derive(Default, Clone)]
    struct ScriptedGateway {
        responses: Arc<Mutex<VecDeque<(u16, Value)>>>,
        sent: Arc<Mutex<Vec<Value>>>,
    }

    impl ScriptedGateway {
        fn replying(responses: Vec<(u16, Value)>) -> Self {
            Self {
                responses: Arc::new(Mutex::new(responses.into())),
                sent: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn sent(&self) -> Vec<Value> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RequestGateway for ScriptedGateway {
        async fn send(
            &self,
            state: &mut ScenarioState,
            payload_name: &str,
            mode: SendMode,
        ) -> Result<()> {
            let payload = match mode {
                SendMode::FromStorage => state.get(payload_name)?.clone(),
            };
            self.sent.lock().unwrap().push(payload);

            let (status, body) = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("scripted gateway ran out of responses");
            state.set_last_status(status);
            state.put(keys::JSON_RESPONSE, body);
            Ok(())
        }
    }

    fn runner(gateway: &ScriptedGateway) -> TransactionScenarioRunner<ScriptedGateway> {
        TransactionScenarioRunner::new(FixtureStore::bundled(), gateway.clone())
    }

    #[tokio::test]
    async fn payment_method_creation_returns_assigned_id() {
        let gateway = ScriptedGateway::replying(vec![(
            200,
            json!({"paymentMethod": {"id": "pm-123"}}),
        )]);
        let mut runner = runner(&gateway);

        let id = runner
            .create_payment_method_with_signatures("sig1", "sig2", "logo")
            .await
            .unwrap();
        assert_eq!(id, "pm-123");

        let sent = gateway.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0]["paymentMethod"]["signatureData"]["bankLogoData"],
            "logo"
        );
    }

    #[tokio::test]
    async fn missing_id_in_response_is_a_missing_field() {
        let gateway =
            ScriptedGateway::replying(vec![(200, json!({"paymentMethod": {}}))]);
        let mut runner = runner(&gateway);

        let err = runner
            .create_payment_method_with_signatures("sig1", "sig2", "logo")
            .await
            .unwrap_err();
        assert!(err.is_missing_field());
    }

    #[tokio::test]
    async fn non_200_status_fails_the_creation() {
        let gateway =
            ScriptedGateway::replying(vec![(500, json!({"error": "boom"}))]);
        let mut runner = runner(&gateway);

        let err = runner
            .create_payment_method_with_signatures("sig1", "sig2", "logo")
            .await
            .unwrap_err();
        assert!(matches!(err, FinopsError::AssertionFailed { .. }));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn empty_payment_method_id_is_rejected_before_sending() {
        let gateway = ScriptedGateway::default();
        let mut runner = runner(&gateway);

        let err = runner.create_transaction("").await.unwrap_err();
        assert!(matches!(err, FinopsError::AssertionFailed { .. }));
        assert!(gateway.sent().is_empty());
    }

    #[tokio::test]
    async fn transaction_carries_reference_and_signature_data() {
        let gateway = ScriptedGateway::replying(vec![
            (200, json!({"paymentMethod": {"id": "pm-9"}})),
            (200, json!({"message": "Transaction successful"})),
        ]);
        let mut runner = runner(&gateway);

        let id = runner
            .create_payment_method_with_signatures("sig1", "sig2", "logo")
            .await
            .unwrap();
        runner.create_transaction(&id).await.unwrap();

        let sent = gateway.sent();
        let transaction = &sent[1]["transaction"];
        assert_eq!(transaction["paymentMethod"]["id"], "pm-9");
        assert_eq!(
            transaction["paymentMethod"]["signatureData"]["bankLogoData"],
            "logo"
        );
        runner.verify_bank_logo_present().unwrap();
    }

    #[tokio::test]
    async fn bank_logo_verification_fails_without_signature_data() {
        let gateway = ScriptedGateway::replying(vec![(
            200,
            json!({"message": "Transaction successful"}),
        )]);
        let mut runner = runner(&gateway);

        // No payment method staged in this scenario, so nothing to copy.
        runner.create_transaction("pm-unknown").await.unwrap();
        let err = runner.verify_bank_logo_present().unwrap_err();
        assert!(err.is_missing_field());
    }

    #[tokio::test]
    async fn amount_override_lands_in_the_sent_payload() {
        let gateway = ScriptedGateway::replying(vec![(
            200,
            json!({"message": "Transaction successful"}),
        )]);
        let mut runner = runner(&gateway);

        runner.create_transaction_with_amount(42.42).await.unwrap();
        assert_eq!(gateway.sent()[0]["transaction"]["amount"], 42.42);
        // No payment method in this scenario, so the template reference
        // goes out untouched.
        assert_eq!(gateway.sent()[0]["transaction"]["paymentMethod"]["id"], Value::Null);
    }

    #[tokio::test]
    async fn amount_flow_references_the_scenario_payment_method() {
        let gateway = ScriptedGateway::replying(vec![
            (200, json!({"paymentMethod": {"id": "pm-7"}})),
            (200, json!({"message": "Transaction successful"})),
        ]);
        let mut runner = runner(&gateway);

        runner
            .create_payment_method_with_signatures("sig1", "sig2", "logo")
            .await
            .unwrap();
        runner.create_transaction_with_amount(10.0).await.unwrap();

        assert_eq!(
            gateway.sent()[1]["transaction"]["paymentMethod"]["id"],
            "pm-7"
        );
    }

    #[tokio::test]
    async fn amount_message_verification_honors_the_limits() {
        let gateway = ScriptedGateway::replying(vec![
            (200, json!({"message": "Transaction successful: txn-1"})),
            (200, json!({"message": "Invalid amount: out of range"})),
        ]);
        let mut runner = runner(&gateway);

        runner.create_transaction_with_amount(999_999.99).await.unwrap();
        runner.verify_amount_message(999_999.99).unwrap();
        // Boundary values are valid, so a success message for an
        // out-of-range expectation must fail.
        assert!(runner.verify_amount_message(1_000_000.0).is_err());

        runner.create_transaction_with_amount(-0.01).await.unwrap();
        runner.verify_amount_message(-0.01).unwrap();
        assert!(runner.verify_amount_message(0.0).is_err());
    }

    #[tokio::test]
    async fn resend_requires_a_stored_transaction() {
        let gateway = ScriptedGateway::default();
        let mut runner = runner(&gateway);

        let err = runner.resend_transaction().await.unwrap_err();
        assert!(err.is_missing_field());
    }
}
