//! BDD Tests for the scenario runner
//!
//! Each scenario gets its own stub service and its own runner; nothing is
//! shared across scenarios.

use cucumber::{given, then, when, World};
use finops_stub::StubHandle;
use scenario_runner::finops_core::state::keys;
use scenario_runner::{FixtureStore, HttpRequestGateway, TransactionScenarioRunner};
use serde_json::Value;

#[derive(Debug, World)]
#[world(init = Self::new)]
struct ScenarioWorld {
    stub: Option<StubHandle>,
    runner: Option<TransactionScenarioRunner<HttpRequestGateway>>,
    payment_method_id: Option<String>,
}

impl ScenarioWorld {
    fn new() -> Self {
        Self {
            stub: None,
            runner: None,
            payment_method_id: None,
        }
    }

    fn runner(&mut self) -> &mut TransactionScenarioRunner<HttpRequestGateway> {
        self.runner
            .as_mut()
            .expect("no running financial-operations service in this scenario")
    }
}

#[given("a running financial-operations service")]
async fn given_running_service(world: &mut ScenarioWorld) {
    let stub = finops_stub::spawn()
        .await
        .expect("failed to spawn the stub service");
    let gateway = HttpRequestGateway::new(stub.base_url());
    world.runner = Some(TransactionScenarioRunner::new(
        FixtureStore::bundled(),
        gateway,
    ));
    world.stub = Some(stub);
}

#[given(
    expr = "I create a Check transaction with pay type {string} and signatures {string}, {string} and bank logo {string}"
)]
async fn create_check_transaction(
    world: &mut ScenarioWorld,
    _pay_type: String,
    signature_1: String,
    signature_2: String,
    bank_logo: String,
) {
    let runner = world.runner();
    let payment_method_id = runner
        .create_payment_method_with_signatures(&signature_1, &signature_2, &bank_logo)
        .await
        .expect("payment method creation failed");
    runner
        .create_transaction(&payment_method_id)
        .await
        .expect("transaction creation failed");
    world.payment_method_id = Some(payment_method_id);
}

#[when("I send a transaction request with Signature 1, 2, and Bank Logo")]
async fn send_transaction_request(world: &mut ScenarioWorld) {
    world
        .runner()
        .resend_transaction()
        .await
        .expect("resending the transaction failed");
}

#[then("I verify that the Bank Logo is applied correctly")]
async fn verify_bank_logo(world: &mut ScenarioWorld) {
    let expected_id = world
        .payment_method_id
        .clone()
        .expect("no payment method was created in this scenario");

    let runner = world.runner();
    runner
        .verify_bank_logo_present()
        .expect("bank logo is missing from the transaction payload");

    // The transaction must reference the payment method created above.
    let referenced = runner
        .state()
        .lookup(keys::TRANSACTION_PAYMENT, "transaction.paymentMethod.id")
        .expect("transaction has no payment method reference");
    assert_eq!(referenced, &Value::String(expected_id));

    let stub = world.stub.as_ref().expect("stub not running");
    assert!(!stub.state().recorded_requests().is_empty());
}

#[given(expr = "I create a Transaction with amount {string}")]
async fn create_transaction_with_amount(world: &mut ScenarioWorld, amount: String) {
    let amount: f64 = amount.parse().expect("amount must be numeric");
    let runner = world.runner();

    // A transaction may only reference a created payment method, so the
    // amount flow creates one first.
    let payment_method_id = runner
        .create_payment_method_with_signatures("sig1", "sig2", "bank-logo")
        .await
        .expect("payment method creation failed");
    runner
        .create_transaction_with_amount(amount)
        .await
        .expect("transaction submission failed");
    world.payment_method_id = Some(payment_method_id);
}

#[then(expr = "I verify the appropriate message for amount {string}")]
async fn verify_amount_message(world: &mut ScenarioWorld, amount: String) {
    let amount: f64 = amount.parse().expect("amount must be numeric");
    world
        .runner()
        .verify_amount_message(amount)
        .expect("response message does not match the amount");
}

#[tokio::main]
async fn main() {
    ScenarioWorld::run("tests/features").await;
}
