//! # FinOps Stub Service
//!
//! Stand-in for the remote financial-operations service: accepts
//! payment-method and transaction submissions and answers the way the real
//! API does, with an HTTP status and a JSON body carrying a message. The BDD
//! suite spawns it in-process on an ephemeral port; `main` serves it
//! standalone for manual runs.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use dashmap::DashMap;
use finops_core::{endpoints, limits, PaymentMethod, PaymentMethodEnvelope, TransactionEnvelope};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::{error, info, instrument};
use uuid::Uuid;

/// Shared service state: the registry of created payment methods and a log
/// of every payload received, for test introspection.
#[derive(Debug, Default)]
pub struct StubState {
    payment_methods: DashMap<String, PaymentMethod>,
    requests: Mutex<Vec<Value>>,
}

impl StubState {
    fn record(&self, payload: Value) {
        self.requests.lock().push(payload);
    }

    /// Every payload received so far, in arrival order.
    pub fn recorded_requests(&self) -> Vec<Value> {
        self.requests.lock().clone()
    }

    pub fn payment_method_count(&self) -> usize {
        self.payment_methods.len()
    }
}

pub fn router(state: Arc<StubState>) -> Router {
    Router::new()
        .route(endpoints::HEALTH, get(health_check))
        .route(endpoints::API_V1_PAYMENT_METHODS, post(create_payment_method))
        .route(endpoints::API_V1_TRANSACTIONS, post(create_transaction))
        .with_state(state)
}

#[instrument]
async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "finops-stub",
        "version": finops_core::VERSION
    }))
}

/// Assign an id, register the payment method, and echo the payload back
/// with the id filled in.
#[instrument(skip_all)]
async fn create_payment_method(
    State(state): State<Arc<StubState>>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    state.record(payload.clone());

    let mut envelope: PaymentMethodEnvelope =
        serde_json::from_value(payload).map_err(|_| StatusCode::BAD_REQUEST)?;
    let id = Uuid::new_v4().to_string();
    envelope.payment_method.id = Some(id.clone());
    state
        .payment_methods
        .insert(id.clone(), envelope.payment_method.clone());

    info!(%id, "payment method created");
    let body = serde_json::to_value(&envelope).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(body))
}

/// Validate the transaction and answer with HTTP 200 plus a message, the
/// way the real service does: validation outcomes live in the message, not
/// in the status code.
#[instrument(skip_all)]
async fn create_transaction(
    State(state): State<Arc<StubState>>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    state.record(payload.clone());

    let envelope: TransactionEnvelope =
        serde_json::from_value(payload).map_err(|_| StatusCode::BAD_REQUEST)?;
    let amount = envelope.transaction.amount;

    if !amount_within_limits(amount) {
        info!(amount, "transaction rejected: amount out of range");
        return Ok(Json(json!({
            "message": format!(
                "Invalid amount: {amount} is outside [{}, {}]",
                limits::MIN_AMOUNT,
                limits::MAX_AMOUNT
            )
        })));
    }

    let reference = envelope
        .transaction
        .payment_method
        .as_ref()
        .and_then(|r| r.id.as_deref())
        .filter(|id| state.payment_methods.contains_key(*id));

    match reference {
        Some(payment_method_id) => {
            let transaction_id = Uuid::new_v4().to_string();
            info!(%transaction_id, amount, "transaction created");
            Ok(Json(json!({
                "message": format!("Transaction successful: {transaction_id}"),
                "transaction": {
                    "id": transaction_id,
                    "amount": amount,
                    "paymentMethod": {"id": payment_method_id},
                    "createdAt": chrono::Utc::now().to_rfc3339(),
                }
            })))
        }
        None => {
            info!(amount, "transaction rejected: unknown payment method");
            Ok(Json(json!({
                "message": "Invalid payment method: no created payment method with that id"
            })))
        }
    }
}

/// Inclusive on both ends; 0 and 999999.99 are valid amounts.
pub fn amount_within_limits(amount: f64) -> bool {
    (limits::MIN_AMOUNT..=limits::MAX_AMOUNT).contains(&amount)
}

/// Handle for an in-process stub server. Dropping it stops the server.
#[derive(Debug)]
pub struct StubHandle {
    base_url: String,
    state: Arc<StubState>,
    join: tokio::task::JoinHandle<()>,
}

impl StubHandle {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn state(&self) -> &StubState {
        &self.state
    }
}

impl Drop for StubHandle {
    fn drop(&mut self) {
        self.join.abort();
    }
}

/// Spawn the stub on an ephemeral local port.
pub async fn spawn() -> std::io::Result<StubHandle> {
    let state = Arc::new(StubState::default());
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = router(state.clone());

    let join = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("stub server stopped: {e}");
        }
    });

    Ok(StubHandle {
        base_url: format!("http://{addr}"),
        state,
        join,
    })
}
