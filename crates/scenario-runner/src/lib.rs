//! # Scenario Runner
//!
//! The reusable request-construction-and-verification flow of the testkit:
//! load a JSON fixture, mutate it, store it in scenario state, send it
//! through the gateway, assert on the response.
//!
//! Control flow: [`FixtureStore`] → payload mutation → [`ScenarioState`] →
//! [`RequestGateway`] → [`ScenarioState`] (response) → assertions.

pub use finops_core;

mod fixture;
mod gateway;
mod runner;

pub use fixture::FixtureStore;
pub use gateway::{HttpRequestGateway, RequestGateway, SendMode};
pub use runner::TransactionScenarioRunner;

// Re-export core types for convenience
pub use finops_core::{FinopsError, Result, ScenarioState};
