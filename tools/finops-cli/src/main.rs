use std::path::PathBuf;

use clap::{Parser, Subcommand};
use finops_core::{endpoints, state::keys};
use scenario_runner::{FixtureStore, HttpRequestGateway, TransactionScenarioRunner};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "finops")]
#[command(about = "FinOps CLI - scenario flows against a financial-operations service")]
#[command(version = finops_core::VERSION)]
struct Cli {
    /// Base URL of the financial-operations service
    #[arg(long, default_value = "http://localhost:8090")]
    base_url: String,

    /// Fixture root directory; defaults to the bundled templates
    #[arg(long)]
    fixtures: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Payment method flows
    PaymentMethod {
        #[command(subcommand)]
        action: PaymentMethodAction,
    },
    /// Transaction flows
    Transaction {
        #[command(subcommand)]
        action: TransactionAction,
    },
    /// Full check flow: create a payment method with signatures, then a transaction
    CheckFlow {
        #[arg(long, default_value = "check")]
        pay_type: String,
        signature1: String,
        signature2: String,
        bank_logo: String,
    },
    /// Probe the service health endpoint
    Status,
}

#[derive(Subcommand)]
enum PaymentMethodAction {
    /// Create a payment method with the three signature fields
    Create {
        signature1: String,
        signature2: String,
        bank_logo: String,
    },
}

#[derive(Subcommand)]
enum TransactionAction {
    /// Create a transaction referencing an existing payment method
    Create { payment_method_id: String },
    /// Create a transaction with an explicit amount
    CreateWithAmount { amount: f64 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::PaymentMethod { action } => handle_payment_method(&cli, action).await,
        Commands::Transaction { action } => handle_transaction(&cli, action).await,
        Commands::CheckFlow {
            pay_type,
            signature1,
            signature2,
            bank_logo,
        } => handle_check_flow(&cli, pay_type, signature1, signature2, bank_logo).await,
        Commands::Status => handle_status(&cli).await,
    }
}

fn make_runner(cli: &Cli) -> TransactionScenarioRunner<HttpRequestGateway> {
    let fixtures = match &cli.fixtures {
        Some(root) => FixtureStore::new(root),
        None => FixtureStore::bundled(),
    };
    TransactionScenarioRunner::new(fixtures, HttpRequestGateway::new(&cli.base_url))
}

async fn handle_payment_method(cli: &Cli, action: &PaymentMethodAction) -> anyhow::Result<()> {
    match action {
        PaymentMethodAction::Create {
            signature1,
            signature2,
            bank_logo,
        } => {
            let mut runner = make_runner(cli);
            let id = runner
                .create_payment_method_with_signatures(signature1, signature2, bank_logo)
                .await?;
            println!("Created payment method: {id}");
        }
    }
    Ok(())
}

async fn handle_transaction(cli: &Cli, action: &TransactionAction) -> anyhow::Result<()> {
    let mut runner = make_runner(cli);
    match action {
        TransactionAction::Create { payment_method_id } => {
            runner.create_transaction(payment_method_id).await?;
            println!("Transaction created against payment method {payment_method_id}");
        }
        TransactionAction::CreateWithAmount { amount } => {
            // Transactions must reference a created payment method.
            let id = runner
                .create_payment_method_with_signatures("sig1", "sig2", "bank-logo")
                .await?;
            println!("Created payment method: {id}");
            runner.create_transaction_with_amount(*amount).await?;
            let message = runner
                .state()
                .lookup(keys::JSON_RESPONSE, "message")?
                .as_str()
                .unwrap_or_default()
                .to_string();
            println!("Service says: {message}");
            runner.verify_amount_message(*amount)?;
            println!("Message matches the amount {amount}");
        }
    }
    Ok(())
}

async fn handle_check_flow(
    cli: &Cli,
    pay_type: &str,
    signature1: &str,
    signature2: &str,
    bank_logo: &str,
) -> anyhow::Result<()> {
    let mut runner = make_runner(cli);

    let id = runner
        .create_payment_method_with_signatures(signature1, signature2, bank_logo)
        .await?;
    println!("Created payment method for pay type '{pay_type}': {id}");

    runner.create_transaction(&id).await?;
    println!("Transaction created");

    runner.verify_bank_logo_present()?;
    println!("Bank logo applied correctly");
    Ok(())
}

async fn handle_status(cli: &Cli) -> anyhow::Result<()> {
    let url = format!(
        "{}{}",
        cli.base_url.trim_end_matches('/'),
        endpoints::HEALTH
    );
    let response = reqwest::get(&url).await?;
    let status = response.status();
    let body: Value = response.json().await?;
    println!("{url} -> {status}");
    println!("{body:#}");
    Ok(())
}
