//! Standalone entry point for the FinOps stub service.

use std::sync::Arc;

use clap::Parser;
use finops_stub::{router, StubState};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "finops-stub")]
#[command(about = "Stand-in financial-operations service")]
#[command(version = finops_core::VERSION)]
struct Cli {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:8090")]
    bind: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    info!("Starting FinOps stub service {}", finops_core::BUILD_INFO);

    let state = Arc::new(StubState::default());
    let app = router(state);

    let listener = TcpListener::bind(&cli.bind).await?;
    info!("FinOps stub service listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
