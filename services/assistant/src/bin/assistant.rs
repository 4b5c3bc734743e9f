//! services/assistant/src/bin/assistant.rs

use assistant_lib::{
    cli::Cli, config::Config, console::run_console, error::AssistantError, session::AppState,
};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), AssistantError> {
    // --- 1. Parse Arguments, Load Configuration & Set Up Logging ---
    let cli = Cli::parse();
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!("Configuration loaded. Starting session...");

    // --- 2. Initialize Service Adapters ---
    info!(
        "Simulated latencies: summary {:?}, response {:?}",
        config.summary_latency, config.response_latency
    );
    let app_state = Arc::new(AppState::simulated(config));

    // --- 3. Run the Front End ---
    run_console(app_state, cli.files).await?;

    info!("Session ended.");
    Ok(())
}
