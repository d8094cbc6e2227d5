use anyhow::{Context, Result};
use apika_token_server::{
    config::{Config, Environment},
    router::create_router,
    state::AppState,
};
use clap::Parser;
use std::{net::SocketAddr, sync::Arc};
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[derive(Parser)]
#[command(version, about = "Issues ephemeral realtime session credentials")]
struct Cli {
    /// Address to listen on, overrides BIND_ADDRESS
    #[arg(long)]
    bind_address: Option<SocketAddr>,
    /// Runtime environment, overrides APP_ENV
    #[arg(long)]
    env: Option<String>,
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal. Shutting down gracefully...");
}

#[tokio::main]
async fn main() -> Result<()> {
    // --- 1. Load Configuration ---
    let args = Cli::parse();
    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(bind_address) = args.bind_address {
        config.bind_address = bind_address;
    }
    if let Some(env) = args.env.as_deref() {
        config.environment = Environment::parse(env);
    }

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(ChronoLocal::rfc_3339())
        .init();

    // --- 3. Start Server ---
    info!(
        environment = ?config.environment,
        model = %config.defaults.model,
        bind_address = %config.bind_address,
        "Token server configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    let app = create_router(Arc::new(AppState::new(config)));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server has shut down.");
    Ok(())
}
