use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use guardian::config::Config;
use guardian::http::{AppState, router};
use guardian::runtime::build_runtime;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to install tracing subscriber: {err}"))?;

    let config = Config::parse();
    let address = config
        .bind_address()
        .context("HOST and PORT do not form a socket address")?;
    let runtime = build_runtime(&config).context("failed to build the relay runtime")?;

    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    tracing::info!(
        phase = "startup",
        event = "listening",
        address = %address,
        text_chain = %runtime.chat.chains().text(),
        vision_chain = %runtime.chat.chains().vision(),
        history_window = config.history_window
    );

    axum::serve(listener, router(AppState::from(&runtime)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!(phase = "shutdown", event = "stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(phase = "shutdown", event = "signal_error", error = %err);
    }
}
