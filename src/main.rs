use anyhow::Context;
use clap::Parser;
use std::io;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use water_wizard::config::Config;
use water_wizard::page::bind_views;
use water_wizard::server::{app, AppState};
use water_wizard::submit::Transport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let bindings = bind_views().context("page markup is missing a render target")?;
    debug!(?bindings, "view bindings validated");

    let transport = Transport::from_model_url(config.model_url.as_deref());
    info!(transport = %transport.describe(), "submission transport ready");

    let state = AppState::new(transport, config.retain_values_on_failure);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("bind {}", config.addr))?;
    info!("Serving on http://{}", config.addr);
    axum::serve(listener, app(state)).await.context("server failed")?;
    Ok(())
}
