// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! WHOOP MCP provider
//!
//! Speaks MCP over stdin/stdout. Logs go to stderr.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use whoop_mcp::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging()?;

    // Missing credentials are fatal
    let config = Config::from_env().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        e
    })?;
    tracing::info!(
        api_base_url = %config.api_base_url,
        "Starting WHOOP MCP provider"
    );

    let server = whoop_mcp::build_server(&config)?;
    server.serve_stdio().await?;
    Ok(())
}

/// Initialize structured JSON logging on stderr.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("whoop_mcp=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
