// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Material-Map API Server
//!
//! Serves a static asset feature collection to the map frontend: visible
//! subsets per viewport, material chart counts, and table rows.

use anyhow::Context;
use material_map::{
    config::Config,
    services::{DatasetStore, ViewportTracker},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        port = config.port,
        source = %config.data_source,
        policy = %config.visibility_policy,
        "Starting Material-Map API"
    );

    // Start the one-time load in the background; requests get 503 until it lands
    let dataset = DatasetStore::new();
    dataset.spawn_load(config.data_source.clone());

    let viewports =
        ViewportTracker::with_limits(config.viewport_max_sessions, config.viewport_idle_timeout);
    spawn_idle_sweep(viewports.clone());

    let state = Arc::new(AppState {
        config: config.clone(),
        dataset,
        viewports,
    });

    // Build router
    let app = material_map::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

/// Periodically drop viewport sessions that stopped reporting.
fn spawn_idle_sweep(viewports: ViewportTracker) {
    let period = (viewports.idle_timeout() / 4).max(std::time::Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            viewports.sweep_idle();
        }
    });
}

/// Initialize structured JSON logging.
fn init_logging() -> anyhow::Result<()> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("material_map=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
