// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Material-Map: backend for the asset map frontend.
//!
//! Loads a static feature collection once and serves the visible subset for
//! a map viewport, the per-material chart counts, and the table rows.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use services::{DatasetStore, ViewportTracker};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub dataset: DatasetStore,
    pub viewports: ViewportTracker,
}
