// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Read-only data routes: table rows, visible subsets, chart, extent.

use crate::error::{AppError, Result};
use crate::models::{ChartDatum, FeatureSummary, InBoundsPolicy, ViewportBounds};
use crate::services::visibility::filter_visible;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Data routes. All of them answer 503 until the dataset is ready.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/features", get(get_features))
        .route("/api/features/visible", get(get_visible_features))
        .route("/api/chart", get(get_chart))
        .route("/api/extent", get(get_extent))
}

/// Collection sizes as reported in responses; saturates instead of wrapping.
fn count_of(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}

// ─── Table Rows ──────────────────────────────────────────────

#[derive(Deserialize)]
struct FeaturesQuery {
    /// Pagination: page number (1-indexed)
    #[serde(default = "default_page")]
    page: u32,
    /// Pagination: items per page
    #[serde(default = "default_per_page")]
    per_page: u32,
}

fn default_page() -> u32 {
    1
}
fn default_per_page() -> u32 {
    50
}

const MAX_PER_PAGE: u32 = 500;

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FeaturesResponse {
    pub features: Vec<FeatureSummary>,
    pub page: u32,
    pub per_page: u32,
    /// Total number of features in the collection.
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total: u64,
}

/// Get a page of feature rows, in collection order.
async fn get_features(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FeaturesQuery>,
) -> Result<Json<FeaturesResponse>> {
    if params.page < 1 {
        return Err(AppError::BadRequest(
            "Page must be greater than 0".to_string(),
        ));
    }
    if params.per_page < 1 {
        return Err(AppError::BadRequest(
            "per_page must be greater than 0".to_string(),
        ));
    }

    let dataset = state.dataset.dataset().await?;
    let features = dataset.features();
    let limit = params.per_page.min(MAX_PER_PAGE);

    // Use checked multiplication to prevent overflow on huge page numbers
    let start = (params.page as usize - 1)
        .checked_mul(limit as usize)
        .ok_or_else(|| AppError::BadRequest("Page number causes overflow".to_string()))?;

    let page = if start < features.len() {
        let end = start.saturating_add(limit as usize).min(features.len());
        features[start..end].iter().map(FeatureSummary::from).collect()
    } else {
        vec![]
    };

    Ok(Json(FeaturesResponse {
        features: page,
        page: params.page,
        per_page: limit,
        total: count_of(features.len()),
    }))
}

// ─── Visible Subset ──────────────────────────────────────────

#[derive(Deserialize)]
struct VisibleQuery {
    min_lon: f64,
    min_lat: f64,
    max_lon: f64,
    max_lat: f64,
    /// Overrides the configured in-bounds policy
    policy: Option<InBoundsPolicy>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct VisibleResponse {
    pub features: Vec<FeatureSummary>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub count: u64,
    pub policy: InBoundsPolicy,
}

/// Features visible in the given viewport.
async fn get_visible_features(
    State(state): State<Arc<AppState>>,
    Query(params): Query<VisibleQuery>,
) -> Result<Json<VisibleResponse>> {
    let bounds = ViewportBounds::new(
        params.min_lon,
        params.min_lat,
        params.max_lon,
        params.max_lat,
    );
    let policy = params.policy.unwrap_or(state.config.visibility_policy);

    let dataset = state.dataset.dataset().await?;
    let features: Vec<FeatureSummary> = filter_visible(dataset.features(), &bounds, policy)
        .into_iter()
        .map(FeatureSummary::from)
        .collect();

    tracing::debug!(
        bounds = ?bounds,
        %policy,
        visible = features.len(),
        "Computed visible features"
    );

    Ok(Json(VisibleResponse {
        count: count_of(features.len()),
        features,
        policy,
    }))
}

// ─── Chart & Extent ──────────────────────────────────────────

/// Per-material counts, computed once at load time.
async fn get_chart(State(state): State<Arc<AppState>>) -> Result<Json<Vec<ChartDatum>>> {
    let dataset = state.dataset.dataset().await?;
    Ok(Json(dataset.chart().to_vec()))
}

/// Bounding box of the whole collection (for the initial map fit).
async fn get_extent(State(state): State<Arc<AppState>>) -> Result<Json<ViewportBounds>> {
    let dataset = state.dataset.dataset().await?;
    dataset
        .extent()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Collection has no usable geometry".to_string()))
}
