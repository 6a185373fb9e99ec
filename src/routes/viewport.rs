// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Viewport session routes.

use crate::error::{AppError, Result};
use crate::models::{InBoundsPolicy, ViewportBounds};
use crate::services::viewport::{ViewportSnapshot, ViewportTracker, ViewportUpdate};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/api/viewport/{session}",
        get(get_viewport).put(put_viewport).delete(delete_viewport),
    )
}

#[derive(Deserialize)]
struct ViewportRequest {
    /// Client-side event counter; higher is newer
    seq: u64,
    bounds: ViewportBounds,
    policy: Option<InBoundsPolicy>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ViewportResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub seq: u64,
    pub bounds: ViewportBounds,
    pub policy: InBoundsPolicy,
    pub visible_ids: Vec<String>,
}

impl From<ViewportSnapshot> for ViewportResponse {
    fn from(snapshot: ViewportSnapshot) -> Self {
        Self {
            seq: snapshot.seq,
            bounds: snapshot.bounds,
            policy: snapshot.policy,
            visible_ids: snapshot.visible_ids.to_vec(),
        }
    }
}

fn validate_session(session: &str) -> Result<()> {
    if ViewportTracker::is_valid_session_id(session) {
        Ok(())
    } else {
        Err(AppError::BadRequest("Invalid session id".to_string()))
    }
}

/// Report a viewport change and get the new visible subset.
async fn put_viewport(
    State(state): State<Arc<AppState>>,
    Path(session): Path<String>,
    Json(request): Json<ViewportRequest>,
) -> Result<Json<ViewportResponse>> {
    validate_session(&session)?;

    let dataset = state.dataset.dataset().await?;
    let policy = request.policy.unwrap_or(state.config.visibility_policy);

    match state
        .viewports
        .update(&session, request.seq, request.bounds, policy, &dataset)
    {
        ViewportUpdate::Applied(snapshot) => Ok(Json(snapshot.into())),
        ViewportUpdate::Stale { current_seq } => {
            tracing::debug!(
                session = %session,
                seq = request.seq,
                current_seq,
                "Ignoring stale viewport update"
            );
            Err(AppError::Conflict(format!(
                "seq {} is older than current seq {}",
                request.seq, current_seq
            )))
        }
    }
}

/// Current visible subset for a session.
async fn get_viewport(
    State(state): State<Arc<AppState>>,
    Path(session): Path<String>,
) -> Result<Json<ViewportResponse>> {
    validate_session(&session)?;

    state
        .viewports
        .visible(&session)
        .map(|snapshot| Json(snapshot.into()))
        .ok_or_else(|| AppError::NotFound(format!("Viewport session {} not found", session)))
}

async fn delete_viewport(
    State(state): State<Arc<AppState>>,
    Path(session): Path<String>,
) -> Result<StatusCode> {
    validate_session(&session)?;

    if state.viewports.forget(&session) {
        tracing::debug!(session = %session, "Viewport session removed");
    }
    Ok(StatusCode::NO_CONTENT)
}
