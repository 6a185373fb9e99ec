// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{Request, StatusCode};
use material_map::config::Config;
use material_map::routes::create_router;
use material_map::services::{DatasetStore, FeatureLoader, LoadError, ViewportTracker};
use material_map::AppState;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const FIXTURE_PATH: &str = "tests/fixtures/features.geojson";

/// Ids of the fixture features, in document order.
#[allow(dead_code)]
pub const FIXTURE_IDS: [&str; 6] = ["b-101", "b-102", "b-103", "b-104", "b-105", "b-106"];

/// Create a test app around an arbitrary dataset store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_app_with(dataset: DatasetStore) -> (axum::Router, Arc<AppState>) {
    create_app_with_config(Config::test_default(), dataset)
}

/// Create a test app with a custom config (viewport limits, default policy).
#[allow(dead_code)]
pub fn create_app_with_config(
    config: Config,
    dataset: DatasetStore,
) -> (axum::Router, Arc<AppState>) {
    let viewports =
        ViewportTracker::with_limits(config.viewport_max_sessions, config.viewport_idle_timeout);
    let state = Arc::new(AppState {
        config,
        dataset,
        viewports,
    });

    (create_router(state.clone()), state)
}

/// Dataset store already holding the fixture collection.
#[allow(dead_code)]
pub fn fixture_store() -> DatasetStore {
    let features =
        FeatureLoader::load_from_file(FIXTURE_PATH).expect("Failed to load fixture features");
    DatasetStore::ready(features)
}

/// Create a test app with the fixture collection already loaded.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_app_with(fixture_store())
}

/// Create a test app whose dataset is still loading.
#[allow(dead_code)]
pub fn create_loading_app() -> (axum::Router, Arc<AppState>) {
    create_app_with(DatasetStore::new())
}

/// Create a test app whose dataset load failed.
#[allow(dead_code)]
pub async fn create_unavailable_app() -> (axum::Router, Arc<AppState>) {
    let store = DatasetStore::new();
    store
        .complete(Err(LoadError::IoError("fixture missing".to_string())))
        .await;
    create_app_with(store)
}

/// Send a request and decode the JSON body (Null for empty bodies).
#[allow(dead_code)]
pub async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

#[allow(dead_code)]
pub async fn get(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

/// Collect the `id` field of each object in a JSON array.
#[allow(dead_code)]
pub fn ids(features: &Value) -> Vec<String> {
    features
        .as_array()
        .expect("expected an array")
        .iter()
        .map(|f| f["id"].as_str().expect("id should be a string").to_string())
        .collect()
}
