// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Feature collection loading smoke tests.
//!
//! These exercise the loader against the committed fixture document. If they
//! fail, the map would silently show fewer assets than the data holds.

use chrono::NaiveDate;
use material_map::models::{aggregate_by_material, ViewportBounds};
use axum::{routing::get, Router};
use material_map::services::{DataSource, DatasetStatus, DatasetStore, FeatureLoader, LoadError};

mod common;
use common::{FIXTURE_IDS, FIXTURE_PATH};

#[test]
fn test_fixture_loads_every_record() {
    let features = FeatureLoader::load_from_file(FIXTURE_PATH).expect("Failed to load fixture");

    let ids: Vec<&str> = features.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, FIXTURE_IDS);
}

#[test]
fn test_fixture_attributes() {
    let features = FeatureLoader::load_from_file(FIXTURE_PATH).expect("Failed to load fixture");

    let first = &features[0];
    assert_eq!(first.material.as_deref(), Some("Brick"));
    assert_eq!(first.area, Some(412.5));
    assert_eq!(first.condition.as_deref(), Some("Good"));
    assert_eq!(first.owner.as_deref(), Some("City Council"));
    assert_eq!(first.last_update, NaiveDate::from_ymd_opt(2023, 4, 18));

    // RFC3339 timestamps keep their date part
    assert_eq!(features[1].last_update, NaiveDate::from_ymd_opt(2022, 11, 2));
    // Unparsable dates and missing materials become None
    assert_eq!(features[3].last_update, None);
    assert_eq!(features[3].material, None);
}

#[test]
fn test_null_geometry_is_kept_but_empty() {
    let features = FeatureLoader::load_from_file(FIXTURE_PATH).expect("Failed to load fixture");

    let concrete = features.iter().find(|f| f.id == "b-105").expect("b-105");
    assert!(concrete.geometry.is_empty());
    assert_eq!(
        features.iter().filter(|f| f.geometry.is_empty()).count(),
        1,
        "only the null-geometry record should be empty"
    );
}

#[test]
fn test_fixture_extent() {
    let features = FeatureLoader::load_from_file(FIXTURE_PATH).expect("Failed to load fixture");

    let extent = ViewportBounds::extent_of(&features).expect("fixture has geometry");
    assert_eq!(extent, ViewportBounds::new(-6.31, 53.30, -6.19, 53.37));
}

#[test]
fn test_fixture_chart() {
    let features = FeatureLoader::load_from_file(FIXTURE_PATH).expect("Failed to load fixture");

    let chart: Vec<(String, u64)> = aggregate_by_material(&features)
        .into_iter()
        .map(|d| (d.category, d.count))
        .collect();
    assert_eq!(
        chart,
        vec![
            ("Brick".to_string(), 2),
            ("Steel".to_string(), 2),
            ("Unknown".to_string(), 1),
            ("Concrete".to_string(), 1),
        ]
    );
}

#[test]
fn test_missing_file_error() {
    let result = FeatureLoader::load_from_file("tests/fixtures/nope.geojson");
    assert!(result.is_err(), "Missing file should return error");
}

#[tokio::test]
async fn test_background_load_reaches_ready() {
    let store = DatasetStore::new();
    store
        .spawn_load(DataSource::parse(FIXTURE_PATH))
        .await
        .expect("load task should not panic");

    assert_eq!(store.status().await, DatasetStatus::Ready);
    let dataset = store.dataset().await.expect("dataset ready");
    assert_eq!(dataset.features().len(), FIXTURE_IDS.len());
}

/// Serve the fixture over HTTP on an ephemeral port. Returns the base URL.
async fn serve_fixture() -> String {
    let fixture = std::fs::read_to_string(FIXTURE_PATH).expect("Failed to read fixture");
    let app = Router::new()
        .route("/features.geojson", get(move || async move { fixture }))
        .route("/not-geojson", get(|| async { "<html>maintenance</html>" }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("listener has an address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server failed");
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_load_from_url() {
    let base = serve_fixture().await;

    let features = FeatureLoader::load_from_url(&format!("{}/features.geojson", base))
        .await
        .expect("Failed to load over HTTP");

    let ids: Vec<&str> = features.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, FIXTURE_IDS);
}

#[tokio::test]
async fn test_load_from_url_not_found() {
    let base = serve_fixture().await;

    let result = FeatureLoader::load_from_url(&format!("{}/missing.geojson", base)).await;

    match result {
        Err(LoadError::HttpError(msg)) => assert!(msg.contains("404"), "message: {}", msg),
        other => panic!("expected HttpError, got {:?}", other.map(|f| f.len())),
    }
}

#[tokio::test]
async fn test_load_from_url_bad_body() {
    let base = serve_fixture().await;

    let result = FeatureLoader::load_from_url(&format!("{}/not-geojson", base)).await;
    assert!(matches!(result, Err(LoadError::ParseError(_))));
}

#[tokio::test]
async fn test_background_load_from_url() {
    let base = serve_fixture().await;
    let source = DataSource::parse(&format!("{}/features.geojson", base));
    assert!(matches!(source, DataSource::Url(_)));

    let store = DatasetStore::new();
    store
        .spawn_load(source)
        .await
        .expect("load task should not panic");

    assert_eq!(store.status().await, DatasetStatus::Ready);
    let dataset = store.dataset().await.expect("dataset ready");
    assert_eq!(dataset.chart().len(), 4);
}
