// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! One-shot dataset loading and the derived data cached alongside it.
//!
//! The store starts out `Loading`. A single background load moves it to
//! either `Ready` or `Unavailable`, after which it never changes again:
//! there are no retries and partial data is never exposed.

use crate::error::{AppError, Result};
use crate::models::{aggregate_by_material, ChartDatum, Feature, ViewportBounds};
use crate::services::loader::{DataSource, FeatureLoader, LoadError};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// The loaded collection plus everything derived from it.
#[derive(Debug)]
pub struct Dataset {
    features: Arc<[Feature]>,
    chart: Vec<ChartDatum>,
    extent: Option<ViewportBounds>,
    loaded_at: DateTime<Utc>,
}

impl Dataset {
    /// Derive chart data and extent once, up front.
    pub fn new(features: Vec<Feature>) -> Self {
        let chart = aggregate_by_material(&features);
        let extent = ViewportBounds::extent_of(&features);
        Self {
            features: features.into(),
            chart,
            extent,
            loaded_at: Utc::now(),
        }
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn chart(&self) -> &[ChartDatum] {
        &self.chart
    }

    pub fn extent(&self) -> Option<ViewportBounds> {
        self.extent
    }

    /// Load completion time as RFC3339 with a `Z` suffix.
    pub fn loaded_at(&self) -> String {
        self.loaded_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

#[derive(Debug, Clone)]
enum DatasetState {
    Loading,
    Ready(Arc<Dataset>),
    Unavailable(String),
}

/// Coarse load status for health checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum DatasetStatus {
    Loading,
    Ready,
    Unavailable,
}

/// Shared handle to the dataset load state.
#[derive(Clone)]
pub struct DatasetStore {
    state: Arc<RwLock<DatasetState>>,
}

impl Default for DatasetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetStore {
    /// A store that is still waiting for its load.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(DatasetState::Loading)),
        }
    }

    /// A store that is already populated (tests, embedded data).
    pub fn ready(features: Vec<Feature>) -> Self {
        Self {
            state: Arc::new(RwLock::new(DatasetState::Ready(Arc::new(Dataset::new(
                features,
            ))))),
        }
    }

    /// Start the single background load from `source`.
    pub fn spawn_load(&self, source: DataSource) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            tracing::info!(source = %source, "Loading feature collection");
            let result = FeatureLoader::load(&source).await;
            store.complete(result).await;
        })
    }

    /// Record the outcome of the load. Only the first outcome counts.
    pub async fn complete(&self, result: std::result::Result<Vec<Feature>, LoadError>) {
        let mut state = self.state.write().await;
        if !matches!(*state, DatasetState::Loading) {
            tracing::warn!("Dataset load already completed, ignoring second result");
            return;
        }

        *state = match result {
            Ok(features) => {
                let dataset = Dataset::new(features);
                tracing::info!(
                    features = dataset.features().len(),
                    categories = dataset.chart().len(),
                    "Dataset ready"
                );
                DatasetState::Ready(Arc::new(dataset))
            }
            Err(e) => {
                tracing::error!(error = %e, "Dataset load failed");
                DatasetState::Unavailable(e.to_string())
            }
        };
    }

    pub async fn status(&self) -> DatasetStatus {
        match &*self.state.read().await {
            DatasetState::Loading => DatasetStatus::Loading,
            DatasetState::Ready(_) => DatasetStatus::Ready,
            DatasetState::Unavailable(_) => DatasetStatus::Unavailable,
        }
    }

    /// The loaded dataset, or the reason it cannot be served yet.
    pub async fn dataset(&self) -> Result<Arc<Dataset>> {
        match &*self.state.read().await {
            DatasetState::Ready(dataset) => Ok(dataset.clone()),
            DatasetState::Loading => Err(AppError::DatasetLoading),
            DatasetState::Unavailable(reason) => Err(AppError::DatasetUnavailable(reason.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeatureGeometry;

    fn feature(id: &str, material: &str) -> Feature {
        Feature {
            id: id.to_string(),
            material: Some(material.to_string()),
            area: None,
            condition: None,
            owner: None,
            last_update: None,
            geometry: FeatureGeometry::empty(),
        }
    }

    #[tokio::test]
    async fn test_starts_loading() {
        let store = DatasetStore::new();
        assert_eq!(store.status().await, DatasetStatus::Loading);
        assert!(matches!(store.dataset().await, Err(AppError::DatasetLoading)));
    }

    #[tokio::test]
    async fn test_ready_derives_chart_once() {
        let store = DatasetStore::new();
        store
            .complete(Ok(vec![feature("1", "Brick"), feature("2", "Brick")]))
            .await;

        let dataset = store.dataset().await.expect("ready");
        assert_eq!(dataset.features().len(), 2);
        assert_eq!(dataset.chart().len(), 1);
        assert_eq!(dataset.chart()[0].count, 2);
        assert!(dataset.extent().is_none());
    }

    #[tokio::test]
    async fn test_failure_is_permanent() {
        let store = DatasetStore::new();
        store.complete(Err(LoadError::NotACollection)).await;
        store.complete(Ok(vec![feature("1", "Brick")])).await;

        assert_eq!(store.status().await, DatasetStatus::Unavailable);
        assert!(matches!(
            store.dataset().await,
            Err(AppError::DatasetUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_spawn_load_missing_file() {
        let store = DatasetStore::new();
        store
            .spawn_load(DataSource::parse("does/not/exist.geojson"))
            .await
            .expect("load task should not panic");

        assert_eq!(store.status().await, DatasetStatus::Unavailable);
    }
}
