// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod dataset;
pub mod loader;
pub mod viewport;
pub mod visibility;

pub use dataset::{Dataset, DatasetStatus, DatasetStore};
pub use loader::{DataSource, FeatureLoader, LoadError};
pub use viewport::{ViewportTracker, ViewportUpdate};
pub use visibility::{filter_visible, is_in_bounds};
