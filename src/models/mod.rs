// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod chart;
pub mod feature;
pub mod viewport;

pub use chart::{aggregate_by_material, ChartDatum};
pub use feature::{Feature, FeatureGeometry, FeatureSummary};
pub use viewport::{InBoundsPolicy, ViewportBounds};
