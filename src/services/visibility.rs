// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Viewport visibility filtering.
//!
//! Pure functions: safe to call on every viewport change.

use crate::models::{Feature, InBoundsPolicy, ViewportBounds};

/// Whether a feature's first ring satisfies `policy` against `bounds`.
///
/// Features without a usable ring are never in bounds.
pub fn is_in_bounds(feature: &Feature, bounds: &ViewportBounds, policy: InBoundsPolicy) -> bool {
    if feature.geometry.is_empty() || bounds.is_empty() {
        return false;
    }

    let mut points = feature.geometry.sample_points();
    match policy {
        InBoundsPolicy::All => points.all(|p| bounds.contains(p)),
        InBoundsPolicy::Any => points.any(|p| bounds.contains(p)),
    }
}

/// Features visible in `bounds`, in collection order.
pub fn filter_visible<'a>(
    features: &'a [Feature],
    bounds: &ViewportBounds,
    policy: InBoundsPolicy,
) -> Vec<&'a Feature> {
    features
        .iter()
        .filter(|f| is_in_bounds(f, bounds, policy))
        .collect()
}
