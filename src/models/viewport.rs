// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Viewport bounds and the in-bounds policy.

use geo::{BoundingRect, Coord};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::Feature;

/// Geographic bounding box of the visible map region.
///
/// Edges are inclusive. A box whose minimum exceeds its maximum on either
/// axis, or that has a non-finite edge, is empty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ViewportBounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl ViewportBounds {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    pub fn is_empty(&self) -> bool {
        let edges = [self.min_lon, self.min_lat, self.max_lon, self.max_lat];
        edges.iter().any(|v| !v.is_finite())
            || self.min_lon > self.max_lon
            || self.min_lat > self.max_lat
    }

    /// Whether `point` (x = longitude, y = latitude) lies inside the box.
    pub fn contains(&self, point: &Coord<f64>) -> bool {
        !self.is_empty()
            && point.x >= self.min_lon
            && point.x <= self.max_lon
            && point.y >= self.min_lat
            && point.y <= self.max_lat
    }

    /// Smallest box covering the first rings of all features.
    ///
    /// Returns `None` when no feature has a usable ring.
    pub fn extent_of(features: &[Feature]) -> Option<Self> {
        features
            .iter()
            .filter_map(|f| f.geometry.first_ring())
            .filter_map(|ring| ring.bounding_rect())
            .map(|rect| Self::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y))
            .reduce(|a, b| {
                Self::new(
                    a.min_lon.min(b.min_lon),
                    a.min_lat.min(b.min_lat),
                    a.max_lon.max(b.max_lon),
                    a.max_lat.max(b.max_lat),
                )
            })
    }
}

/// How many sampled points must fall inside the viewport.
///
/// Parsed the same way everywhere (env, query, JSON body): case-insensitive,
/// surrounding whitespace ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum InBoundsPolicy {
    /// Every point of the first ring is inside.
    #[default]
    All,
    /// At least one point of the first ring is inside.
    Any,
}

impl fmt::Display for InBoundsPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InBoundsPolicy::All => f.write_str("all"),
            InBoundsPolicy::Any => f.write_str("any"),
        }
    }
}

impl FromStr for InBoundsPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(InBoundsPolicy::All),
            "any" => Ok(InBoundsPolicy::Any),
            other => Err(format!("unknown in-bounds policy '{}'", other)),
        }
    }
}

impl TryFrom<String> for InBoundsPolicy {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
