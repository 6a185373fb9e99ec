// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Map feature model and geometry handling.

use chrono::NaiveDate;
use geo::{Coord, LineString};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A single mapped asset with its footprint and descriptive attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Identifier from the source document (stringified if numeric)
    pub id: String,
    /// Material of construction, used for the chart categories
    pub material: Option<String>,
    pub area: Option<f64>,
    pub condition: Option<String>,
    pub owner: Option<String>,
    pub last_update: Option<NaiveDate>,
    /// Footprint geometry (may be empty for malformed records)
    pub geometry: FeatureGeometry,
}

/// Footprint geometry as nested rings: polygons → rings → points.
///
/// Rings are kept exactly as they appear in the source document, so an
/// empty polygon or an empty ring survives loading and is simply never
/// considered in bounds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureGeometry {
    polygons: Vec<Vec<LineString<f64>>>,
}

impl FeatureGeometry {
    pub fn new(polygons: Vec<Vec<LineString<f64>>>) -> Self {
        Self { polygons }
    }

    /// Geometry with no rings at all.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn polygons(&self) -> &[Vec<LineString<f64>>] {
        &self.polygons
    }

    /// The first ring of the first polygon, if there is one with points.
    pub fn first_ring(&self) -> Option<&LineString<f64>> {
        self.polygons
            .first()
            .and_then(|rings| rings.first())
            .filter(|ring| !ring.0.is_empty())
    }

    /// Points sampled for the in-bounds check.
    pub fn sample_points(&self) -> impl Iterator<Item = &Coord<f64>> {
        self.first_ring().into_iter().flat_map(|ring| ring.0.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.first_ring().is_none()
    }
}

/// A feature as returned by the API (table rows, visible subsets).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FeatureSummary {
    pub id: String,
    pub material: Option<String>,
    pub area: Option<f64>,
    pub condition: Option<String>,
    pub owner: Option<String>,
    pub last_update: Option<String>,
    /// `[longitude, latitude]` pairs of the first ring
    pub outline: Vec<[f64; 2]>,
}

impl From<&Feature> for FeatureSummary {
    fn from(feature: &Feature) -> Self {
        Self {
            id: feature.id.clone(),
            material: feature.material.clone(),
            area: feature.area,
            condition: feature.condition.clone(),
            owner: feature.owner.clone(),
            last_update: feature
                .last_update
                .map(|d| d.format("%Y-%m-%d").to_string()),
            outline: feature.geometry.sample_points().map(|c| [c.x, c.y]).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_ring_skips_empty_geometry() {
        assert!(FeatureGeometry::empty().first_ring().is_none());
        assert!(FeatureGeometry::new(vec![vec![]]).is_empty());
        assert!(FeatureGeometry::new(vec![vec![LineString::new(vec![])]]).is_empty());
    }

    #[test]
    fn test_sample_points_use_first_ring_only() {
        let outer = LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]);
        let hole = LineString::from(vec![(0.2, 0.2), (0.4, 0.2), (0.2, 0.2)]);
        let geometry = FeatureGeometry::new(vec![vec![outer, hole]]);

        assert_eq!(geometry.sample_points().count(), 4);
    }

    #[test]
    fn test_summary_formats_date_and_outline() {
        let feature = Feature {
            id: "7".to_string(),
            material: Some("Brick".to_string()),
            area: Some(12.5),
            condition: None,
            owner: None,
            last_update: NaiveDate::from_ymd_opt(2024, 3, 9),
            geometry: FeatureGeometry::new(vec![vec![LineString::from(vec![(1.0, 2.0)])]]),
        };

        let summary = FeatureSummary::from(&feature);
        assert_eq!(summary.last_update.as_deref(), Some("2024-03-09"));
        assert_eq!(summary.outline, vec![[1.0, 2.0]]);
    }
}
