// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Feature collection loading from files, URLs, or raw GeoJSON.

use crate::models::{Feature, FeatureGeometry};
use chrono::{DateTime, NaiveDate};
use geo::{Coord, LineString};
use geojson::{feature::Id, GeoJson};
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Where the static feature document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Url(String),
}

impl DataSource {
    /// Interpret a configuration value: `http(s)://` means a URL, anything
    /// else is a filesystem path.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            DataSource::Url(raw.to_string())
        } else {
            DataSource::File(PathBuf::from(raw))
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::File(path) => write!(f, "{}", path.display()),
            DataSource::Url(url) => f.write_str(url),
        }
    }
}

/// Loader for the static feature collection.
pub struct FeatureLoader;

impl FeatureLoader {
    /// Load features from whichever source is configured.
    pub async fn load(source: &DataSource) -> Result<Vec<Feature>, LoadError> {
        match source {
            DataSource::File(path) => {
                let path = path.clone();
                tokio::task::spawn_blocking(move || Self::load_from_file(path))
                    .await
                    .map_err(|e| LoadError::TaskFailed(e.to_string()))?
            }
            DataSource::Url(url) => Self::load_from_url(url).await,
        }
    }

    /// Load features from a GeoJSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<Feature>, LoadError> {
        let json_data =
            fs::read_to_string(path.as_ref()).map_err(|e| LoadError::IoError(e.to_string()))?;
        Self::load_from_json(&json_data)
    }

    /// Fetch and load features from an HTTP(S) URL. No retries.
    pub async fn load_from_url(url: &str) -> Result<Vec<Feature>, LoadError> {
        let response = reqwest::get(url)
            .await
            .map_err(|e| LoadError::HttpError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::HttpError(format!("{} returned {}", url, status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| LoadError::HttpError(e.to_string()))?;
        Self::load_from_json(&body)
    }

    /// Load features from a GeoJSON FeatureCollection string.
    ///
    /// Individual records with missing or unsupported geometry are kept with
    /// empty geometry; only a document-level problem is an error.
    pub fn load_from_json(json_data: &str) -> Result<Vec<Feature>, LoadError> {
        let geojson: GeoJson = json_data
            .parse()
            .map_err(|e: geojson::Error| LoadError::ParseError(e.to_string()))?;

        let GeoJson::FeatureCollection(collection) = geojson else {
            return Err(LoadError::NotACollection);
        };

        let mut features: Vec<Feature> = collection
            .features
            .into_iter()
            .enumerate()
            .map(|(index, feature)| Self::convert_feature(index, feature))
            .collect();
        dedupe_ids(&mut features);

        let malformed = features.iter().filter(|f| f.geometry.is_empty()).count();
        tracing::info!(count = features.len(), malformed, "Loaded features");
        Ok(features)
    }

    fn convert_feature(index: usize, feature: geojson::Feature) -> Feature {
        let id = match &feature.id {
            Some(Id::String(s)) => s.clone(),
            Some(Id::Number(n)) => n.to_string(),
            None => feature
                .property("id")
                .and_then(json_to_string)
                .unwrap_or_else(|| format!("feature-{}", index)),
        };

        let material = feature
            .property("material")
            .and_then(json_to_string)
            .filter(|m| !m.trim().is_empty());
        let area = feature.property("area").and_then(json_to_f64);
        let condition = feature.property("condition").and_then(json_to_string);
        let owner = feature.property("owner").and_then(json_to_string);
        let last_update = feature
            .property("last_update")
            .or_else(|| feature.property("lastUpdate"))
            .and_then(json_to_string)
            .and_then(|raw| {
                let parsed = parse_date(&raw);
                if parsed.is_none() {
                    tracing::warn!(feature = %id, value = %raw, "Unparsable last_update date");
                }
                parsed
            });

        let geometry = match feature.geometry {
            Some(geom) => Self::convert_geometry(&id, geom.value),
            None => {
                tracing::warn!(feature = %id, "Feature has no geometry");
                FeatureGeometry::empty()
            }
        };

        Feature {
            id,
            material,
            area,
            condition,
            owner,
            last_update,
            geometry,
        }
    }

    /// Convert GeoJSON geometry to nested rings.
    fn convert_geometry(id: &str, value: geojson::Value) -> FeatureGeometry {
        match value {
            geojson::Value::Polygon(rings) => FeatureGeometry::new(vec![convert_rings(&rings)]),
            geojson::Value::MultiPolygon(polygons) => {
                FeatureGeometry::new(polygons.iter().map(|rings| convert_rings(rings)).collect())
            }
            other => {
                tracing::warn!(
                    feature = %id,
                    kind = geometry_kind(&other),
                    "Unsupported geometry type (expected Polygon or MultiPolygon)"
                );
                FeatureGeometry::empty()
            }
        }
    }
}

/// Give every feature a distinct id. The first holder of an id keeps it;
/// later holders get a `#<n>` suffix that is not taken yet.
fn dedupe_ids(features: &mut [Feature]) {
    let mut seen: HashSet<String> = features.iter().map(|f| f.id.clone()).collect();
    if seen.len() == features.len() {
        return;
    }

    let mut claimed: HashSet<String> = HashSet::with_capacity(features.len());
    for feature in features.iter_mut() {
        if claimed.insert(feature.id.clone()) {
            continue;
        }

        let original = feature.id.clone();
        let mut n = 2;
        let renamed = loop {
            let candidate = format!("{}#{}", original, n);
            if !seen.contains(&candidate) {
                break candidate;
            }
            n += 1;
        };
        tracing::warn!(feature = %original, renamed = %renamed, "Duplicate feature id");
        seen.insert(renamed.clone());
        claimed.insert(renamed.clone());
        feature.id = renamed;
    }
}

fn convert_rings(rings: &[Vec<Vec<f64>>]) -> Vec<LineString<f64>> {
    rings
        .iter()
        .map(|ring| {
            ring.iter()
                .filter_map(|pos| match pos.as_slice() {
                    [x, y, ..] => Some(Coord { x: *x, y: *y }),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .into()
        })
        .collect()
}

fn geometry_kind(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn json_to_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn json_to_f64(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Accepts `YYYY-MM-DD` or an RFC3339 timestamp (date part is kept).
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// Errors from feature loading.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read file: {0}")]
    IoError(String),

    #[error("Failed to fetch document: {0}")]
    HttpError(String),

    #[error("Failed to parse GeoJSON: {0}")]
    ParseError(String),

    #[error("Document is not a FeatureCollection")]
    NotACollection,

    #[error("Load task failed: {0}")]
    TaskFailed(String),
}
