// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Chart aggregates for the material pie chart.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::Feature;

/// Category used for features without a material.
pub const UNKNOWN_MATERIAL: &str = "Unknown";

/// One slice of the chart: a material and how many features use it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ChartDatum {
    pub category: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub count: u64,
}

/// Count features per material, in first-seen order.
///
/// Missing materials are counted under [`UNKNOWN_MATERIAL`].
pub fn aggregate_by_material(features: &[Feature]) -> Vec<ChartDatum> {
    let mut chart: Vec<ChartDatum> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for feature in features {
        let category = feature.material.as_deref().unwrap_or(UNKNOWN_MATERIAL);
        match index.get(category) {
            Some(&slot) => chart[slot].count += 1,
            None => {
                index.insert(category, chart.len());
                chart.push(ChartDatum {
                    category: category.to_string(),
                    count: 1,
                });
            }
        }
    }

    chart
}
