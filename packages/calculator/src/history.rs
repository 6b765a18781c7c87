//! Flattened snapshot of a completed calculation for a history log.

use std::collections::BTreeMap;

use aquastock_species_models::FishSelection;
use aquastock_tank::TankShape;
use aquastock_tank::format::dimension_label;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CalculationResult;

/// One history log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    /// When the calculation completed.
    pub recorded_at: DateTime<Utc>,
    /// Volume with unit suffix, e.g. `"160.0 L"`.
    pub tank_volume: String,
    /// Tank shape.
    pub shape: TankShape,
    /// Dimensions as entered, e.g. `"100 × 40 × 40 cm"`.
    pub dimensions: String,
    /// Requested quantity per species.
    pub selection: FishSelection,
    /// Recommended quantity per species.
    pub recommended: BTreeMap<String, u32>,
    /// Group compatibility in one line.
    pub compatibility_summary: String,
    /// Shape warnings and overstocking notes in one line.
    pub environment_summary: String,
}

impl HistoryRecord {
    /// Snapshots `result`, timestamped now.
    #[must_use]
    pub fn from_result(result: &CalculationResult) -> Self {
        Self::from_result_at(result, Utc::now())
    }

    /// Snapshots `result` with an explicit timestamp.
    #[must_use]
    pub fn from_result_at(result: &CalculationResult, recorded_at: DateTime<Utc>) -> Self {
        let selection = result
            .recommendations
            .iter()
            .map(|r| (r.species_name.as_str(), r.current_quantity))
            .collect();
        let recommended = result
            .recommendations
            .iter()
            .map(|r| (r.species_name.clone(), r.recommended_quantity))
            .collect();

        let compatibility_summary = result.compatibility.as_ref().map_or_else(
            || "Not checked (single fish)".to_string(),
            aquastock_compatibility_models::GroupCompatibilityResult::summary,
        );

        Self {
            recorded_at,
            tank_volume: result.volume_label(),
            shape: result.dimensions.shape,
            dimensions: dimension_label(&result.dimensions),
            selection,
            recommended,
            compatibility_summary,
            environment_summary: environment_summary(result),
        }
    }
}

fn environment_summary(result: &CalculationResult) -> String {
    let mut notes: Vec<String> = result
        .shape_warnings
        .iter()
        .map(|w| w.reason.clone())
        .collect();

    notes.extend(
        result
            .recommendations
            .iter()
            .filter(|r| r.is_overstocked())
            .map(|r| {
                format!(
                    "{}: {} requested, {} recommended",
                    r.species_name, r.current_quantity, r.recommended_quantity
                )
            }),
    );

    if notes.is_empty() {
        "No issues".to_string()
    } else {
        notes.join("; ")
    }
}
