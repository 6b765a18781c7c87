//! What a calculation produces.

use aquastock_compatibility_models::{CompatibilityVerdict, GroupCompatibilityResult};
use aquastock_species_models::ResolvedSpecies;
use aquastock_stocking::{ShapeIncompatibility, StockingRecommendation};
use aquastock_tank::TankDimensions;
use aquastock_tank::format::format_volume;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

use crate::RequestId;

/// Why a request was not calculated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
pub enum InputIncomplete {
    /// No species were selected.
    #[strum(to_string = "Select at least one fish species.")]
    NoSpecies,
    /// The dimensions give a zero volume for a shape that needs them.
    #[strum(to_string = "Enter valid tank dimensions.")]
    InvalidDimensions,
}

/// A completed calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    /// Request this result answers.
    pub request_id: RequestId,
    /// Tank measurements as entered.
    pub dimensions: TankDimensions,
    /// Water volume in liters.
    pub tank_volume_liters: f64,
    /// Parameters used for each species, in selection order.
    pub species: Vec<ResolvedSpecies>,
    /// Recommended quantity per species, in selection order.
    pub recommendations: Vec<StockingRecommendation>,
    /// Non-blocking shape warnings from the live limits.
    pub shape_warnings: Vec<ShapeIncompatibility>,
    /// Group verdict, absent when fewer than two fish are selected.
    pub compatibility: Option<GroupCompatibilityResult>,
    /// Pairs that are compatible only under conditions.
    pub conditional_warnings: Vec<CompatibilityVerdict>,
}

impl CalculationResult {
    /// Volume for display, one decimal place (e.g. `"160.0 L"`).
    #[must_use]
    pub fn volume_label(&self) -> String {
        format_volume(self.tank_volume_liters)
    }

    /// Recommended quantity for `common_name`, ignoring case.
    #[must_use]
    pub fn recommended_quantity(&self, common_name: &str) -> Option<u32> {
        let key = aquastock_species_models::species_key(common_name);
        self.recommendations
            .iter()
            .find(|r| aquastock_species_models::species_key(&r.species_name) == key)
            .map(|r| r.recommended_quantity)
    }

    /// Whether anything non-blocking should be pointed out to the user.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.shape_warnings.is_empty() || !self.conditional_warnings.is_empty()
    }
}

/// The result of [`crate::Calculator::calculate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum CalculationOutcome {
    /// The input is not complete enough to calculate.
    InputIncomplete(InputIncomplete),
    /// At least one species does not suit the tank's shape.
    ShapeIncompatible {
        /// Water volume in liters.
        tank_volume_liters: f64,
        /// The offending species.
        flags: Vec<ShapeIncompatibility>,
    },
    /// At least one pair of species must not be kept together. Only the
    /// incompatible pairs are included.
    GroupIncompatible {
        /// The surfaced group verdict.
        compatibility: GroupCompatibilityResult,
    },
    /// Recommendations were computed.
    Completed(Box<CalculationResult>),
}

impl CalculationOutcome {
    /// The completed result, if any.
    #[must_use]
    pub fn completed(&self) -> Option<&CalculationResult> {
        match self {
            Self::Completed(result) => Some(result.as_ref()),
            _ => None,
        }
    }

    /// Whether the outcome stops the calculation before recommendations.
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        matches!(
            self,
            Self::ShapeIncompatible { .. } | Self::GroupIncompatible { .. }
        )
    }

    /// Short description for logs and terminal output.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::InputIncomplete(reason) => reason.to_string(),
            Self::ShapeIncompatible { flags, .. } => flags
                .iter()
                .map(|f| f.reason.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
            Self::GroupIncompatible { compatibility } => compatibility.summary(),
            Self::Completed(result) => format!(
                "{}: {}",
                result.volume_label(),
                result
                    .recommendations
                    .iter()
                    .map(|r| format!("{} x{}", r.species_name, r.recommended_quantity))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_incomplete_messages() {
        assert_eq!(
            InputIncomplete::NoSpecies.to_string(),
            "Select at least one fish species."
        );
        assert_eq!(
            InputIncomplete::InvalidDimensions.to_string(),
            "Enter valid tank dimensions."
        );
    }

    #[test]
    fn outcome_serializes_with_tag() {
        let json =
            serde_json::to_value(CalculationOutcome::InputIncomplete(InputIncomplete::NoSpecies))
                .unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "outcome": "input_incomplete", "detail": "no_species" })
        );
    }
}
