//! Immutable calculation input.

use aquastock_species_models::FishSelection;
use aquastock_tank::TankDimensions;
use serde::{Deserialize, Serialize};

/// Identifies one calculation request within a session.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    /// Wraps a raw id.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A snapshot of everything one calculation needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationRequest {
    /// Request id; `0` for requests made outside a session.
    #[serde(default)]
    pub id: RequestId,
    /// Tank measurements.
    pub dimensions: TankDimensions,
    /// Species and quantities to stock.
    #[serde(default)]
    pub selection: FishSelection,
}

impl CalculationRequest {
    /// Creates a request.
    #[must_use]
    pub const fn new(id: RequestId, dimensions: TankDimensions, selection: FishSelection) -> Self {
        Self {
            id,
            dimensions,
            selection,
        }
    }
}

#[cfg(test)]
mod tests {
    use aquastock_tank::{LengthUnit, TankShape};

    use super::*;

    #[test]
    fn deserializes_with_lenient_dimensions() {
        let request: CalculationRequest = serde_json::from_value(serde_json::json!({
            "dimensions": {
                "shape": "rectangular",
                "unit": "cm",
                "length": "100",
                "width": 40,
                "height": ""
            },
            "selection": { "Neon Tetra": 6 }
        }))
        .unwrap();

        assert_eq!(request.id, RequestId::default());
        assert_eq!(request.dimensions.shape, TankShape::Rectangle);
        assert_eq!(request.dimensions.unit, LengthUnit::Centimeters);
        assert!((request.dimensions.length - 100.0).abs() < 1e-9);
        assert!(request.dimensions.height.abs() < 1e-9);
        assert_eq!(request.selection.quantity("neon tetra"), 6);
    }

    #[test]
    fn request_id_display() {
        assert_eq!(RequestId::new(7).to_string(), "#7");
    }
}
