#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Species parameter and fish selection types.
//!
//! Species are identified by their common name, compared
//! case-insensitively. [`SpeciesParameters`] is always complete: any field
//! the data source could not supply is filled from the fallback defaults,
//! and [`ParameterProvenance`] records which fields that happened to.

mod selection;

pub use selection::{FishSelection, InvalidSelectionError, SelectionEntry};

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Fallback maximum adult size when a record does not provide one.
pub const DEFAULT_MAX_SIZE_CM: f64 = 10.0;

/// Fallback minimum tank size when a record does not provide one.
pub const DEFAULT_MINIMUM_TANK_SIZE_LITERS: f64 = 20.0;

/// Fallback bioload multiplier.
pub const DEFAULT_BIOLOAD: f64 = 1.0;

/// Biological parameters for one species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesParameters {
    /// Common name, with the casing the caller supplied.
    pub common_name: String,
    /// Maximum adult length in centimeters.
    pub max_size_cm: f64,
    /// Smallest tank the species should be kept in, in liters.
    pub minimum_tank_size_liters: f64,
    /// Waste/metabolic load relative to a baseline fish. Always `> 0`.
    pub bioload: f64,
}

impl SpeciesParameters {
    /// Builds a record using the fallback value for every field.
    #[must_use]
    pub fn with_defaults(common_name: impl Into<String>) -> Self {
        Self {
            common_name: common_name.into(),
            max_size_cm: DEFAULT_MAX_SIZE_CM,
            minimum_tank_size_liters: DEFAULT_MINIMUM_TANK_SIZE_LITERS,
            bioload: DEFAULT_BIOLOAD,
        }
    }

    /// Case-insensitive identity key for this species.
    #[must_use]
    pub fn key(&self) -> String {
        species_key(&self.common_name)
    }
}

/// Normalizes a common name into its case-insensitive identity key.
#[must_use]
pub fn species_key(common_name: &str) -> String {
    common_name.trim().to_lowercase()
}

/// A numeric field of [`SpeciesParameters`] that can fall back to a default.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ParameterField {
    /// [`SpeciesParameters::max_size_cm`]
    MaxSize,
    /// [`SpeciesParameters::minimum_tank_size_liters`]
    MinimumTankSize,
    /// [`SpeciesParameters::bioload`]
    Bioload,
}

/// Where the values of a resolved [`SpeciesParameters`] came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ParameterProvenance {
    /// Every field came from the data source.
    Catalog,
    /// The record was found but some fields were missing or unparsable.
    PartialDefaults {
        /// Fields that were filled from the fallback defaults.
        fields: Vec<ParameterField>,
    },
    /// No record exists under any casing; all fields are defaults.
    NotFound,
    /// The data source failed or timed out; all fields are defaults.
    Unavailable {
        /// Description of the failure.
        reason: String,
    },
}

impl ParameterProvenance {
    /// Returns `true` when at least one field is a fallback default.
    #[must_use]
    pub const fn uses_defaults(&self) -> bool {
        !matches!(self, Self::Catalog)
    }
}

/// Species parameters together with their provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedSpecies {
    /// The complete parameter record.
    pub parameters: SpeciesParameters,
    /// How the record was assembled.
    pub provenance: ParameterProvenance,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_fallbacks() {
        let params = SpeciesParameters::with_defaults("Mystery Fish");
        assert!((params.max_size_cm - 10.0).abs() < f64::EPSILON);
        assert!((params.minimum_tank_size_liters - 20.0).abs() < f64::EPSILON);
        assert!((params.bioload - 1.0).abs() < f64::EPSILON);
        assert_eq!(params.common_name, "Mystery Fish");
    }

    #[test]
    fn species_key_is_case_and_whitespace_insensitive() {
        assert_eq!(species_key("  Neon Tetra "), species_key("NEON TETRA"));
    }

    #[test]
    fn provenance_reports_default_usage() {
        assert!(!ParameterProvenance::Catalog.uses_defaults());
        assert!(ParameterProvenance::NotFound.uses_defaults());
        assert!(
            ParameterProvenance::PartialDefaults {
                fields: vec![ParameterField::Bioload]
            }
            .uses_defaults()
        );
    }

    #[test]
    fn provenance_serializes_with_kind_tag() {
        let json = serde_json::to_value(ParameterProvenance::PartialDefaults {
            fields: vec![ParameterField::MaxSize],
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "kind": "partialDefaults", "fields": ["max_size"] })
        );
    }
}
