//! Tunable constants for recommendations and shape checks.
//!
//! The defaults are embedded from `rules/default.toml` at compile time.
//! Callers may load an override file with the same schema.

use std::path::Path;

use aquastock_compatibility_models::DuplicatePairPolicy;
use aquastock_tank::TankShape;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shape::CheckMode;

const DEFAULT_RULES_TOML: &str = include_str!("../rules/default.toml");

/// Errors raised while loading stocking rules.
#[derive(Debug, Error)]
pub enum RulesError {
    /// Reading a rules file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The rules file is not valid TOML for this schema.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The rules could not be rendered as TOML.
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The rules parsed but are inconsistent.
    #[error("Invalid stocking rules: {message}")]
    Invalid {
        /// What is wrong.
        message: String,
    },
}

/// Every constant used by the recommender and the shape checker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockingRules {
    /// Volume assigned to every bowl.
    pub bowl_volume_liters: f64,
    /// How repeated judgments for one pair are merged.
    pub duplicate_pairs: DuplicatePairPolicy,
    /// Quantity recommendation bounds and overrides.
    pub recommendation: RecommendationRules,
    /// Size-banded per-fish volume heuristic.
    pub size_heuristic: SizeHeuristic,
    /// Shape limits for both check modes.
    pub shape: ShapeRules,
}

/// Quantity recommendation bounds and overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationRules {
    /// Case-insensitive substrings marking species that are kept singly.
    pub territorial_keywords: Vec<String>,
    /// Quantity used when no size or tank data is usable.
    pub default_quantity: u32,
    /// Lower bound applied to capacity-based quantities.
    pub inner_min: u32,
    /// Upper bound applied to capacity-based quantities.
    pub inner_max: u32,
    /// Lower bound applied to every final quantity.
    pub outer_min: u32,
    /// Upper bound applied to every final quantity.
    pub outer_max: u32,
}

/// Per-fish volume estimated from adult size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeHeuristic {
    /// Base liters required per inch of fish length.
    pub liters_per_inch: f64,
    /// Smallest per-fish volume.
    pub min_volume_per_fish: f64,
    /// Largest per-fish volume.
    pub max_volume_per_fish: f64,
    /// Multiplier for fish larger than every band.
    pub fallback_multiplier: f64,
    /// Size bands in ascending `max_size_cm` order.
    pub bands: Vec<SizeBand>,
}

/// One size band: fish up to `max_size_cm` use `multiplier`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeBand {
    /// Inclusive upper size bound in centimeters.
    pub max_size_cm: f64,
    /// Multiplier applied to the base volume.
    pub multiplier: f64,
}

/// Shape limits for the live and pre-calculation checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeRules {
    /// Limits for inline, non-blocking warnings.
    pub live: ShapeLimits,
    /// Limits for the blocking check before a calculation.
    pub pre_calculation: ShapeLimits,
}

impl ShapeRules {
    /// Limits used by `mode`.
    #[must_use]
    pub const fn for_mode(&self, mode: CheckMode) -> &ShapeLimits {
        match mode {
            CheckMode::Live => &self.live,
            CheckMode::PreCalculation => &self.pre_calculation,
        }
    }
}

/// Limits per tank shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeLimits {
    /// Limits for bowls.
    pub bowl: ShapeLimit,
    /// Limits for rectangular tanks.
    pub rectangle: ShapeLimit,
    /// Limits for cylindrical tanks.
    pub cylinder: ShapeLimit,
}

impl ShapeLimits {
    /// Limits for `shape`.
    #[must_use]
    pub const fn for_shape(&self, shape: TankShape) -> &ShapeLimit {
        match shape {
            TankShape::Bowl => &self.bowl,
            TankShape::Rectangle => &self.rectangle,
            TankShape::Cylinder => &self.cylinder,
        }
    }
}

/// What makes a species unsuitable for one shape. An empty limit never
/// flags anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeLimit {
    /// Flag species whose adult size exceeds this.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size_cm: Option<f64>,
    /// Flag species whose minimum tank size exceeds this.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_minimum_tank_liters: Option<f64>,
    /// Flag species whose minimum tank size exceeds the tank's volume.
    pub minimum_tank_within_volume: bool,
}

impl StockingRules {
    /// Parses and validates rules from TOML.
    ///
    /// # Errors
    ///
    /// * [`RulesError::Toml`] if `toml` does not match the schema
    /// * [`RulesError::Invalid`] if the values are inconsistent
    pub fn from_toml_str(toml: &str) -> Result<Self, RulesError> {
        let rules: Self = toml::de::from_str(toml)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Loads rules from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError`] if the file cannot be read, parsed or
    /// validated.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RulesError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let rules = Self::from_toml_str(&contents)?;
        log::info!("Loaded stocking rules from {}", path.as_ref().display());
        Ok(rules)
    }

    /// Renders the rules as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::Serialize`] if serialization fails.
    pub fn to_toml_string(&self) -> Result<String, RulesError> {
        Ok(toml::to_string(self)?)
    }

    /// Checks the rules for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), RulesError> {
        let invalid = |message: String| Err(RulesError::Invalid { message });

        if !is_positive(self.bowl_volume_liters) {
            return invalid(format!(
                "bowl_volume_liters must be positive, got {}",
                self.bowl_volume_liters
            ));
        }

        let rec = &self.recommendation;
        if rec.inner_min > rec.inner_max {
            return invalid(format!(
                "inner bounds inverted: {} > {}",
                rec.inner_min, rec.inner_max
            ));
        }
        if rec.outer_min > rec.outer_max {
            return invalid(format!(
                "outer bounds inverted: {} > {}",
                rec.outer_min, rec.outer_max
            ));
        }

        let size = &self.size_heuristic;
        if !is_positive(size.liters_per_inch) {
            return invalid("liters_per_inch must be positive".to_string());
        }
        if !is_positive(size.min_volume_per_fish)
            || size.min_volume_per_fish > size.max_volume_per_fish
        {
            return invalid(format!(
                "per-fish volume bounds must satisfy 0 < min <= max, got [{}, {}]",
                size.min_volume_per_fish, size.max_volume_per_fish
            ));
        }
        if !is_positive(size.fallback_multiplier)
            || size.bands.iter().any(|b| !is_positive(b.multiplier))
        {
            return invalid("size multipliers must be positive".to_string());
        }
        if size
            .bands
            .windows(2)
            .any(|pair| pair[0].max_size_cm >= pair[1].max_size_cm)
        {
            return invalid("size bands must be in ascending max_size_cm order".to_string());
        }

        Ok(())
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

impl Default for StockingRules {
    /// The embedded default rules.
    ///
    /// # Panics
    ///
    /// Panics if the embedded `rules/default.toml` is malformed (it is
    /// checked by the tests below).
    fn default() -> Self {
        Self::from_toml_str(DEFAULT_RULES_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse embedded stocking rules: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_defaults_parse() {
        let rules = StockingRules::default();
        assert!((rules.bowl_volume_liters - 10.0).abs() < 1e-9);
        assert_eq!(rules.duplicate_pairs, DuplicatePairPolicy::Union);
        assert_eq!(rules.recommendation.territorial_keywords.len(), 6);
        assert_eq!(
            (rules.recommendation.inner_min, rules.recommendation.inner_max),
            (1, 10)
        );
        assert_eq!(
            (rules.recommendation.outer_min, rules.recommendation.outer_max),
            (0, 20)
        );
        assert_eq!(rules.size_heuristic.bands.len(), 5);
    }

    #[test]
    fn threshold_modes_differ_for_bowl_and_cylinder() {
        let rules = StockingRules::default();
        let live = rules.shape.for_mode(CheckMode::Live);
        let pre = rules.shape.for_mode(CheckMode::PreCalculation);

        assert_eq!(live.bowl.max_minimum_tank_liters, Some(10.0));
        assert_eq!(pre.bowl.max_minimum_tank_liters, Some(20.0));
        assert!(live.cylinder.minimum_tank_within_volume);
        assert_eq!(pre.cylinder.max_minimum_tank_liters, Some(200.0));
        assert!(live.rectangle.minimum_tank_within_volume);
        assert_eq!(pre.rectangle, ShapeLimit::default());
    }

    #[test]
    fn rules_survive_a_toml_round_trip() {
        let rules = StockingRules::default();
        let rendered = rules.to_toml_string().unwrap();
        assert_eq!(StockingRules::from_toml_str(&rendered).unwrap(), rules);
    }

    #[test]
    fn rejects_inverted_clamp_bounds() {
        let toml = DEFAULT_RULES_TOML.replace("inner_min = 1", "inner_min = 12");
        assert!(matches!(
            StockingRules::from_toml_str(&toml),
            Err(RulesError::Invalid { .. })
        ));
    }

    #[test]
    fn rejects_unsorted_bands() {
        let toml = DEFAULT_RULES_TOML.replace("max_size_cm = 12.0", "max_size_cm = 4.0");
        assert!(matches!(
            StockingRules::from_toml_str(&toml),
            Err(RulesError::Invalid { .. })
        ));
    }

    #[test]
    fn rejects_non_positive_bowl_volume() {
        let toml =
            DEFAULT_RULES_TOML.replace("bowl_volume_liters = 10.0", "bowl_volume_liters = 0.0");
        assert!(matches!(
            StockingRules::from_toml_str(&toml),
            Err(RulesError::Invalid { .. })
        ));
    }

    #[test]
    fn rejects_missing_tables() {
        assert!(matches!(
            StockingRules::from_toml_str("bowl_volume_liters = 10.0"),
            Err(RulesError::Toml(_))
        ));
    }
}
