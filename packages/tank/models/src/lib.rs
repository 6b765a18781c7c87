#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Tank shape, measurement unit, and dimension types.
//!
//! Dimensions arrive from free-form user input, so every numeric slot is
//! parsed leniently: missing, empty, or unparsable values become `0.0`
//! rather than an error. Downstream code treats a zero volume on a
//! non-bowl tank as "dimensions incomplete".

use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// The geometric shape of a tank.
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
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TankShape {
    /// A small fixed-size bowl. Dimensions are ignored.
    Bowl,
    /// A rectangular prism.
    #[serde(alias = "rectangular")]
    #[strum(to_string = "rectangle", serialize = "rectangular")]
    Rectangle,
    /// An upright cylinder. `width` is the diameter, `length` is the height.
    #[serde(alias = "cylindrical")]
    #[strum(to_string = "cylinder", serialize = "cylindrical")]
    Cylinder,
}

impl TankShape {
    /// Returns `true` when the shape's volume does not depend on its
    /// dimensions.
    #[must_use]
    pub const fn is_fixed_volume(self) -> bool {
        matches!(self, Self::Bowl)
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Bowl, Self::Rectangle, Self::Cylinder]
    }
}

/// Linear measurement system used for tank dimensions.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum LengthUnit {
    /// Metric centimeters.
    #[default]
    #[serde(rename = "cm", alias = "centimeters", alias = "CM")]
    #[strum(to_string = "cm", serialize = "centimeters", serialize = "centimeter")]
    Centimeters,
    /// Imperial inches.
    #[serde(rename = "in", alias = "inches", alias = "IN", alias = "inch")]
    #[strum(to_string = "in", serialize = "inches", serialize = "inch")]
    Inches,
}

impl LengthUnit {
    /// Number of centimeters in one inch.
    pub const CENTIMETERS_PER_INCH: f64 = 2.54;

    /// Short suffix used when labelling a value in this unit.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Centimeters => "cm",
            Self::Inches => "in",
        }
    }
}

/// Raw tank measurements in the user's selected unit.
///
/// For [`TankShape::Rectangle`] all three slots are linear extents. For
/// [`TankShape::Cylinder`] `width` is the diameter and `length` is the
/// height of the cylinder. For [`TankShape::Bowl`] the slots are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TankDimensions {
    /// Tank shape.
    pub shape: TankShape,
    /// Unit the three measurements are expressed in.
    #[serde(default)]
    pub unit: LengthUnit,
    /// Length (cylinder: height).
    #[serde(default, deserialize_with = "lenient_dimension")]
    pub length: f64,
    /// Width (cylinder: diameter).
    #[serde(default, deserialize_with = "lenient_dimension")]
    pub width: f64,
    /// Height (unused for cylinders).
    #[serde(default, deserialize_with = "lenient_dimension")]
    pub height: f64,
}

impl TankDimensions {
    /// Creates dimensions from already-numeric measurements.
    ///
    /// Non-finite values are replaced with `0.0`.
    #[must_use]
    pub const fn new(
        shape: TankShape,
        unit: LengthUnit,
        length: f64,
        width: f64,
        height: f64,
    ) -> Self {
        Self {
            shape,
            unit,
            length: finite_or_zero(length),
            width: finite_or_zero(width),
            height: finite_or_zero(height),
        }
    }

    /// Creates dimensions from raw text fields, treating anything missing
    /// or unparsable as `0.0`.
    #[must_use]
    pub fn from_raw(
        shape: TankShape,
        unit: LengthUnit,
        length: Option<&str>,
        width: Option<&str>,
        height: Option<&str>,
    ) -> Self {
        Self::new(
            shape,
            unit,
            parse_dimension(length),
            parse_dimension(width),
            parse_dimension(height),
        )
    }

    /// A bowl with all measurement slots zeroed.
    #[must_use]
    pub const fn bowl() -> Self {
        Self::new(TankShape::Bowl, LengthUnit::Centimeters, 0.0, 0.0, 0.0)
    }

    /// Cylinder diameter (the `width` slot).
    #[must_use]
    pub const fn diameter(&self) -> f64 {
        self.width
    }

    /// Cylinder height (the `length` slot).
    #[must_use]
    pub const fn cylinder_height(&self) -> f64 {
        self.length
    }
}

/// Parses one dimension field, returning `0.0` for missing, blank,
/// unparsable, or non-finite input.
///
/// Commas grouping digits in threes (`"1,200"`) are thousands
/// separators; any other comma is a decimal comma (`"40,5"`).
#[must_use]
pub fn parse_dimension(raw: Option<&str>) -> f64 {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| normalize_separators(s).parse::<f64>().ok())
        .map_or(0.0, finite_or_zero)
}

fn normalize_separators(value: &str) -> String {
    if has_thousands_groups(value) {
        value.replace(',', "")
    } else {
        value.replace(',', ".")
    }
}

fn has_thousands_groups(value: &str) -> bool {
    let unsigned = value.strip_prefix(['+', '-']).unwrap_or(value);
    let (integer, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if fraction.contains(',') {
        return false;
    }
    let mut groups = integer.split(',');
    let head = groups.next().unwrap_or_default();
    let rest: Vec<&str> = groups.collect();

    let all_digits = |g: &str| g.bytes().all(|b| b.is_ascii_digit());
    !rest.is_empty()
        && (1..=3).contains(&head.len())
        && all_digits(head)
        && rest.iter().all(|g| g.len() == 3 && all_digits(g))
}

const fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDimension {
    Number(f64),
    Text(String),
    Missing(()),
}

fn lenient_dimension<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawDimension::deserialize(deserializer)? {
        RawDimension::Number(value) => finite_or_zero(value),
        RawDimension::Text(text) => parse_dimension(Some(&text)),
        RawDimension::Missing(()) => 0.0,
    })
}

#[cfg(test)]
mod tests {
    use std::str::FromStr as _;

    use super::*;

    #[test]
    fn parse_dimension_defaults_to_zero() {
        assert!(parse_dimension(None).abs() < f64::EPSILON);
        assert!(parse_dimension(Some("")).abs() < f64::EPSILON);
        assert!(parse_dimension(Some("   ")).abs() < f64::EPSILON);
        assert!(parse_dimension(Some("abc")).abs() < f64::EPSILON);
        assert!(parse_dimension(Some("NaN")).abs() < f64::EPSILON);
        assert!(parse_dimension(Some("inf")).abs() < f64::EPSILON);
    }

    #[test]
    fn parse_dimension_accepts_decimal_comma() {
        assert!((parse_dimension(Some(" 40.5 ")) - 40.5).abs() < 1e-9);
        assert!((parse_dimension(Some("40,5")) - 40.5).abs() < 1e-9);
    }

    #[test]
    fn parse_dimension_strips_thousands_separators() {
        assert!((parse_dimension(Some("1,200")) - 1200.0).abs() < 1e-9);
        assert!((parse_dimension(Some("1,200.5")) - 1200.5).abs() < 1e-9);
        assert!((parse_dimension(Some("12,000,000")) - 12_000_000.0).abs() < 1e-9);
        assert!((parse_dimension(Some("1,25")) - 1.25).abs() < 1e-9);
        assert!((parse_dimension(Some("1,2000")) - 1.2).abs() < 1e-9);
    }

    #[test]
    fn shape_parses_case_insensitively() {
        assert_eq!(TankShape::from_str("BOWL").unwrap(), TankShape::Bowl);
        assert_eq!(
            TankShape::from_str("Rectangular").unwrap(),
            TankShape::Rectangle
        );
        assert_eq!(
            TankShape::from_str("cylinder").unwrap(),
            TankShape::Cylinder
        );
        assert!(TankShape::from_str("hexagon").is_err());
    }

    #[test]
    fn unit_parses_long_and_short_forms() {
        assert_eq!(LengthUnit::from_str("CM").unwrap(), LengthUnit::Centimeters);
        assert_eq!(LengthUnit::from_str("inches").unwrap(), LengthUnit::Inches);
        assert_eq!(LengthUnit::Inches.to_string(), "in");
    }

    #[test]
    fn deserializes_mixed_dimension_encodings() {
        let dims: TankDimensions = serde_json::from_value(serde_json::json!({
            "shape": "rectangle",
            "unit": "cm",
            "length": "100",
            "width": 40,
            "height": null
        }))
        .unwrap();
        assert_eq!(dims.shape, TankShape::Rectangle);
        assert!((dims.length - 100.0).abs() < 1e-9);
        assert!((dims.width - 40.0).abs() < 1e-9);
        assert!(dims.height.abs() < f64::EPSILON);
    }

    #[test]
    fn missing_fields_default_to_zero_centimeters() {
        let dims: TankDimensions =
            serde_json::from_value(serde_json::json!({ "shape": "bowl" })).unwrap();
        assert_eq!(dims, TankDimensions::bowl());
    }

    #[test]
    fn cylinder_slots_map_to_diameter_and_height() {
        let dims = TankDimensions::new(
            TankShape::Cylinder,
            LengthUnit::Centimeters,
            50.0,
            30.0,
            0.0,
        );
        assert!((dims.diameter() - 30.0).abs() < 1e-9);
        assert!((dims.cylinder_height() - 50.0).abs() < 1e-9);
    }
}
