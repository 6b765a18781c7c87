//! Tank shape suitability per species.
//!
//! Two limit tables drive two checks. The live check produces inline
//! warnings while a selection is edited. The pre-calculation check runs
//! before recommendations and its flags block the calculation.

use aquastock_species_models::SpeciesParameters;
use aquastock_tank::format::{format_number, format_volume};
use aquastock_tank::TankShape;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::rules::{ShapeLimit, StockingRules};

/// Which limits table a check uses.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CheckMode {
    /// Inline, non-blocking warnings.
    Live,
    /// Blocking check before recommendations are computed.
    PreCalculation,
}

/// One species flagged as unsuitable for the tank's shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeIncompatibility {
    /// Display name of the flagged species.
    pub species_name: String,
    /// Shape the species was checked against.
    pub shape: TankShape,
    /// Human-readable explanation.
    pub reason: String,
}

/// Noun used for a shape in reason strings.
#[must_use]
pub const fn shape_noun(shape: TankShape) -> &'static str {
    match shape {
        TankShape::Bowl => "bowl",
        TankShape::Rectangle => "rectangular tank",
        TankShape::Cylinder => "cylindrical tank",
    }
}

fn violations(limit: &ShapeLimit, params: &SpeciesParameters, volume: f64) -> Vec<String> {
    let mut out = Vec::new();

    if let Some(max) = limit.max_size_cm
        && params.max_size_cm > max
    {
        out.push(format!(
            "grows to {} cm (limit {} cm)",
            format_number(params.max_size_cm),
            format_number(max)
        ));
    }

    let min_tank = params.minimum_tank_size_liters;
    if let Some(max) = limit.max_minimum_tank_liters
        && min_tank > max
    {
        out.push(format!(
            "needs at least {} L (limit {} L)",
            format_number(min_tank),
            format_number(max)
        ));
    } else if limit.minimum_tank_within_volume && min_tank > volume {
        out.push(format!("needs at least {} L", format_number(min_tank)));
    }

    out
}

/// Checks one species against `shape`.
///
/// Returns `None` when the species fits.
#[must_use]
pub fn check_species(
    rules: &StockingRules,
    mode: CheckMode,
    shape: TankShape,
    tank_volume_liters: f64,
    params: &SpeciesParameters,
) -> Option<ShapeIncompatibility> {
    let limit = rules.shape.for_mode(mode).for_shape(shape);
    let problems = violations(limit, params, tank_volume_liters);
    if problems.is_empty() {
        return None;
    }

    let reason = format!(
        "{} is not suited to a {} of {}: {}",
        params.common_name,
        shape_noun(shape),
        format_volume(tank_volume_liters),
        problems.join(" and ")
    );
    log::debug!("{mode} shape check: {reason}");

    Some(ShapeIncompatibility {
        species_name: params.common_name.clone(),
        shape,
        reason,
    })
}

/// Checks every species against `shape`, returning only the flagged ones
/// in input order.
#[must_use]
pub fn check_selection<'a>(
    rules: &StockingRules,
    mode: CheckMode,
    shape: TankShape,
    tank_volume_liters: f64,
    species: impl IntoIterator<Item = &'a SpeciesParameters>,
) -> Vec<ShapeIncompatibility> {
    species
        .into_iter()
        .filter_map(|params| check_species(rules, mode, shape, tank_volume_liters, params))
        .collect()
}
