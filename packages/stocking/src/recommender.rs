//! Recommended quantity per species.
//!
//! Each species is evaluated on its own against the shared tank volume.
//! Territorial species are capped at one. Otherwise capacity comes from
//! the species' minimum tank size, or failing that from a size-banded
//! per-fish volume, reduced for heavy bioloads and clamped twice: first
//! to the inner bounds, then to the outer bounds.

use aquastock_species_models::{FishSelection, ResolvedSpecies, SpeciesParameters, species_key};
use aquastock_tank::LengthUnit;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::rules::{RecommendationRules, SizeHeuristic, StockingRules};

/// Which rule produced a recommendation.
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
pub enum RecommendationBasis {
    /// Name matched a territorial keyword.
    Territorial,
    /// Tank volume divided by the species' minimum tank size.
    MinimumTankSize,
    /// Tank volume divided by a per-fish volume derived from adult size.
    SizeHeuristic,
    /// No usable size or tank data.
    Default,
}

/// The recommended quantity for one species.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockingRecommendation {
    /// Display name from the selection.
    pub species_name: String,
    /// Quantity the user asked for.
    pub current_quantity: u32,
    /// Quantity the tank supports.
    pub recommended_quantity: u32,
    /// Rule that produced `recommended_quantity`.
    pub basis: RecommendationBasis,
    /// Whether a clamp bound changed the computed value.
    pub clamped: bool,
}

impl StockingRecommendation {
    /// Whether the user asked for more fish than recommended.
    #[must_use]
    pub const fn is_overstocked(&self) -> bool {
        self.current_quantity > self.recommended_quantity
    }
}

/// Whether `common_name` contains any territorial keyword, ignoring case.
#[must_use]
pub fn is_territorial(rules: &RecommendationRules, common_name: &str) -> bool {
    let name = common_name.to_lowercase();
    rules
        .territorial_keywords
        .iter()
        .any(|keyword| name.contains(&keyword.to_lowercase()))
}

/// Liters of water one fish of `size_cm` needs.
///
/// The base volume is `liters_per_inch` per inch of length, scaled by the
/// multiplier of the first band whose bound is not below `size_cm`, and
/// clamped to the per-fish bounds.
#[must_use]
pub fn volume_per_fish(heuristic: &SizeHeuristic, size_cm: f64) -> f64 {
    let inches = size_cm / LengthUnit::CENTIMETERS_PER_INCH;
    let base = inches * heuristic.liters_per_inch;
    let multiplier = heuristic
        .bands
        .iter()
        .find(|band| size_cm <= band.max_size_cm)
        .map_or(heuristic.fallback_multiplier, |band| band.multiplier);

    (base * multiplier).clamp(heuristic.min_volume_per_fish, heuristic.max_volume_per_fish)
}

/// Converts a non-negative fish count to `u32`, saturating.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_count(value: f64) -> u32 {
    if value.is_nan() || value <= 0.0 {
        0
    } else if value >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        value.floor() as u32
    }
}

/// Divides by `bioload` when it is above the baseline of `1.0`.
fn adjust_for_bioload(count: f64, bioload: f64) -> f64 {
    if bioload > 1.0 {
        (count / bioload).floor()
    } else {
        count
    }
}

/// The recommended quantity for one species and which rule produced it.
#[must_use]
pub fn recommend_quantity(
    rules: &StockingRules,
    tank_volume_liters: f64,
    params: &SpeciesParameters,
) -> (u32, RecommendationBasis, bool) {
    let rec = &rules.recommendation;

    let (raw, basis, inner_clamp) = if is_territorial(rec, &params.common_name) {
        (1, RecommendationBasis::Territorial, false)
    } else if params.minimum_tank_size_liters > 0.0 {
        let max_fish = (tank_volume_liters / params.minimum_tank_size_liters).floor();
        (
            to_count(adjust_for_bioload(max_fish, params.bioload)),
            RecommendationBasis::MinimumTankSize,
            true,
        )
    } else if params.max_size_cm > 0.0 {
        let per_fish = volume_per_fish(&rules.size_heuristic, params.max_size_cm);
        let max_fish = (tank_volume_liters / per_fish).floor();
        (
            to_count(adjust_for_bioload(max_fish, params.bioload)),
            RecommendationBasis::SizeHeuristic,
            true,
        )
    } else {
        (rec.default_quantity, RecommendationBasis::Default, false)
    };

    let inner = if inner_clamp {
        raw.clamp(rec.inner_min, rec.inner_max)
    } else {
        raw
    };
    let quantity = inner.clamp(rec.outer_min, rec.outer_max);

    log::debug!(
        "{}: {basis} -> {raw}, recommended {quantity}",
        params.common_name
    );

    (quantity, basis, quantity != raw)
}

/// Recommends a quantity for every species in `selection`.
///
/// `resolved` supplies the parameters; species without an entry use the
/// fallback defaults. Results follow the selection's order.
#[must_use]
pub fn recommend(
    rules: &StockingRules,
    tank_volume_liters: f64,
    selection: &FishSelection,
    resolved: &[ResolvedSpecies],
) -> Vec<StockingRecommendation> {
    selection
        .iter()
        .map(|entry| {
            let key = species_key(&entry.name);
            let fallback;
            let params = match resolved.iter().find(|r| r.parameters.key() == key) {
                Some(found) => &found.parameters,
                None => {
                    fallback = SpeciesParameters::with_defaults(entry.name.clone());
                    &fallback
                }
            };
            let (recommended_quantity, basis, clamped) =
                recommend_quantity(rules, tank_volume_liters, params);
            StockingRecommendation {
                species_name: entry.name.clone(),
                current_quantity: entry.quantity,
                recommended_quantity,
                basis,
                clamped,
            }
        })
        .collect()
}
