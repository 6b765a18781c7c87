#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Stocking recommendations and tank shape checks.
//!
//! Everything here is synchronous and pure. The numeric constants live in
//! [`StockingRules`], loaded from an embedded TOML file or an override.

pub mod recommender;
pub mod rules;
pub mod shape;

pub use recommender::{RecommendationBasis, StockingRecommendation, recommend, recommend_quantity};
pub use rules::{RulesError, StockingRules};
pub use shape::{CheckMode, ShapeIncompatibility, check_selection, check_species};
