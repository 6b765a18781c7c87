#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Tank geometry for the aquastock calculator.
//!
//! Converts user-entered dimensions into centimeters and computes the
//! water volume in liters for each supported [`TankShape`]. All functions
//! here are pure and infallible: missing measurements are already `0.0`
//! by the time they reach this crate, and a zero volume is a valid
//! result that callers interpret as "dimensions incomplete".

pub mod format;
pub mod units;
pub mod volume;

pub use aquastock_tank_models::{LengthUnit, TankDimensions, TankShape};
pub use volume::{BOWL_VOLUME_LITERS, calculate_volume_liters, calculate_volume_liters_with};
