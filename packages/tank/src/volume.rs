//! Tank volume calculation.

use std::f64::consts::PI;

use aquastock_tank_models::{TankDimensions, TankShape};

use crate::units::{cubic_centimeters_to_liters, to_centimeters};

/// Volume assigned to every bowl regardless of its measurements.
pub const BOWL_VOLUME_LITERS: f64 = 10.0;

/// Computes the water volume of a tank in liters using the standard
/// fixed bowl volume.
#[must_use]
pub fn calculate_volume_liters(dimensions: &TankDimensions) -> f64 {
    calculate_volume_liters_with(dimensions, BOWL_VOLUME_LITERS)
}

/// Computes the water volume of a tank in liters, using `bowl_liters` for
/// [`TankShape::Bowl`].
///
/// Rectangles multiply all three extents. Cylinders use the `width` slot
/// as the diameter and the `length` slot as the height.
#[must_use]
pub fn calculate_volume_liters_with(dimensions: &TankDimensions, bowl_liters: f64) -> f64 {
    let unit = dimensions.unit;

    let cubic_cm = match dimensions.shape {
        TankShape::Bowl => return bowl_liters,
        TankShape::Rectangle => {
            let length = to_centimeters(dimensions.length, unit);
            let width = to_centimeters(dimensions.width, unit);
            let height = to_centimeters(dimensions.height, unit);
            length * width * height
        }
        TankShape::Cylinder => {
            let radius = to_centimeters(dimensions.diameter(), unit) / 2.0;
            let height = to_centimeters(dimensions.cylinder_height(), unit);
            PI * radius * radius * height
        }
    };

    let liters = cubic_centimeters_to_liters(cubic_cm);
    log::trace!(
        "volume: shape={} unit={} -> {liters:.3} L",
        dimensions.shape,
        unit
    );
    liters
}
