//! Linear and volumetric unit conversion.

use aquastock_tank_models::LengthUnit;

/// Cubic centimeters in one liter.
pub const CUBIC_CENTIMETERS_PER_LITER: f64 = 1000.0;

/// Liters in one US gallon.
pub const LITERS_PER_US_GALLON: f64 = 3.785_411_784;

/// Converts a linear measurement to centimeters.
///
/// Negative input is passed through unchanged; validating physical
/// plausibility is the caller's job.
#[must_use]
pub fn to_centimeters(value: f64, unit: LengthUnit) -> f64 {
    match unit {
        LengthUnit::Centimeters => value,
        LengthUnit::Inches => value * LengthUnit::CENTIMETERS_PER_INCH,
    }
}

/// Converts a centimeter measurement into `unit`.
#[must_use]
pub fn from_centimeters(value_cm: f64, unit: LengthUnit) -> f64 {
    match unit {
        LengthUnit::Centimeters => value_cm,
        LengthUnit::Inches => value_cm / LengthUnit::CENTIMETERS_PER_INCH,
    }
}

/// Converts a volume in cubic centimeters to liters.
#[must_use]
pub fn cubic_centimeters_to_liters(cc: f64) -> f64 {
    cc / CUBIC_CENTIMETERS_PER_LITER
}

/// Converts liters to US gallons.
#[must_use]
pub fn liters_to_us_gallons(liters: f64) -> f64 {
    liters / LITERS_PER_US_GALLON
}
