//! Display labels for volumes and dimensions.

use aquastock_tank_models::{TankDimensions, TankShape};

use crate::units::liters_to_us_gallons;

/// Formats a volume with one decimal place and a liter suffix
/// (e.g. `"160.0 L"`).
#[must_use]
pub fn format_volume(liters: f64) -> String {
    format!("{liters:.1} L")
}

/// Formats a volume in liters with its US gallon equivalent
/// (e.g. `"160.0 L (42.3 gal)"`).
#[must_use]
pub fn format_volume_with_gallons(liters: f64) -> String {
    format!("{liters:.1} L ({:.1} gal)", liters_to_us_gallons(liters))
}

/// Describes the entered measurements in the user's unit.
///
/// Rectangles render as `"L × W × H cm"`, cylinders as
/// `"Ø D × H in"`, and bowls simply as `"bowl"`.
#[must_use]
pub fn dimension_label(dimensions: &TankDimensions) -> String {
    let suffix = dimensions.unit.suffix();
    match dimensions.shape {
        TankShape::Bowl => "bowl".to_string(),
        TankShape::Rectangle => format!(
            "{} × {} × {} {suffix}",
            format_number(dimensions.length),
            format_number(dimensions.width),
            format_number(dimensions.height),
        ),
        TankShape::Cylinder => format!(
            "Ø {} × {} {suffix}",
            format_number(dimensions.diameter()),
            format_number(dimensions.cylinder_height()),
        ),
    }
}

/// Renders whole numbers without a trailing `.0` and everything else with
/// up to two decimals.
#[must_use]
pub fn format_number(value: f64) -> String {
    let rounded = format!("{value:.2}");
    rounded
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

#[cfg(test)]
mod tests {
    use aquastock_tank_models::LengthUnit;

    use super::*;

    #[test]
    fn volume_uses_one_decimal() {
        assert_eq!(format_volume(160.0), "160.0 L");
        assert_eq!(format_volume(35.342_917), "35.3 L");
    }

    #[test]
    fn volume_with_gallons() {
        assert_eq!(format_volume_with_gallons(160.0), "160.0 L (42.3 gal)");
    }

    #[test]
    fn rectangle_label() {
        let dims = TankDimensions::new(
            TankShape::Rectangle,
            LengthUnit::Centimeters,
            100.0,
            40.0,
            40.5,
        );
        assert_eq!(dimension_label(&dims), "100 × 40 × 40.5 cm");
    }

    #[test]
    fn cylinder_label() {
        let dims = TankDimensions::new(TankShape::Cylinder, LengthUnit::Inches, 20.0, 12.0, 0.0);
        assert_eq!(dimension_label(&dims), "Ø 12 × 20 in");
    }

    #[test]
    fn numbers_drop_trailing_zeros() {
        assert_eq!(format_number(54.0), "54");
        assert_eq!(format_number(7.5), "7.5");
        assert_eq!(format_number(1.0 / 3.0), "0.33");
    }

    #[test]
    fn bowl_label() {
        assert_eq!(dimension_label(&TankDimensions::bowl()), "bowl");
    }
}
