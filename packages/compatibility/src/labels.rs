//! Normalization of oracle classification labels.

use aquastock_compatibility_models::CompatibilityLevel;

use crate::CompatibilityError;

/// Lowercases a label and collapses `_`, `-` and runs of whitespace into
/// single spaces.
fn canonical(label: &str) -> String {
    label
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Maps an oracle label onto a [`CompatibilityLevel`].
///
/// Known synonyms: `"Not Compatible"` and `"Incompatible"`,
/// `"Conditional"` and `"Conditionally Compatible"`, `"Compatible"`.
/// Matching ignores case and separators.
///
/// # Errors
///
/// Returns [`CompatibilityError::UnrecognizedLabel`] for any other label.
/// Unknown labels are never read as compatible.
pub fn parse_label(label: &str) -> Result<CompatibilityLevel, CompatibilityError> {
    match canonical(label).as_str() {
        "not compatible" | "incompatible" => Ok(CompatibilityLevel::Incompatible),
        "conditional" | "conditionally compatible" => Ok(CompatibilityLevel::Conditional),
        "compatible" => Ok(CompatibilityLevel::Compatible),
        _ => Err(CompatibilityError::UnrecognizedLabel {
            label: label.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_documented_synonyms() {
        assert_eq!(
            parse_label("Not Compatible").unwrap(),
            CompatibilityLevel::Incompatible
        );
        assert_eq!(
            parse_label("Conditional").unwrap(),
            CompatibilityLevel::Conditional
        );
        assert_eq!(
            parse_label("Conditionally Compatible").unwrap(),
            CompatibilityLevel::Conditional
        );
        assert_eq!(
            parse_label("Compatible").unwrap(),
            CompatibilityLevel::Compatible
        );
    }

    #[test]
    fn ignores_case_and_separators() {
        assert_eq!(
            parse_label("  NOT_COMPATIBLE ").unwrap(),
            CompatibilityLevel::Incompatible
        );
        assert_eq!(
            parse_label("conditionally-compatible").unwrap(),
            CompatibilityLevel::Conditional
        );
        assert_eq!(
            parse_label("INCOMPATIBLE").unwrap(),
            CompatibilityLevel::Incompatible
        );
    }

    #[test]
    fn unknown_labels_are_errors() {
        for label in ["", "maybe", "mostly compatible", "unknown"] {
            assert!(matches!(
                parse_label(label),
                Err(CompatibilityError::UnrecognizedLabel { .. })
            ));
        }
    }
}
