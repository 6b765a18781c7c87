//! Lenient parsing of raw species records.
//!
//! Catalog rows are hand-maintained and arrive in several shapes:
//!
//! - numbers as JSON numbers or as strings, sometimes with units
//!   (`"12 cm"`, `"54L"`, `"5-7 cm"`)
//! - single-element arrays (`[12]`) or wrapped values (`{"value": 12}`)
//! - field names in `snake_case`, `camelCase`, or with unit suffixes
//!
//! Everything is reduced to `Option<f64>` per field here so that nothing
//! untyped leaves this module.

use std::sync::LazyLock;

use aquastock_species_models::{
    DEFAULT_BIOLOAD, DEFAULT_MAX_SIZE_CM, DEFAULT_MINIMUM_TANK_SIZE_LITERS, ParameterField,
    ParameterProvenance, ResolvedSpecies, SpeciesParameters,
};
use regex::Regex;
use serde_json::Value;

/// Leading signed decimal number, accepting `,` as the decimal separator.
static LEADING_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?[0-9]+(?:[.,][0-9]+)?").unwrap_or_else(|_| unreachable!())
});

/// Leading number with `,` thousands separators (`1,000`, `12,500.5`).
static GROUPED_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?[0-9]{1,3}(?:,[0-9]{3})+(?:\.[0-9]+)?").unwrap_or_else(|_| unreachable!())
});

/// Accepted keys for the maximum adult size, normalized.
const MAX_SIZE_KEYS: &[&str] = &["maxsize", "maxsizecm", "maximumsize", "adultsize"];

/// Accepted keys for the minimum tank size, normalized.
const MIN_TANK_KEYS: &[&str] = &[
    "minimumtanksize",
    "minimumtanksizel",
    "minimumtanksizeliters",
    "mintanksize",
    "mintanksizel",
    "mintanksizeliters",
];

/// Accepted keys for the bioload multiplier, normalized.
const BIOLOAD_KEYS: &[&str] = &["bioload"];

/// Accepted keys for the common name, normalized.
const NAME_KEYS: &[&str] = &["commonname", "name"];

/// Extracts a number from a loosely typed JSON value.
///
/// Returns `None` for `null`, booleans, empty arrays, strings without a
/// leading number, and non-finite results.
#[must_use]
pub fn parse_numeric(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_leading_number(s.trim()),
        Value::Array(items) => items.first().and_then(parse_numeric),
        Value::Object(map) => map
            .get("value")
            .or_else(|| map.get("amount"))
            .and_then(parse_numeric),
        Value::Null | Value::Bool(_) => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Reads the number at the start of `text`. A comma followed by exactly
/// three digits separates thousands; any other comma is a decimal comma.
fn parse_leading_number(text: &str) -> Option<f64> {
    if let Some(m) = GROUPED_NUMBER_RE.find(text)
        && !text[m.end()..].starts_with(|c: char| c.is_ascii_digit())
    {
        return m.as_str().replace(',', "").parse().ok();
    }
    LEADING_NUMBER_RE
        .find(text)
        .and_then(|m| m.as_str().replace(',', ".").parse().ok())
}

/// Normalizes a field name for alias matching: lowercase, with `_`, `-`,
/// `(`, `)`, and spaces removed.
fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' ' | '(' | ')'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Looks up the first field of `record` whose normalized name is in
/// `aliases`.
#[must_use]
pub fn find_field<'a>(record: &'a Value, aliases: &[&str]) -> Option<&'a Value> {
    let map = record.as_object()?;
    map.iter()
        .find(|(key, _)| aliases.contains(&normalize_key(key).as_str()))
        .map(|(_, value)| value)
}

/// Reads the common name stored in a raw record, if any.
#[must_use]
pub fn record_name(record: &Value) -> Option<&str> {
    find_field(record, NAME_KEYS)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// The typed numeric fields of one raw record, before defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParsedFields {
    /// Maximum size in centimeters, when present and `>= 0`.
    pub max_size_cm: Option<f64>,
    /// Minimum tank size in liters, when present and `>= 0`.
    pub minimum_tank_size_liters: Option<f64>,
    /// Bioload multiplier, when present and `> 0`.
    pub bioload: Option<f64>,
}

/// Extracts the typed fields from a raw record.
#[must_use]
pub fn parse_fields(record: &Value) -> ParsedFields {
    ParsedFields {
        max_size_cm: find_field(record, MAX_SIZE_KEYS)
            .and_then(parse_numeric)
            .filter(|v| *v >= 0.0),
        minimum_tank_size_liters: find_field(record, MIN_TANK_KEYS)
            .and_then(parse_numeric)
            .filter(|v| *v >= 0.0),
        bioload: find_field(record, BIOLOAD_KEYS)
            .and_then(parse_numeric)
            .filter(|v| *v > 0.0),
    }
}

/// Builds a complete [`ResolvedSpecies`] from a raw record, substituting
/// the fallback default for each field that is missing or unusable.
#[must_use]
pub fn resolve_record(common_name: &str, record: &Value) -> ResolvedSpecies {
    let fields = parse_fields(record);
    let mut defaulted = Vec::new();

    let max_size_cm = fields.max_size_cm.unwrap_or_else(|| {
        defaulted.push(ParameterField::MaxSize);
        DEFAULT_MAX_SIZE_CM
    });
    let minimum_tank_size_liters = fields.minimum_tank_size_liters.unwrap_or_else(|| {
        defaulted.push(ParameterField::MinimumTankSize);
        DEFAULT_MINIMUM_TANK_SIZE_LITERS
    });
    let bioload = fields.bioload.unwrap_or_else(|| {
        defaulted.push(ParameterField::Bioload);
        DEFAULT_BIOLOAD
    });

    let provenance = if defaulted.is_empty() {
        ParameterProvenance::Catalog
    } else {
        log::debug!("species '{common_name}': defaulted fields {defaulted:?}");
        ParameterProvenance::PartialDefaults { fields: defaulted }
    };

    ResolvedSpecies {
        parameters: SpeciesParameters {
            common_name: common_name.to_string(),
            max_size_cm,
            minimum_tank_size_liters,
            bioload,
        },
        provenance,
    }
}
