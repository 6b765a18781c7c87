#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Pairwise and group compatibility types.
//!
//! Compatibility is tri-state with a strict severity order,
//! `Compatible < Conditional < Incompatible`, so a group's overall level
//! is simply the maximum over its pairs. Pairs are unordered and are
//! identified by a [`PairKey`] built from both lowercased names.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Separator placed between the two names of a [`PairKey`].
pub const PAIR_KEY_SEPARATOR: &str = "|";

/// Tri-state compatibility, ordered by severity.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
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
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CompatibilityLevel {
    /// No known conflict.
    #[default]
    Compatible,
    /// Can be kept together if the listed conditions are met.
    Conditional,
    /// Should not be kept together.
    Incompatible,
}

impl CompatibilityLevel {
    /// Human-readable label for display.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Compatible => "Compatible",
            Self::Conditional => "Conditional",
            Self::Incompatible => "Not Compatible",
        }
    }

    /// Returns all variants in ascending severity.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Compatible, Self::Conditional, Self::Incompatible]
    }
}

/// How repeated judgments for the same unordered pair are merged.
///
/// The expanded species list makes an oracle judge the same logical pair
/// several times (three Tiger Barbs and one Betta yield three
/// Tiger Barb/Betta pairings).
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DuplicatePairPolicy {
    /// Keep the first judgment seen for a pair and ignore the rest.
    KeepFirst,
    /// Take the most severe level across all judgments for a pair and
    /// union their reasons and conditions.
    #[default]
    Union,
}

/// Order-independent identifier for an unordered pair of species.
///
/// `PairKey::new(a, b) == PairKey::new(b, a)`, and names are compared
/// after trimming and lowercasing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairKey(String);

impl PairKey {
    /// Builds the canonical key for the pair `(a, b)`.
    #[must_use]
    pub fn new(a: &str, b: &str) -> Self {
        let mut names = [a.trim().to_lowercase(), b.trim().to_lowercase()];
        names.sort();
        Self(names.join(PAIR_KEY_SEPARATOR))
    }

    /// The key as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether both members of the pair are the same species.
    #[must_use]
    pub fn is_same_species(&self) -> bool {
        self.0
            .split_once(PAIR_KEY_SEPARATOR)
            .is_some_and(|(a, b)| a == b)
    }
}

impl std::fmt::Display for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One raw pairwise judgment as returned by a compatibility oracle.
///
/// `compatibility` is the oracle's label verbatim; it is normalized into
/// a [`CompatibilityLevel`] during aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairJudgment {
    /// The two species names, in the oracle's order.
    pub pair: [String; 2],
    /// The oracle's classification label.
    pub compatibility: String,
    /// Reasons given for the classification.
    #[serde(default)]
    pub reasons: Vec<String>,
    /// Conditions under which a conditional pair works.
    #[serde(default)]
    pub conditions: Vec<String>,
}

impl PairJudgment {
    /// Canonical key of the judged pair.
    #[must_use]
    pub fn key(&self) -> PairKey {
        PairKey::new(&self.pair[0], &self.pair[1])
    }
}

/// The normalized verdict for one unique pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityVerdict {
    /// Display names of the two species.
    pub species: [String; 2],
    /// Classification.
    pub level: CompatibilityLevel,
    /// Reasons, deduplicated in first-seen order.
    pub reasons: Vec<String>,
    /// Conditions, deduplicated in first-seen order. Empty unless
    /// `level` is [`CompatibilityLevel::Conditional`].
    pub conditions: Vec<String>,
}

impl CompatibilityVerdict {
    /// `"A + B"` label for display.
    #[must_use]
    pub fn pair_label(&self) -> String {
        format!("{} + {}", self.species[0], self.species[1])
    }
}

/// Aggregated compatibility of a whole group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupCompatibilityResult {
    /// Maximum severity across all unique pairs.
    pub overall_level: CompatibilityLevel,
    /// Reasons from the pairs at `overall_level`, deduplicated in
    /// first-seen order.
    pub reasons: Vec<String>,
    /// Verdict per unique pair.
    pub pairwise_results: BTreeMap<PairKey, CompatibilityVerdict>,
}

impl GroupCompatibilityResult {
    /// Pairs classified at exactly `level`.
    pub fn pairs_at(
        &self,
        level: CompatibilityLevel,
    ) -> impl Iterator<Item = &CompatibilityVerdict> {
        self.pairwise_results
            .values()
            .filter(move |verdict| verdict.level == level)
    }

    /// Pairs that should not be kept together.
    pub fn incompatible_pairs(&self) -> impl Iterator<Item = &CompatibilityVerdict> {
        self.pairs_at(CompatibilityLevel::Incompatible)
    }

    /// Pairs that work only under conditions.
    pub fn conditional_pairs(&self) -> impl Iterator<Item = &CompatibilityVerdict> {
        self.pairs_at(CompatibilityLevel::Conditional)
    }

    /// Whether the group verdict blocks the calculation.
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        self.overall_level == CompatibilityLevel::Incompatible
    }

    /// The view of this result that is shown to the user.
    ///
    /// A blocking result keeps only its incompatible pairs; conditional
    /// pairs found alongside them are dropped. Non-blocking results are
    /// returned unchanged.
    #[must_use]
    pub fn surfaced(&self) -> Self {
        if !self.is_blocking() {
            return self.clone();
        }
        Self {
            overall_level: self.overall_level,
            reasons: self.reasons.clone(),
            pairwise_results: self
                .pairwise_results
                .iter()
                .filter(|(_, verdict)| verdict.level == CompatibilityLevel::Incompatible)
                .map(|(key, verdict)| (key.clone(), verdict.clone()))
                .collect(),
        }
    }

    /// Every condition attached to a conditional pair, deduplicated in
    /// pair-key order.
    #[must_use]
    pub fn conditions(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for condition in self.conditional_pairs().flat_map(|v| v.conditions.iter()) {
            if !out.contains(condition) {
                out.push(condition.clone());
            }
        }
        out
    }

    /// One-line summary for logs and history entries.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.reasons.is_empty() {
            self.overall_level.label().to_string()
        } else {
            format!("{}: {}", self.overall_level.label(), self.reasons.join("; "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering() {
        assert!(CompatibilityLevel::Incompatible > CompatibilityLevel::Conditional);
        assert!(CompatibilityLevel::Conditional > CompatibilityLevel::Compatible);
        assert_eq!(
            CompatibilityLevel::all().iter().max(),
            Some(&CompatibilityLevel::Incompatible)
        );
    }

    #[test]
    fn pair_key_is_order_independent() {
        assert_eq!(
            PairKey::new("Tiger Barb", "Betta"),
            PairKey::new("betta", "TIGER BARB")
        );
        assert_eq!(PairKey::new("Tiger Barb", "Betta").as_str(), "betta|tiger barb");
    }

    #[test]
    fn pair_key_detects_same_species() {
        assert!(PairKey::new("Betta", "betta ").is_same_species());
        assert!(!PairKey::new("Betta", "Guppy").is_same_species());
    }

    #[test]
    fn judgment_defaults_missing_lists() {
        let judgment: PairJudgment = serde_json::from_value(serde_json::json!({
            "pair": ["Guppy", "Molly"],
            "compatibility": "Compatible"
        }))
        .unwrap();
        assert!(judgment.reasons.is_empty());
        assert!(judgment.conditions.is_empty());
        assert_eq!(judgment.key().as_str(), "guppy|molly");
    }

    fn verdict(
        a: &str,
        b: &str,
        level: CompatibilityLevel,
        conditions: &[&str],
    ) -> CompatibilityVerdict {
        CompatibilityVerdict {
            species: [a.to_string(), b.to_string()],
            level,
            reasons: vec![format!("{a} and {b}")],
            conditions: conditions.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn surfaced_blocking_result_drops_conditional_pairs() {
        let mut pairs = BTreeMap::new();
        pairs.insert(
            PairKey::new("Betta", "Tiger Barb"),
            verdict("Tiger Barb", "Betta", CompatibilityLevel::Incompatible, &[]),
        );
        pairs.insert(
            PairKey::new("Betta", "Guppy"),
            verdict(
                "Betta",
                "Guppy",
                CompatibilityLevel::Conditional,
                &["Plenty of cover"],
            ),
        );
        let result = GroupCompatibilityResult {
            overall_level: CompatibilityLevel::Incompatible,
            reasons: vec!["Tiger Barb and Betta".to_string()],
            pairwise_results: pairs,
        };

        let surfaced = result.surfaced();
        assert_eq!(surfaced.pairwise_results.len(), 1);
        assert_eq!(surfaced.incompatible_pairs().count(), 1);
        assert!(surfaced.conditions().is_empty());
        assert_eq!(result.conditions(), vec!["Plenty of cover"]);
    }

    #[test]
    fn surfaced_non_blocking_result_is_unchanged() {
        let mut pairs = BTreeMap::new();
        pairs.insert(
            PairKey::new("Betta", "Guppy"),
            verdict(
                "Betta",
                "Guppy",
                CompatibilityLevel::Conditional,
                &["Plenty of cover"],
            ),
        );
        let result = GroupCompatibilityResult {
            overall_level: CompatibilityLevel::Conditional,
            reasons: vec!["Betta and Guppy".to_string()],
            pairwise_results: pairs,
        };
        assert_eq!(result.surfaced(), result);
    }

    #[test]
    fn duplicate_policy_defaults_to_union() {
        assert_eq!(DuplicatePairPolicy::default(), DuplicatePairPolicy::Union);
        assert_eq!(
            "keep_first".parse::<DuplicatePairPolicy>().ok(),
            Some(DuplicatePairPolicy::KeepFirst)
        );
    }

    #[test]
    fn summary_includes_reasons() {
        let result = GroupCompatibilityResult {
            overall_level: CompatibilityLevel::Incompatible,
            reasons: vec!["Betta fins may be nipped".to_string()],
            pairwise_results: BTreeMap::new(),
        };
        assert_eq!(result.summary(), "Not Compatible: Betta fins may be nipped");
        assert!(result.is_blocking());
        assert_eq!(GroupCompatibilityResult::default().summary(), "Compatible");
    }
}
