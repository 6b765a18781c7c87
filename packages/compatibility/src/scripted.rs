//! An oracle that answers from a fixed judgment table.

use std::path::Path;

use aquastock_compatibility_models::{PairJudgment, PairKey};
use async_trait::async_trait;

use crate::http::parse_judgments;
use crate::{CompatibilityError, PairwiseCompatibilityOracle};

/// Replays a fixed table of pairwise judgments.
///
/// Every pairing in the expanded list is looked up in the table, so a
/// species requested three times is judged three times against each
/// other species, the same way a live oracle sees the request. Pairings
/// missing from the table are left out unless an unlisted label is set.
#[derive(Debug, Clone, Default)]
pub struct StaticOracle {
    judgments: Vec<PairJudgment>,
    unlisted_label: Option<String>,
}

impl StaticOracle {
    /// Creates an oracle answering from `judgments`.
    #[must_use]
    pub const fn new(judgments: Vec<PairJudgment>) -> Self {
        Self {
            judgments,
            unlisted_label: None,
        }
    }

    /// Answers pairings missing from the table with `label`.
    #[must_use]
    pub fn with_unlisted_label(mut self, label: impl Into<String>) -> Self {
        self.unlisted_label = Some(label.into());
        self
    }

    /// Parses a judgment table in the oracle's response format.
    ///
    /// # Errors
    ///
    /// Returns [`CompatibilityError`] if `json` is not valid JSON or not
    /// a judgment list.
    pub fn from_json_str(json: &str) -> Result<Self, CompatibilityError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Ok(Self::new(parse_judgments(value)?))
    }

    /// Loads a judgment table from a file.
    ///
    /// # Errors
    ///
    /// Returns [`CompatibilityError`] if the file cannot be read or
    /// parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CompatibilityError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let oracle = Self::from_json_str(&contents)?;
        log::debug!(
            "loaded {} judgments from {}",
            oracle.judgments.len(),
            path.as_ref().display()
        );
        Ok(oracle)
    }

    fn judge(&self, a: &str, b: &str) -> Option<PairJudgment> {
        let key = PairKey::new(a, b);
        let pair = [a.to_string(), b.to_string()];

        if let Some(found) = self.judgments.iter().find(|j| j.key() == key) {
            return Some(PairJudgment {
                pair,
                ..found.clone()
            });
        }

        self.unlisted_label.as_ref().map(|label| PairJudgment {
            pair,
            compatibility: label.clone(),
            reasons: Vec::new(),
            conditions: Vec::new(),
        })
    }
}

#[async_trait]
impl PairwiseCompatibilityOracle for StaticOracle {
    async fn check_group(
        &self,
        expanded_names: &[String],
    ) -> Result<Vec<PairJudgment>, CompatibilityError> {
        let mut out = Vec::new();
        for (idx, a) in expanded_names.iter().enumerate() {
            for b in &expanded_names[idx + 1..] {
                out.extend(self.judge(a, b));
            }
        }
        Ok(out)
    }
}
