//! Reduces pairwise judgments to one group verdict.
//!
//! The overall level is the most severe level of any unique pair. The
//! group's reasons are the reasons of the pairs at that level, ordered by
//! the judgment that brought each pair to its final level, without
//! duplicates.

use std::collections::BTreeMap;
use std::time::Duration;

use aquastock_compatibility_models::{
    CompatibilityLevel, CompatibilityVerdict, DuplicatePairPolicy, GroupCompatibilityResult,
    PairJudgment, PairKey,
};
use aquastock_species_models::FishSelection;

use crate::labels::parse_label;
use crate::{CompatibilityError, PairwiseCompatibilityOracle};

fn push_unique(target: &mut Vec<String>, items: &[String]) {
    for item in items {
        let item = item.trim();
        if !item.is_empty() && !target.iter().any(|existing| existing == item) {
            target.push(item.to_string());
        }
    }
}

fn new_verdict(judgment: &PairJudgment, level: CompatibilityLevel) -> CompatibilityVerdict {
    let mut verdict = CompatibilityVerdict {
        species: judgment.pair.clone(),
        level,
        reasons: Vec::new(),
        conditions: Vec::new(),
    };
    push_unique(&mut verdict.reasons, &judgment.reasons);
    push_unique(&mut verdict.conditions, &judgment.conditions);
    verdict
}

/// Merges oracle judgments into a [`GroupCompatibilityResult`].
///
/// Judgments for a pair already seen are handled per `policy`. Under
/// [`DuplicatePairPolicy::Union`] a more severe judgment replaces the
/// pair's verdict, an equally severe one adds its reasons and
/// conditions, and a less severe one is ignored.
///
/// Conditions are kept only on pairs that end up
/// [`CompatibilityLevel::Conditional`].
///
/// # Errors
///
/// Returns [`CompatibilityError::UnrecognizedLabel`] if any judgment
/// carries a label that cannot be normalized.
pub fn aggregate(
    judgments: &[PairJudgment],
    policy: DuplicatePairPolicy,
) -> Result<GroupCompatibilityResult, CompatibilityError> {
    let mut pairs: BTreeMap<PairKey, CompatibilityVerdict> = BTreeMap::new();
    // Index of the judgment that set each pair's current level.
    let mut reached_at: BTreeMap<PairKey, usize> = BTreeMap::new();

    for (idx, judgment) in judgments.iter().enumerate() {
        let level = parse_label(&judgment.compatibility)?;
        let key = judgment.key();

        let Some(existing) = pairs.get_mut(&key) else {
            log::debug!("pair {key}: {level}");
            pairs.insert(key.clone(), new_verdict(judgment, level));
            reached_at.insert(key, idx);
            continue;
        };

        match policy {
            DuplicatePairPolicy::KeepFirst => {
                log::debug!("pair {key}: ignoring repeated judgment");
            }
            DuplicatePairPolicy::Union => {
                if level > existing.level {
                    log::debug!("pair {key}: raised from {} to {level}", existing.level);
                    *existing = new_verdict(judgment, level);
                    reached_at.insert(key, idx);
                } else if level == existing.level {
                    push_unique(&mut existing.reasons, &judgment.reasons);
                    push_unique(&mut existing.conditions, &judgment.conditions);
                }
            }
        }
    }

    for verdict in pairs.values_mut() {
        if verdict.level != CompatibilityLevel::Conditional {
            verdict.conditions.clear();
        }
    }

    let overall_level = pairs
        .values()
        .map(|verdict| verdict.level)
        .max()
        .unwrap_or_default();

    let mut top: Vec<(usize, &CompatibilityVerdict)> = pairs
        .iter()
        .filter(|(_, verdict)| verdict.level == overall_level)
        .map(|(key, verdict)| (reached_at.get(key).copied().unwrap_or_default(), verdict))
        .collect();
    top.sort_by_key(|(idx, _)| *idx);

    let mut reasons = Vec::new();
    for (_, verdict) in top {
        push_unique(&mut reasons, &verdict.reasons);
    }

    Ok(GroupCompatibilityResult {
        overall_level,
        reasons,
        pairwise_results: pairs,
    })
}

/// Runs the group check for `selection`.
///
/// Returns `Ok(None)` when the selection does not need a group check
/// (fewer than two fish in total).
///
/// # Errors
///
/// * [`CompatibilityError::Timeout`] if the oracle does not answer
///   within `timeout`
/// * [`CompatibilityError::MalformedResponse`] if the oracle returns no
///   judgments at all
/// * any error the oracle itself reports, or that [`aggregate`] reports
pub async fn check_group(
    oracle: &dyn PairwiseCompatibilityOracle,
    selection: &FishSelection,
    timeout: Duration,
    policy: DuplicatePairPolicy,
) -> Result<Option<GroupCompatibilityResult>, CompatibilityError> {
    if !selection.requires_group_check() {
        log::debug!("group check skipped: fewer than two fish selected");
        return Ok(None);
    }

    let expanded = selection.expanded();
    log::debug!("checking {} fish as a group", expanded.len());

    let judgments = tokio::time::timeout(timeout, oracle.check_group(&expanded))
        .await
        .map_err(|_| CompatibilityError::Timeout { timeout })??;

    if judgments.is_empty() {
        return Err(CompatibilityError::MalformedResponse {
            message: format!("no judgments returned for {} fish", expanded.len()),
        });
    }

    let result = aggregate(&judgments, policy)?;
    log::info!(
        "group compatibility: {} ({} unique pairs from {} judgments)",
        result.overall_level,
        result.pairwise_results.len(),
        judgments.len()
    );

    Ok(Some(result))
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::StaticOracle;

    fn judgment(a: &str, b: &str, label: &str, reasons: &[&str]) -> PairJudgment {
        PairJudgment {
            pair: [a.to_string(), b.to_string()],
            compatibility: label.to_string(),
            reasons: reasons.iter().map(ToString::to_string).collect(),
            conditions: Vec::new(),
        }
    }

    fn conditional(a: &str, b: &str, reasons: &[&str], conditions: &[&str]) -> PairJudgment {
        PairJudgment {
            conditions: conditions.iter().map(ToString::to_string).collect(),
            ..judgment(a, b, "Conditionally Compatible", reasons)
        }
    }

    struct FailingOracle;

    #[async_trait]
    impl PairwiseCompatibilityOracle for FailingOracle {
        async fn check_group(&self, _: &[String]) -> Result<Vec<PairJudgment>, CompatibilityError> {
            Err(CompatibilityError::Status {
                status: 502,
                body: "bad gateway".to_string(),
            })
        }
    }

    struct SlowOracle;

    #[async_trait]
    impl PairwiseCompatibilityOracle for SlowOracle {
        async fn check_group(&self, _: &[String]) -> Result<Vec<PairJudgment>, CompatibilityError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Vec::new())
        }
    }

    #[test]
    fn all_compatible_pairs_are_compatible() {
        let result = aggregate(
            &[
                judgment("Guppy", "Molly", "Compatible", &["Peaceful livebearers"]),
                judgment("Guppy", "Platy", "Compatible", &[]),
            ],
            DuplicatePairPolicy::Union,
        )
        .unwrap();
        assert_eq!(result.overall_level, CompatibilityLevel::Compatible);
        assert_eq!(result.pairwise_results.len(), 2);
        assert_eq!(result.reasons, vec!["Peaceful livebearers"]);
    }

    #[test]
    fn any_incompatible_pair_makes_group_incompatible() {
        let result = aggregate(
            &[
                conditional("Betta", "Guppy", &["Guppy tails may trigger aggression"], &[
                    "Use short-finned guppies",
                ]),
                judgment("Tiger Barb", "Betta", "Not Compatible", &["Betta fins may be nipped"]),
                judgment("Guppy", "Tiger Barb", "Compatible", &[]),
            ],
            DuplicatePairPolicy::Union,
        )
        .unwrap();
        assert_eq!(result.overall_level, CompatibilityLevel::Incompatible);
        assert_eq!(result.reasons, vec!["Betta fins may be nipped"]);
        assert_eq!(result.conditional_pairs().count(), 1);
        assert_eq!(result.surfaced().pairwise_results.len(), 1);
    }

    #[test]
    fn conditional_reasons_are_unioned_across_pairs() {
        let result = aggregate(
            &[
                conditional("Betta", "Guppy", &["Fin nipping risk"], &["Plenty of plants"]),
                conditional("Betta", "Neon Tetra", &["Fin nipping risk", "Betta may hunt small fish"], &[
                    "Keep tetras in a large school",
                ]),
            ],
            DuplicatePairPolicy::Union,
        )
        .unwrap();
        assert_eq!(result.overall_level, CompatibilityLevel::Conditional);
        assert_eq!(
            result.reasons,
            vec!["Fin nipping risk", "Betta may hunt small fish"]
        );
        assert_eq!(
            result.conditions(),
            vec!["Plenty of plants", "Keep tetras in a large school"]
        );
    }

    #[test]
    fn reversed_pairs_are_deduplicated() {
        let result = aggregate(
            &[
                judgment("Tiger Barb", "Betta", "Not Compatible", &["Betta fins may be nipped"]),
                judgment("betta", "tiger barb", "Not Compatible", &["Betta fins may be nipped"]),
                judgment("Betta", "Tiger Barb", "Incompatible", &["Tiger barbs are fin nippers"]),
            ],
            DuplicatePairPolicy::Union,
        )
        .unwrap();
        assert_eq!(result.pairwise_results.len(), 1);
        assert_eq!(
            result.reasons,
            vec!["Betta fins may be nipped", "Tiger barbs are fin nippers"]
        );
    }

    #[test]
    fn raised_pair_reasons_follow_pairs_already_at_that_level() {
        let result = aggregate(
            &[
                judgment("Angelfish", "Neon Tetra", "Conditional", &["Tetras may be eaten"]),
                judgment("Tiger Barb", "Betta", "Not Compatible", &["Betta fins may be nipped"]),
                judgment("Neon Tetra", "Angelfish", "Not Compatible", &["Angelfish eat tetras"]),
            ],
            DuplicatePairPolicy::Union,
        )
        .unwrap();
        assert_eq!(result.overall_level, CompatibilityLevel::Incompatible);
        assert_eq!(
            result.reasons,
            vec!["Betta fins may be nipped", "Angelfish eat tetras"]
        );
    }

    #[test]
    fn keep_first_ignores_later_duplicates() {
        let judgments = [
            judgment("Angelfish", "Neon Tetra", "Compatible", &["Similar water"]),
            judgment("Neon Tetra", "Angelfish", "Not Compatible", &["Angelfish eat tetras"]),
        ];

        let first = aggregate(&judgments, DuplicatePairPolicy::KeepFirst).unwrap();
        assert_eq!(first.overall_level, CompatibilityLevel::Compatible);
        assert_eq!(first.reasons, vec!["Similar water"]);

        let union = aggregate(&judgments, DuplicatePairPolicy::Union).unwrap();
        assert_eq!(union.overall_level, CompatibilityLevel::Incompatible);
        assert_eq!(union.reasons, vec!["Angelfish eat tetras"]);
    }

    #[test]
    fn conditions_are_dropped_from_non_conditional_pairs() {
        let result = aggregate(
            &[PairJudgment {
                conditions: vec!["Never".to_string()],
                ..judgment("Oscar", "Neon Tetra", "Not Compatible", &["Oscars eat tetras"])
            }],
            DuplicatePairPolicy::Union,
        )
        .unwrap();
        assert!(result.pairwise_results.values().all(|v| v.conditions.is_empty()));
    }

    #[test]
    fn unrecognized_label_fails_the_whole_check() {
        let result = aggregate(
            &[
                judgment("Guppy", "Molly", "Compatible", &[]),
                judgment("Guppy", "Oscar", "Probably fine", &[]),
            ],
            DuplicatePairPolicy::Union,
        );
        assert!(matches!(
            result,
            Err(CompatibilityError::UnrecognizedLabel { .. })
        ));
    }

    #[tokio::test]
    async fn repeated_species_report_one_logical_pair() {
        let oracle = StaticOracle::new(vec![
            judgment("Tiger Barb", "Betta", "Not Compatible", &["Betta fins may be nipped"]),
            judgment("Tiger Barb", "Tiger Barb", "Compatible", &["Schooling fish"]),
        ]);
        let selection: FishSelection = [("Tiger Barb", 3), ("Betta", 1)].into_iter().collect();

        let result = check_group(
            &oracle,
            &selection,
            Duration::from_secs(1),
            DuplicatePairPolicy::Union,
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(result.pairwise_results.len(), 2);
        assert_eq!(result.incompatible_pairs().count(), 1);
        assert_eq!(result.reasons, vec!["Betta fins may be nipped"]);
    }

    #[tokio::test]
    async fn single_fish_skips_the_oracle() {
        let selection: FishSelection = [("Betta", 1)].into_iter().collect();
        let result = check_group(
            &FailingOracle,
            &selection,
            Duration::from_secs(1),
            DuplicatePairPolicy::Union,
        )
        .await
        .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn oracle_failure_is_an_error_not_compatible() {
        let selection: FishSelection = [("Betta", 1), ("Guppy", 1)].into_iter().collect();
        let result = check_group(
            &FailingOracle,
            &selection,
            Duration::from_secs(1),
            DuplicatePairPolicy::Union,
        )
        .await;
        assert!(matches!(result, Err(CompatibilityError::Status { status: 502, .. })));
    }

    #[tokio::test]
    async fn oracle_timeout_is_reported() {
        let selection: FishSelection = [("Betta", 1), ("Guppy", 1)].into_iter().collect();
        let result = check_group(
            &SlowOracle,
            &selection,
            Duration::from_millis(50),
            DuplicatePairPolicy::Union,
        )
        .await;
        assert!(matches!(result, Err(CompatibilityError::Timeout { .. })));
    }

    #[tokio::test]
    async fn empty_response_is_malformed() {
        let selection: FishSelection = [("Betta", 1), ("Guppy", 1)].into_iter().collect();
        let result = check_group(
            &StaticOracle::new(Vec::new()),
            &selection,
            Duration::from_secs(1),
            DuplicatePairPolicy::Union,
        )
        .await;
        assert!(matches!(
            result,
            Err(CompatibilityError::MalformedResponse { .. })
        ));
    }
}
