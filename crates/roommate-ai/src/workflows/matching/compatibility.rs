use std::sync::Arc;

use tracing::warn;

use super::domain::UserId;
use super::repository::CompatibilityScorer;

/// Sends every surviving group to the compatibility scorer in a single call.
pub struct CompatibilityBatchClient<C> {
    scorer: Arc<C>,
}

impl<C> CompatibilityBatchClient<C>
where
    C: CompatibilityScorer,
{
    pub fn new(scorer: Arc<C>) -> Self {
        Self { scorer }
    }

    /// One score per input group, in input order.
    ///
    /// Groups the scorer did not answer for, including every group when the call fails, score
    /// `0`. Out-of-range indices are ignored and the first score for a repeated index wins.
    pub fn score_all(&self, groups: &[Vec<UserId>]) -> Vec<u8> {
        if groups.is_empty() {
            return Vec::new();
        }

        let mut scores: Vec<Option<u8>> = vec![None; groups.len()];
        match self.scorer.score_groups(groups) {
            Ok(results) => {
                for result in results {
                    match scores.get_mut(result.group_index) {
                        Some(slot) => {
                            if slot.is_none() {
                                *slot = Some(normalize(result.score));
                            }
                        }
                        None => warn!(
                            group_index = result.group_index,
                            submitted = groups.len(),
                            "compatibility score for unknown group ignored"
                        ),
                    }
                }
            }
            Err(err) => {
                warn!(error = %err, groups = groups.len(), "compatibility batch failed; defaulting to 0");
            }
        }

        let missing = scores.iter().filter(|score| score.is_none()).count();
        if missing > 0 {
            warn!(missing, submitted = groups.len(), "compatibility scores missing; defaulting to 0");
        }

        scores.into_iter().map(|score| score.unwrap_or(0)).collect()
    }
}

fn normalize(score: f64) -> u8 {
    if score.is_finite() {
        score.clamp(0.0, 100.0).round() as u8
    } else {
        0
    }
}
