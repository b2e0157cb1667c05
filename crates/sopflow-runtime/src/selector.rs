//! Option selector
//!
//! Picks the best-matching decision option given the condition outcomes of
//! the current pass. A guarded option matches only when every one of its
//! guard conditions passed; unconditioned options are fallback candidates
//! considered only when no guarded option matches. When nothing matches at
//! all the selector returns `None` and the decision engine applies its
//! timeout-behavior policy; the two layers are deliberately separate.

use sopflow_core::{ConditionOutcome, DecisionOption};
use std::collections::HashMap;

/// Stateless option selector
pub struct OptionSelector;

impl OptionSelector {
    /// Select the best matching option, or `None` when neither a guarded
    /// match nor an unconditioned fallback exists.
    pub fn select<'a>(
        options: &'a [DecisionOption],
        outcomes: &[ConditionOutcome],
    ) -> Option<&'a DecisionOption> {
        let by_id: HashMap<&str, &ConditionOutcome> = outcomes
            .iter()
            .map(|o| (o.condition_id.as_str(), o))
            .collect();

        let mut best: Option<(&DecisionOption, f64)> = None;
        for option in options.iter().filter(|o| !o.is_unconditioned()) {
            let Some(score) = Self::guard_score(option, &by_id) else {
                continue;
            };
            tracing::debug!(option = %option.id, score, "option matched");

            best = match best {
                None => Some((option, score)),
                Some((current, current_score)) => {
                    // Higher score wins; ties break on priority; equal
                    // priorities keep the first seen
                    if score > current_score
                        || (score == current_score && option.priority > current.priority)
                    {
                        Some((option, score))
                    } else {
                        Some((current, current_score))
                    }
                }
            };
        }

        if let Some((option, _)) = best {
            return Some(option);
        }

        // No guarded match: fall back to the highest-priority
        // unconditioned candidate, if one exists
        options
            .iter()
            .filter(|o| o.is_unconditioned())
            .max_by_key(|o| o.priority)
    }

    /// Combined score for a fully-matching guarded option: weighted match
    /// fraction times total matched weight. `None` when any guard fails or
    /// is missing from the outcome set.
    fn guard_score(
        option: &DecisionOption,
        outcomes: &HashMap<&str, &ConditionOutcome>,
    ) -> Option<f64> {
        let mut matched_weight = 0.0;
        let mut total_weight = 0.0;

        for guard in &option.conditions {
            let outcome = outcomes.get(guard.id.as_str())?;
            total_weight += outcome.effective_weight();
            if !outcome.passed {
                return None;
            }
            matched_weight += outcome.effective_weight();
        }

        if total_weight <= 0.0 {
            return None;
        }
        Some((matched_weight / total_weight) * matched_weight)
    }
}
