//! Serving rule resolution.

use crate::distribution::bucket;
use crate::evaluator::Evaluator;
use crate::flag::ServingRule;
use crate::target::Target;

/// Rules ordered by ascending priority, ties keeping declaration order.
///
/// Borrows the rules instead of reordering the caller's list, so one flag
/// definition can be evaluated from many threads at once.
pub fn by_priority(rules: &[ServingRule]) -> Vec<&ServingRule> {
    let mut ordered: Vec<&ServingRule> = rules.iter().collect();
    ordered.sort_by_key(|rule| rule.priority);
    ordered
}

impl Evaluator {
    /// Variation of `flag` served by the first matching rule, if any.
    ///
    /// A matching rule with a distribution is bucketed; otherwise its fixed
    /// variation is served. A matching rule that serves nothing is skipped.
    pub(crate) fn evaluate_rules(
        &self,
        flag: &str,
        rules: &[ServingRule],
        target: &Target,
    ) -> Option<String> {
        for rule in by_priority(rules) {
            if !self.evaluate_clauses(&rule.clauses, target) {
                continue;
            }

            if let Some(distribution) = &rule.serve.distribution {
                return bucket(
                    flag,
                    distribution,
                    target,
                    &self.config().bucket_fallback_attribute,
                )
                .map(str::to_string);
            }

            if let Some(variation) = &rule.serve.variation {
                return Some(variation.clone());
            }
        }

        None
    }
}
