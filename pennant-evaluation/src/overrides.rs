//! Per-target and per-segment variation overrides.

use crate::evaluator::Evaluator;
use crate::flag::{VariationMap, contains_target};
use crate::target::Target;

impl Evaluator {
    /// Variation of the first override entry naming the target, either
    /// directly or through one of its segments.
    pub(crate) fn evaluate_variation_map(
        &self,
        maps: &[VariationMap],
        target: &Target,
    ) -> Option<String> {
        maps.iter()
            .find(|map| {
                let direct = !target.identifier.is_empty()
                    && map
                        .targets
                        .as_deref()
                        .is_some_and(|targets| contains_target(targets, &target.identifier));

                direct
                    || map
                        .target_segments
                        .as_deref()
                        .is_some_and(|segments| self.is_target_in_segments(segments, target))
            })
            .map(|map| map.variation.clone())
    }
}
