//! Segment membership.

use crate::evaluator::Evaluator;
use crate::flag::contains_target;
use crate::target::Target;
use pennant_log::{Level, debug, log_fields};

const LOG_TARGET: &str = "pennant::segment";

impl Evaluator {
    /// Whether the target belongs to any of the listed segments.
    ///
    /// Segments are checked in order. Within each one the exclusion list
    /// is consulted first, then the inclusion list, then the rule clauses.
    /// An exclusion, or a segment that cannot be looked up, ends the whole
    /// check with `false` without looking at the remaining segments.
    pub(crate) fn is_target_in_segments(&self, segments: &[String], target: &Target) -> bool {
        for identifier in segments {
            let segment = match self.query().get_segment(identifier) {
                Ok(segment) => segment,
                Err(err) => {
                    debug!(target: LOG_TARGET, "Segment {} unavailable: {}", identifier, err);
                    return false;
                }
            };

            if let Some(excluded) = &segment.excluded
                && contains_target(excluded, &target.identifier)
            {
                log_fields(
                    Level::Debug,
                    LOG_TARGET,
                    "target excluded from segment via exclude list",
                    &[("target", target.name.as_str()), ("segment", segment.name.as_str())],
                );
                return false;
            }

            if let Some(included) = &segment.included
                && contains_target(included, &target.identifier)
            {
                log_fields(
                    Level::Debug,
                    LOG_TARGET,
                    "target included in segment via include list",
                    &[("target", target.name.as_str()), ("segment", segment.name.as_str())],
                );
                return true;
            }

            if let Some(rules) = &segment.rules
                && !rules.is_empty()
                && self.evaluate_clauses(rules, target)
            {
                log_fields(
                    Level::Debug,
                    LOG_TARGET,
                    "target included in segment via rules",
                    &[("target", target.name.as_str()), ("segment", segment.name.as_str())],
                );
                return true;
            }
        }

        false
    }
}
