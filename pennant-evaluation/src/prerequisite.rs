//! Prerequisite checking.

use crate::error::{EvaluationError, EvaluationResult};
use crate::evaluator::Evaluator;
use crate::flag::Flag;
use crate::target::Target;
use pennant_log::{debug, error};

const LOG_TARGET: &str = "pennant::prerequisite";

impl Evaluator {
    /// Whether every prerequisite of `flag` resolves to an allowed
    /// variation for the target, recursing through their prerequisites.
    ///
    /// A prerequisite flag that cannot be looked up or evaluated ends the
    /// check as satisfied, without looking at the remaining prerequisites.
    /// A prerequisite already on the current dependency path fails with
    /// [`EvaluationError::CyclicPrerequisite`].
    pub(crate) fn check_prerequisites(&self, flag: &Flag, target: &Target) -> EvaluationResult<bool> {
        let mut path = vec![flag.identifier.clone()];
        self.check_prerequisites_on_path(flag, target, &mut path)
    }

    fn check_prerequisites_on_path(
        &self,
        flag: &Flag,
        target: &Target,
        path: &mut Vec<String>,
    ) -> EvaluationResult<bool> {
        let Some(prerequisites) = &flag.prerequisites else {
            return Ok(true);
        };

        debug!(
            target: LOG_TARGET,
            "Checking {} prerequisites of flag {}",
            prerequisites.len(),
            flag.identifier
        );

        for prerequisite in prerequisites {
            if path.contains(&prerequisite.flag) {
                let chain = format!("{} -> {}", path.join(" -> "), prerequisite.flag);
                return Err(EvaluationError::CyclicPrerequisite {
                    flag: prerequisite.flag.clone(),
                    chain,
                });
            }

            let prerequisite_flag = match self.query().get_flag(&prerequisite.flag) {
                Ok(found) => found,
                Err(err) => {
                    error!(
                        target: LOG_TARGET,
                        "Could not retrieve prerequisite flag {} of {}: {}",
                        prerequisite.flag,
                        flag.identifier,
                        err
                    );
                    return Ok(true);
                }
            };

            let variation = match self.evaluate_flag(&prerequisite_flag, target) {
                Ok(variation) => variation,
                Err(err) => {
                    error!(
                        target: LOG_TARGET,
                        "Could not evaluate prerequisite flag {} of {}: {}",
                        prerequisite.flag,
                        flag.identifier,
                        err
                    );
                    return Ok(true);
                }
            };

            debug!(
                target: LOG_TARGET,
                "Prerequisite flag {} has variation {} for target {}, allowed: {:?}",
                prerequisite.flag,
                variation.identifier,
                target.identifier,
                prerequisite.variations
            );

            if !prerequisite.variations.contains(&variation.identifier) {
                return Ok(false);
            }

            path.push(prerequisite.flag.clone());
            let nested = self.check_prerequisites_on_path(&prerequisite_flag, target, path);
            path.pop();

            if !nested? {
                return Ok(false);
            }
        }

        Ok(true)
    }
}
