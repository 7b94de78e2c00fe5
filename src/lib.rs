// Pennant - feature flag evaluation for Rust
//
// Decides which variation of a feature flag a target receives, using
// targeting rules, segments, overrides, percentage rollout and
// prerequisite flags. Definitions come from a pluggable lookup provider.

// Re-export the evaluation engine
pub use pennant_evaluation::*;

// Logging facade
pub use pennant_log as log;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Clause, Distribution, EvaluationError, EvaluationResult, Evaluator, EvaluatorConfig, Flag,
        FlagKind, FlagState, InMemoryQuery, Operator, PostEvalData, PostEvaluateCallback,
        Prerequisite, Query, Segment, Serve, ServingRule, Target, Variation, VariationMap,
    };
}
