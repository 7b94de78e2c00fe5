//! Feature Flag Evaluation
//!
//! Decides which variation of a flag a target receives, from declarative
//! definitions supplied by a [`Query`] provider.
//!
//! # Features
//!
//! - **Clauses** - `starts_with`, `ends_with`, `match`, `contains`, `equal`,
//!   `equal_sensitive`, `in`, `gt` and `segmentMatch` conditions
//! - **Segments** - reusable groups via exclude/include lists and rules
//! - **Overrides** - explicit per-target and per-segment variations
//! - **Serving rules** - priority ordered, first match wins
//! - **Percentage rollout** - deterministic SHA-256 bucketing
//! - **Prerequisites** - flags gated on other flags, with cycle detection
//!
//! Resolution order for a flag that is on: overrides, rules, default
//! distribution, default variation. A flag that is off, or whose
//! prerequisites are not met, serves its off variation.
//!
//! # Quick Start
//!
//! ```
//! use pennant_evaluation::*;
//! use std::sync::Arc;
//!
//! let query = InMemoryQuery::new();
//! query
//!     .set_flag(
//!         Flag::boolean("new-ui")
//!             .with_state(FlagState::On)
//!             .with_default_serve(Serve::variation("false"))
//!             .with_override(VariationMap::new("true").with_target("user-123")),
//!     )
//!     .unwrap();
//!
//! let evaluator = Evaluator::new(Arc::new(query), None);
//!
//! assert!(evaluator.bool_variation("new-ui", &Target::new("user-123"), false));
//! assert!(!evaluator.bool_variation("new-ui", &Target::new("user-456"), false));
//! ```
//!
//! # Gradual Rollout
//!
//! ```
//! use pennant_evaluation::*;
//!
//! // Roll out to 25% of users, bucketed by identifier
//! let flag = Flag::boolean("new-algorithm")
//!     .with_state(FlagState::On)
//!     .with_default_serve(Serve::distribution(
//!         Distribution::new("identifier")
//!             .with_weight("true", 25)
//!             .with_weight("false", 75),
//!     ));
//! ```
//!
//! # Targeting Rules
//!
//! ```
//! use pennant_evaluation::*;
//!
//! let rule = ServingRule::new(1, Serve::variation("true")).with_clause(Clause::new(
//!     "email",
//!     Operator::EndsWith,
//!     vec!["@company.com".to_string()],
//! ));
//!
//! let flag = Flag::boolean("beta-feature")
//!     .with_state(FlagState::On)
//!     .with_default_serve(Serve::variation("false"))
//!     .with_rule(rule);
//! ```

pub mod callback;
pub mod clause;
pub mod config;
pub mod distribution;
pub mod error;
pub mod evaluator;
pub mod flag;
pub mod query;
pub mod rules;
pub mod target;

mod overrides;
mod prerequisite;
mod segment;

#[cfg(test)]
mod testing;

pub use callback::{PostEvalData, PostEvaluateCallback};
pub use config::EvaluatorConfig;
pub use distribution::{BUCKET_COUNT, bucket, bucket_of};
pub use error::{EvaluationError, EvaluationResult};
pub use evaluator::{Evaluator, EvaluatorBuilder};
pub use flag::{
    Clause, Distribution, Flag, FlagKind, FlagState, Operator, Prerequisite, Segment, Serve,
    ServingRule, TargetRef, Variation, VariationMap, WeightedVariation,
};
pub use query::{InMemoryQuery, Query};
pub use target::{AttributeValue, Target};
