//! Error types for flag evaluation.

use thiserror::Error;

/// Result type for evaluation operations.
pub type EvaluationResult<T> = Result<T, EvaluationError>;

/// Evaluation errors.
///
/// Typed accessors on [`crate::Evaluator`] never surface these; they log the
/// error and hand back the caller's default instead.
#[derive(Debug, Error)]
pub enum EvaluationError {
    /// The evaluator has no lookup provider
    #[error("Query provider is missing")]
    MissingQuery,

    /// Flag lookup failed
    #[error("Flag not found: {0}")]
    FlagNotFound(String),

    /// Segment lookup failed
    #[error("Segment not found: {0}")]
    SegmentNotFound(String),

    /// Caller asked for a different kind than the flag declares
    #[error("Flag kind mismatch for '{flag}', expected: {expected}, got: {actual}")]
    KindMismatch {
        flag: String,
        expected: String,
        actual: String,
    },

    /// Resolved identifier is missing from the flag's variations
    #[error("Variation '{variation}' not found in flag '{flag}'")]
    VariationNotFound { flag: String, variation: String },

    /// Neither overrides, rules nor the default serve produced a variation
    #[error("No variation could be resolved for flag: {0}")]
    NoVariationResolved(String),

    /// A prerequisite chain leads back to a flag already being evaluated
    #[error("Cyclic prerequisite on flag '{flag}': {chain}")]
    CyclicPrerequisite { flag: String, chain: String },

    /// Variation value could not be decoded into the requested type
    #[error("Failed to decode variation of flag '{flag}': {message}")]
    Decode { flag: String, message: String },

    /// Lookup provider failure other than a plain miss
    #[error("Query error: {0}")]
    Query(String),

    /// Snapshot of flags and segments could not be parsed
    #[error("Failed to load definitions: {0}")]
    Load(String),
}

impl From<serde_json::Error> for EvaluationError {
    fn from(err: serde_json::Error) -> Self {
        EvaluationError::Load(err.to_string())
    }
}
