//! Evaluator configuration.

use crate::target::IDENTIFIER_ATTRIBUTE;
use serde::{Deserialize, Serialize};
use std::env;

/// Tunables for [`crate::Evaluator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EvaluatorConfig {
    /// Attribute bucketed on when a distribution's `bucketBy` is missing
    /// from the target
    pub bucket_fallback_attribute: String,

    /// Emit an error record whenever a typed accessor falls back to the
    /// caller's default
    pub log_absorbed_errors: bool,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            bucket_fallback_attribute: IDENTIFIER_ATTRIBUTE.to_string(),
            log_absorbed_errors: true,
        }
    }
}

impl EvaluatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read overrides from `PENNANT_BUCKET_FALLBACK` and
    /// `PENNANT_LOG_ABSORBED_ERRORS`, keeping defaults for anything unset.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(attribute) = env::var("PENNANT_BUCKET_FALLBACK")
            && !attribute.trim().is_empty()
        {
            config.bucket_fallback_attribute = attribute.trim().to_string();
        }

        if let Ok(flag) = env::var("PENNANT_LOG_ABSORBED_ERRORS") {
            config.log_absorbed_errors = flag == "1" || flag.eq_ignore_ascii_case("true");
        }

        config
    }

    pub fn with_bucket_fallback_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.bucket_fallback_attribute = attribute.into();
        self
    }

    pub fn with_log_absorbed_errors(mut self, enabled: bool) -> Self {
        self.log_absorbed_errors = enabled;
        self
    }
}
