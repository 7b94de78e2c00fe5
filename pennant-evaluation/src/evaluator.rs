//! Flag evaluation entry point.

use crate::callback::{PostEvalData, PostEvaluateCallback};
use crate::config::EvaluatorConfig;
use crate::distribution::bucket;
use crate::error::{EvaluationError, EvaluationResult};
use crate::flag::{Flag, FlagKind, Variation};
use crate::query::Query;
use crate::target::Target;
use pennant_log::{Level, debug, error, log_fields};
use serde_json::{Map, Value};
use std::sync::Arc;

const LOG_TARGET: &str = "pennant::evaluator";

/// Decides which variation of a flag a target receives.
///
/// Holds no mutable state of its own; one instance can be cloned or shared
/// across threads as long as its [`Query`] supports concurrent reads.
#[derive(Clone)]
pub struct Evaluator {
    query: Arc<dyn Query>,
    callback: Option<Arc<dyn PostEvaluateCallback>>,
    config: EvaluatorConfig,
}

impl std::fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Evaluator")
            .field("callback", &self.callback.is_some())
            .field("config", &self.config)
            .finish()
    }
}

/// Builder for [`Evaluator`].
#[derive(Default)]
pub struct EvaluatorBuilder {
    query: Option<Arc<dyn Query>>,
    callback: Option<Arc<dyn PostEvaluateCallback>>,
    config: EvaluatorConfig,
}

impl EvaluatorBuilder {
    pub fn query(mut self, query: Arc<dyn Query>) -> Self {
        self.query = Some(query);
        self
    }

    pub fn callback(mut self, callback: Arc<dyn PostEvaluateCallback>) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn config(mut self, config: EvaluatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Fails with [`EvaluationError::MissingQuery`] if no query was set.
    pub fn build(self) -> EvaluationResult<Evaluator> {
        let query = self.query.ok_or(EvaluationError::MissingQuery)?;
        Ok(Evaluator {
            query,
            callback: self.callback,
            config: self.config,
        })
    }
}

impl Evaluator {
    /// Create an evaluator with the default configuration.
    pub fn new(query: Arc<dyn Query>, callback: Option<Arc<dyn PostEvaluateCallback>>) -> Self {
        Self {
            query,
            callback,
            config: EvaluatorConfig::default(),
        }
    }

    pub fn builder() -> EvaluatorBuilder {
        EvaluatorBuilder::default()
    }

    pub fn with_config(mut self, config: EvaluatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    pub(crate) fn query(&self) -> &dyn Query {
        self.query.as_ref()
    }

    /// Resolve a flag's served variation, ignoring prerequisites.
    ///
    /// Off flags serve their off variation. On flags try overrides, then
    /// rules, then the default distribution, then the default variation.
    pub(crate) fn evaluate_flag(&self, flag: &Flag, target: &Target) -> EvaluationResult<Variation> {
        let resolved = if flag.is_on() {
            flag.variation_to_target_map
                .as_deref()
                .and_then(|maps| self.evaluate_variation_map(maps, target))
                .or_else(|| {
                    flag.rules
                        .as_deref()
                        .and_then(|rules| self.evaluate_rules(&flag.identifier, rules, target))
                })
                .or_else(|| {
                    let fallback = &self.config.bucket_fallback_attribute;
                    flag.default_serve.distribution.as_ref().and_then(|d| {
                        bucket(&flag.identifier, d, target, fallback).map(str::to_string)
                    })
                })
                .or_else(|| flag.default_serve.variation.clone())
        } else {
            Some(flag.off_variation.clone())
        };

        match resolved {
            Some(identifier) if !identifier.is_empty() => find_variation(flag, &identifier),
            _ => Err(EvaluationError::NoVariationResolved(flag.identifier.clone())),
        }
    }

    /// Evaluate a flag for a target, expecting the given kind.
    ///
    /// Flags whose prerequisites are not met serve their off variation.
    /// The post-evaluation callback sees every successful result.
    pub fn evaluate(
        &self,
        identifier: &str,
        target: &Target,
        kind: FlagKind,
    ) -> EvaluationResult<Variation> {
        let flag = self.query.get_flag(identifier)?;

        if flag.kind != kind {
            return Err(EvaluationError::KindMismatch {
                flag: identifier.to_string(),
                expected: kind.to_string(),
                actual: flag.kind.to_string(),
            });
        }

        let prerequisites_met = match &flag.prerequisites {
            Some(_) => self.check_prerequisites(&flag, target)?,
            None => true,
        };

        let variation = if prerequisites_met {
            self.evaluate_flag(&flag, target)?
        } else {
            debug!(
                target: LOG_TARGET,
                "Prerequisites of {} not met for {}, serving off variation",
                flag.identifier,
                target.identifier
            );
            find_variation(&flag, &flag.off_variation)?
        };

        log_fields(
            Level::Debug,
            LOG_TARGET,
            "variation resolved",
            &[
                ("flag", flag.identifier.as_str()),
                ("target", target.identifier.as_str()),
                ("variation", variation.identifier.as_str()),
            ],
        );

        if let Some(callback) = &self.callback {
            callback.post_evaluate(&PostEvalData {
                flag: flag.as_ref(),
                target,
                variation: &variation,
            });
        }

        Ok(variation)
    }

    fn absorb<T>(&self, identifier: &str, kind: &str, err: &EvaluationError, default: T) -> T {
        if self.config.log_absorbed_errors {
            error!(
                target: LOG_TARGET,
                "Error while evaluating {} flag '{}', err: {}", kind, identifier, err
            );
        }
        default
    }

    /// Boolean value of a flag; `true` only for a case-insensitive `"true"`.
    pub fn bool_variation(&self, identifier: &str, target: &Target, default: bool) -> bool {
        match self.evaluate(identifier, target, FlagKind::Boolean) {
            Ok(variation) => variation.value.eq_ignore_ascii_case("true"),
            Err(err) => self.absorb(identifier, "boolean", &err, default),
        }
    }

    pub fn string_variation(&self, identifier: &str, target: &Target, default: &str) -> String {
        match self.evaluate(identifier, target, FlagKind::String) {
            Ok(variation) => variation.value,
            Err(err) => self.absorb(identifier, "string", &err, default.to_string()),
        }
    }

    pub fn int_variation(&self, identifier: &str, target: &Target, default: i64) -> i64 {
        self.evaluate(identifier, target, FlagKind::Int)
            .and_then(|variation| decode(identifier, &variation, |v| v.parse::<i64>()))
            .unwrap_or_else(|err| self.absorb(identifier, "int", &err, default))
    }

    /// Floating point value of an `int`-kind flag.
    pub fn number_variation(&self, identifier: &str, target: &Target, default: f64) -> f64 {
        self.evaluate(identifier, target, FlagKind::Int)
            .and_then(|variation| decode(identifier, &variation, |v| v.parse::<f64>()))
            .unwrap_or_else(|err| self.absorb(identifier, "number", &err, default))
    }

    /// JSON object value of a flag; anything but an object falls back.
    pub fn json_variation(
        &self,
        identifier: &str,
        target: &Target,
        default: Map<String, Value>,
    ) -> Map<String, Value> {
        self.evaluate(identifier, target, FlagKind::Json)
            .and_then(|variation| {
                decode(identifier, &variation, |v| {
                    serde_json::from_str::<Map<String, Value>>(v)
                })
            })
            .unwrap_or_else(|err| self.absorb(identifier, "json", &err, default))
    }
}

fn find_variation(flag: &Flag, identifier: &str) -> EvaluationResult<Variation> {
    flag.variation(identifier)
        .cloned()
        .ok_or_else(|| EvaluationError::VariationNotFound {
            flag: flag.identifier.clone(),
            variation: identifier.to_string(),
        })
}

fn decode<T, E, F>(flag: &str, variation: &Variation, parse: F) -> EvaluationResult<T>
where
    F: FnOnce(&str) -> Result<T, E>,
    E: std::fmt::Display,
{
    parse(&variation.value).map_err(|e| EvaluationError::Decode {
        flag: flag.to_string(),
        message: e.to_string(),
    })
}
