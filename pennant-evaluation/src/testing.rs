//! Shared fixtures for unit tests.

use crate::callback::{PostEvalData, PostEvaluateCallback};
use crate::config::EvaluatorConfig;
use crate::evaluator::Evaluator;
use crate::flag::{Flag, Segment};
use crate::query::InMemoryQuery;
use std::sync::{Arc, Mutex};

/// Evaluator over an in-memory store holding the given definitions.
pub(crate) fn evaluator_with(flags: Vec<Flag>, segments: Vec<Segment>) -> Evaluator {
    let query = InMemoryQuery::new();
    for flag in flags {
        query.set_flag(flag).unwrap();
    }
    for segment in segments {
        query.set_segment(segment).unwrap();
    }
    Evaluator::new(Arc::new(query), None)
        .with_config(EvaluatorConfig::new().with_log_absorbed_errors(false))
}

/// Records `(flag, target, variation)` identifiers of every evaluation.
#[derive(Default)]
pub(crate) struct RecordingCallback {
    seen: Mutex<Vec<(String, String, String)>>,
}

impl RecordingCallback {
    pub(crate) fn seen(&self) -> Vec<(String, String, String)> {
        self.seen.lock().unwrap().clone()
    }
}

impl PostEvaluateCallback for RecordingCallback {
    fn post_evaluate(&self, data: &PostEvalData<'_>) {
        self.seen.lock().unwrap().push((
            data.flag.identifier.clone(),
            data.target.identifier.clone(),
            data.variation.identifier.clone(),
        ));
    }
}
