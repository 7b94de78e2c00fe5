//! Post-evaluation hook.

use crate::flag::{Flag, Variation};
use crate::target::Target;

/// Everything known about one finished evaluation.
#[derive(Debug, Clone, Copy)]
pub struct PostEvalData<'a> {
    pub flag: &'a Flag,
    pub target: &'a Target,
    pub variation: &'a Variation,
}

/// Observer invoked once per successful top-level evaluation.
///
/// The hook runs synchronously on the evaluating thread and cannot change
/// the served variation. Implementations must not panic and should return
/// quickly; hand heavy work (analytics, metrics) off to a queue.
pub trait PostEvaluateCallback: Send + Sync {
    fn post_evaluate(&self, data: &PostEvalData<'_>);
}

impl<F> PostEvaluateCallback for F
where
    F: Fn(&PostEvalData<'_>) + Send + Sync,
{
    fn post_evaluate(&self, data: &PostEvalData<'_>) {
        self(data)
    }
}
