//! Lookup provider for flag and segment definitions.

use crate::error::{EvaluationError, EvaluationResult};
use crate::flag::{Flag, Segment};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Source of flag and segment definitions.
///
/// The evaluator treats any error returned here as "not found"; it never
/// retries. Implementations are shared across concurrent evaluations and
/// must therefore support concurrent reads.
pub trait Query: Send + Sync {
    /// Fetch a segment by identifier.
    fn get_segment(&self, identifier: &str) -> EvaluationResult<Arc<Segment>>;

    /// Fetch a flag by identifier.
    fn get_flag(&self, identifier: &str) -> EvaluationResult<Arc<Flag>>;
}

/// Snapshot document accepted by [`InMemoryQuery::from_json`].
#[derive(Debug, Default, Deserialize)]
struct Snapshot {
    #[serde(default)]
    flags: Vec<Flag>,
    #[serde(default)]
    segments: Vec<Segment>,
}

/// Thread-safe in-memory definition store.
///
/// Definitions are handed out as shared immutable `Arc`s; replacing one
/// never affects evaluations already holding the previous version.
#[derive(Debug, Default)]
pub struct InMemoryQuery {
    flags: RwLock<HashMap<String, Arc<Flag>>>,
    segments: RwLock<HashMap<String, Arc<Segment>>>,
}

impl InMemoryQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a `{ "flags": [...], "segments": [...] }` document.
    pub fn from_json(json: &str) -> EvaluationResult<Self> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        let query = Self::new();
        for flag in snapshot.flags {
            query.set_flag(flag)?;
        }
        for segment in snapshot.segments {
            query.set_segment(segment)?;
        }
        Ok(query)
    }

    /// Insert or replace a flag.
    pub fn set_flag(&self, flag: Flag) -> EvaluationResult<()> {
        let mut flags = self
            .flags
            .write()
            .map_err(|e| EvaluationError::Query(format!("Lock error: {}", e)))?;
        flags.insert(flag.identifier.clone(), Arc::new(flag));
        Ok(())
    }

    /// Insert or replace a segment.
    pub fn set_segment(&self, segment: Segment) -> EvaluationResult<()> {
        let mut segments = self
            .segments
            .write()
            .map_err(|e| EvaluationError::Query(format!("Lock error: {}", e)))?;
        segments.insert(segment.identifier.clone(), Arc::new(segment));
        Ok(())
    }

    pub fn remove_flag(&self, identifier: &str) -> EvaluationResult<Option<Arc<Flag>>> {
        let mut flags = self
            .flags
            .write()
            .map_err(|e| EvaluationError::Query(format!("Lock error: {}", e)))?;
        Ok(flags.remove(identifier))
    }

    pub fn remove_segment(&self, identifier: &str) -> EvaluationResult<Option<Arc<Segment>>> {
        let mut segments = self
            .segments
            .write()
            .map_err(|e| EvaluationError::Query(format!("Lock error: {}", e)))?;
        Ok(segments.remove(identifier))
    }

    pub fn flag_count(&self) -> usize {
        self.flags.read().map(|f| f.len()).unwrap_or(0)
    }

    pub fn segment_count(&self) -> usize {
        self.segments.read().map(|s| s.len()).unwrap_or(0)
    }
}

impl Query for InMemoryQuery {
    fn get_segment(&self, identifier: &str) -> EvaluationResult<Arc<Segment>> {
        let segments = self
            .segments
            .read()
            .map_err(|e| EvaluationError::Query(format!("Lock error: {}", e)))?;
        segments
            .get(identifier)
            .cloned()
            .ok_or_else(|| EvaluationError::SegmentNotFound(identifier.to_string()))
    }

    fn get_flag(&self, identifier: &str) -> EvaluationResult<Arc<Flag>> {
        let flags = self
            .flags
            .read()
            .map_err(|e| EvaluationError::Query(format!("Lock error: {}", e)))?;
        flags
            .get(identifier)
            .cloned()
            .ok_or_else(|| EvaluationError::FlagNotFound(identifier.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flag::FlagKind;

    #[test]
    fn test_set_and_get() {
        let query = InMemoryQuery::new();
        query.set_flag(Flag::boolean("f1")).unwrap();
        query.set_segment(Segment::new("s1")).unwrap();

        assert_eq!(query.get_flag("f1").unwrap().kind, FlagKind::Boolean);
        assert_eq!(query.get_segment("s1").unwrap().name, "s1");
        assert_eq!(query.flag_count(), 1);
        assert_eq!(query.segment_count(), 1);
    }

    #[test]
    fn test_missing_lookups() {
        let query = InMemoryQuery::new();

        assert!(matches!(
            query.get_flag("nope"),
            Err(EvaluationError::FlagNotFound(id)) if id == "nope"
        ));
        assert!(matches!(
            query.get_segment("nope"),
            Err(EvaluationError::SegmentNotFound(_))
        ));
    }

    #[test]
    fn test_replace_keeps_old_snapshot_alive() {
        let query = InMemoryQuery::new();
        query.set_flag(Flag::boolean("f1")).unwrap();
        let before = query.get_flag("f1").unwrap();

        query
            .set_flag(Flag::boolean("f1").with_state(crate::flag::FlagState::On))
            .unwrap();

        assert!(!before.is_on());
        assert!(query.get_flag("f1").unwrap().is_on());
    }

    #[test]
    fn test_remove() {
        let query = InMemoryQuery::new();
        query.set_flag(Flag::boolean("f1")).unwrap();
        query.set_segment(Segment::new("s1")).unwrap();

        assert!(query.remove_flag("f1").unwrap().is_some());
        assert!(query.remove_segment("s1").unwrap().is_some());
        assert!(query.remove_flag("f1").unwrap().is_none());
        assert!(query.get_flag("f1").is_err());
    }

    #[test]
    fn test_from_json() {
        let query = InMemoryQuery::from_json(
            r#"{
                "flags": [{
                    "identifier": "f1",
                    "kind": "int",
                    "state": "on",
                    "variations": [{ "identifier": "one", "value": "1" }],
                    "offVariation": "one",
                    "defaultServe": { "variation": "one" }
                }],
                "segments": [{ "identifier": "s1", "included": [{ "identifier": "u1" }] }]
            }"#,
        )
        .unwrap();

        assert_eq!(query.get_flag("f1").unwrap().kind, FlagKind::Int);
        assert_eq!(query.get_segment("s1").unwrap().included.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            InMemoryQuery::from_json("{ not json"),
            Err(EvaluationError::Load(_))
        ));
    }
}
