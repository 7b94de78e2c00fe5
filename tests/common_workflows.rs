//! Integration tests for common pennant workflows.
//!
//! These tests drive the facade crate the way an SDK embedding it would.

use pennant::prelude::*;
use serde_json::json;
use std::sync::Arc;

// =============================================================================
// Fixtures
// =============================================================================

/// Store with a boolean kill switch, a string banner gated on it, and an
/// integer limit targeted by plan.
fn store() -> Arc<InMemoryQuery> {
    let query = InMemoryQuery::new();

    query
        .set_flag(
            Flag::boolean("kill-switch")
                .with_state(FlagState::On)
                .with_default_serve(Serve::variation("true"))
                .with_override(VariationMap::new("false").with_segment("outage")),
        )
        .unwrap();

    query
        .set_flag(
            Flag::new(
                "banner",
                FlagKind::String,
                vec![
                    Variation::new("none", ""),
                    Variation::new("sale", "Summer sale!"),
                    Variation::new("vip", "Welcome back"),
                ],
                "none",
            )
            .with_state(FlagState::On)
            .with_default_serve(Serve::variation("sale"))
            .with_rule(
                ServingRule::new(0, Serve::variation("vip")).with_clause(Clause::new(
                    "plan",
                    Operator::Equal,
                    vec!["enterprise".to_string()],
                )),
            )
            .with_prerequisite(Prerequisite::new("kill-switch", ["true"])),
        )
        .unwrap();

    query
        .set_flag(
            Flag::new(
                "rate-limit",
                FlagKind::Int,
                vec![Variation::new("low", "100"), Variation::new("high", "1000")],
                "low",
            )
            .with_state(FlagState::On)
            .with_default_serve(Serve::variation("low"))
            .with_rule(
                ServingRule::new(0, Serve::variation("high")).with_clause(Clause::new(
                    "plan",
                    Operator::In,
                    vec!["pro".to_string(), "enterprise".to_string()],
                )),
            ),
        )
        .unwrap();

    query
        .set_segment(Segment::new("outage").include("region-eu-1"))
        .unwrap();

    Arc::new(query)
}

// =============================================================================
// Typed Evaluation
// =============================================================================

#[test]
fn test_typed_evaluation_workflow() {
    let evaluator = Evaluator::new(store(), None);
    let enterprise = Target::new("acct-1").with_attribute("plan", "enterprise");
    let free = Target::new("acct-2").with_attribute("plan", "free");

    assert!(evaluator.bool_variation("kill-switch", &free, false));
    assert_eq!(evaluator.string_variation("banner", &enterprise, "?"), "Welcome back");
    assert_eq!(evaluator.string_variation("banner", &free, "?"), "Summer sale!");
    assert_eq!(evaluator.int_variation("rate-limit", &enterprise, 0), 1000);
    assert_eq!(evaluator.number_variation("rate-limit", &free, 0.0), 100.0);
}

#[test]
fn test_kill_switch_disables_dependent_flag() {
    let evaluator = Evaluator::new(store(), None);
    let target = Target::new("region-eu-1").with_attribute("plan", "enterprise");

    assert!(!evaluator.bool_variation("kill-switch", &target, true));
    assert_eq!(evaluator.string_variation("banner", &target, "?"), "");
}

#[test]
fn test_live_definition_update() {
    let query = store();
    let evaluator = Evaluator::new(query.clone(), None);
    let target = Target::new("acct-3");

    assert_eq!(evaluator.int_variation("rate-limit", &target, 0), 100);

    let mut updated = (*query.get_flag("rate-limit").unwrap()).clone();
    updated.state = FlagState::Off;
    updated.off_variation = "high".to_string();
    query.set_flag(updated).unwrap();

    assert_eq!(evaluator.int_variation("rate-limit", &target, 0), 1000);
}

// =============================================================================
// Snapshot Loading
// =============================================================================

#[test]
fn test_json_flag_from_snapshot() {
    let snapshot = json!({
        "flags": [{
            "feature": "theme",
            "kind": "json",
            "state": "on",
            "variations": [
                { "identifier": "dark", "value": "{\"background\":\"#000\",\"contrast\":2}" },
                { "identifier": "light", "value": "{\"background\":\"#fff\",\"contrast\":1}" }
            ],
            "offVariation": "light",
            "defaultServe": { "distribution": {
                "bucketBy": "team",
                "variations": [
                    { "variation": "dark", "weight": 100 },
                    { "variation": "light", "weight": 0 }
                ]
            } }
        }]
    });
    let query = InMemoryQuery::from_json(&snapshot.to_string()).unwrap();
    let evaluator = Evaluator::new(Arc::new(query), None);

    let theme = evaluator.json_variation(
        "theme",
        &Target::new("u1").with_attribute("team", "design"),
        serde_json::Map::new(),
    );
    assert_eq!(theme.get("background"), Some(&json!("#000")));
    assert_eq!(theme.get("contrast"), Some(&json!(2)));
}

#[test]
fn test_config_from_builder() {
    let evaluator = Evaluator::builder()
        .query(store())
        .config(EvaluatorConfig::new().with_bucket_fallback_attribute("name"))
        .build()
        .unwrap();

    assert_eq!(evaluator.config().bucket_fallback_attribute, "name");
    assert!(matches!(
        Evaluator::builder().build(),
        Err(EvaluationError::MissingQuery)
    ));
}

#[test]
fn test_logging_facade_is_reexported() {
    pennant::log::set_level(pennant::log::Level::Error);
    assert!(pennant::log::is_level_enabled(pennant::log::Level::Error));
}
