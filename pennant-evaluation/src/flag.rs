//! Flag and Segment Definitions
//!
//! Wire model for flags, variations, serving rules, clauses and segments as
//! supplied by a [`crate::Query`] provider. Field names follow the camelCase
//! JSON used by flag management services.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared value kind of a flag.
///
/// Integer and floating point flags share the `int` kind on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagKind {
    Boolean,
    String,
    Int,
    Json,
}

impl FlagKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlagKind::Boolean => "boolean",
            FlagKind::String => "string",
            FlagKind::Int => "int",
            FlagKind::Json => "json",
        }
    }
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a flag is serving targeted variations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagState {
    On,
    #[default]
    Off,
}

/// One value a flag can serve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variation {
    pub identifier: String,

    /// Serialized value, interpreted according to the flag kind
    pub value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Variation {
    pub fn new(identifier: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            value: value.into(),
            name: None,
            description: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A variation identifier and its share of a distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedVariation {
    pub variation: String,
    pub weight: u32,
}

/// Percentage rollout across variations.
///
/// Weights are expected to sum to 100 and are not re-normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    /// Target attribute hashed to pick a bucket
    pub bucket_by: String,

    pub variations: Vec<WeightedVariation>,
}

impl Distribution {
    pub fn new(bucket_by: impl Into<String>) -> Self {
        Self {
            bucket_by: bucket_by.into(),
            variations: Vec::new(),
        }
    }

    pub fn with_weight(mut self, variation: impl Into<String>, weight: u32) -> Self {
        self.variations.push(WeightedVariation {
            variation: variation.into(),
            weight,
        });
        self
    }
}

/// What a rule or the default serve hands out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Serve {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<Distribution>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variation: Option<String>,
}

impl Serve {
    pub fn variation(identifier: impl Into<String>) -> Self {
        Self {
            distribution: None,
            variation: Some(identifier.into()),
        }
    }

    pub fn distribution(distribution: Distribution) -> Self {
        Self {
            distribution: Some(distribution),
            variation: None,
        }
    }
}

/// Clause comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "starts_with")]
    StartsWith,
    #[serde(rename = "ends_with")]
    EndsWith,
    #[serde(rename = "match")]
    Match,
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "equal")]
    Equal,
    #[serde(rename = "equal_sensitive")]
    EqualSensitive,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "gt")]
    GreaterThan,
    #[serde(rename = "segmentMatch")]
    SegmentMatch,
    /// Any operator this engine does not know; never matches
    #[serde(other)]
    Unknown,
}

/// A single condition on a target attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clause {
    /// Attribute name; ignored by [`Operator::SegmentMatch`]
    #[serde(default)]
    pub attribute: String,

    #[serde(rename = "op")]
    pub operator: Operator,

    /// Comparison values; single-value operators use the first one
    #[serde(default)]
    pub values: Vec<String>,
}

impl Clause {
    pub fn new(attribute: impl Into<String>, operator: Operator, values: Vec<String>) -> Self {
        Self {
            attribute: attribute.into(),
            operator,
            values,
        }
    }

    /// Clause matching membership of any of the given segments.
    pub fn segment_match<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            attribute: String::new(),
            operator: Operator::SegmentMatch,
            values: segments.into_iter().map(Into::into).collect(),
        }
    }
}

/// Prioritized conjunction of clauses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServingRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,

    /// Lower evaluates first
    pub priority: i32,

    pub clauses: Vec<Clause>,

    pub serve: Serve,
}

impl ServingRule {
    pub fn new(priority: i32, serve: Serve) -> Self {
        Self {
            rule_id: None,
            priority,
            clauses: Vec::new(),
            serve,
        }
    }

    pub fn with_clause(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }
}

/// Reference to a target inside segment lists and overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRef {
    pub identifier: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl TargetRef {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            name: None,
        }
    }
}

/// Explicit variation assignment for targets and segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariationMap {
    pub variation: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<TargetRef>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_segments: Option<Vec<String>>,
}

impl VariationMap {
    pub fn new(variation: impl Into<String>) -> Self {
        Self {
            variation: variation.into(),
            targets: None,
            target_segments: None,
        }
    }

    pub fn with_target(mut self, identifier: impl Into<String>) -> Self {
        self.targets
            .get_or_insert_with(Vec::new)
            .push(TargetRef::new(identifier));
        self
    }

    pub fn with_segment(mut self, segment: impl Into<String>) -> Self {
        self.target_segments
            .get_or_insert_with(Vec::new)
            .push(segment.into());
        self
    }
}

/// Dependency on another flag resolving to one of `variations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prerequisite {
    /// Identifier of the prerequisite flag
    #[serde(alias = "feature")]
    pub flag: String,

    pub variations: Vec<String>,
}

impl Prerequisite {
    pub fn new<I, S>(flag: impl Into<String>, variations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            flag: flag.into(),
            variations: variations.into_iter().map(Into::into).collect(),
        }
    }
}

/// Feature flag definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flag {
    #[serde(alias = "feature")]
    pub identifier: String,

    pub kind: FlagKind,

    #[serde(default)]
    pub state: FlagState,

    pub variations: Vec<Variation>,

    /// Served when the flag is off or its prerequisites fail
    pub off_variation: String,

    /// Served when no override or rule matches
    #[serde(default)]
    pub default_serve: Serve,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<ServingRule>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variation_to_target_map: Option<Vec<VariationMap>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prerequisites: Option<Vec<Prerequisite>>,
}

impl Flag {
    /// Create a flag with no targeting, serving `off_variation` when off.
    pub fn new(
        identifier: impl Into<String>,
        kind: FlagKind,
        variations: Vec<Variation>,
        off_variation: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            kind,
            state: FlagState::Off,
            variations,
            off_variation: off_variation.into(),
            default_serve: Serve::default(),
            rules: None,
            variation_to_target_map: None,
            prerequisites: None,
        }
    }

    /// Boolean flag with `true`/`false` variations, off serving `false`.
    pub fn boolean(identifier: impl Into<String>) -> Self {
        Self::new(
            identifier,
            FlagKind::Boolean,
            vec![Variation::new("true", "true"), Variation::new("false", "false")],
            "false",
        )
    }

    pub fn with_state(mut self, state: FlagState) -> Self {
        self.state = state;
        self
    }

    pub fn with_default_serve(mut self, serve: Serve) -> Self {
        self.default_serve = serve;
        self
    }

    pub fn with_rule(mut self, rule: ServingRule) -> Self {
        self.rules.get_or_insert_with(Vec::new).push(rule);
        self
    }

    pub fn with_override(mut self, map: VariationMap) -> Self {
        self.variation_to_target_map
            .get_or_insert_with(Vec::new)
            .push(map);
        self
    }

    pub fn with_prerequisite(mut self, prerequisite: Prerequisite) -> Self {
        self.prerequisites
            .get_or_insert_with(Vec::new)
            .push(prerequisite);
        self
    }

    pub fn is_on(&self) -> bool {
        self.state == FlagState::On
    }

    /// Look up one of this flag's variations by identifier.
    pub fn variation(&self, identifier: &str) -> Option<&Variation> {
        self.variations.iter().find(|v| v.identifier == identifier)
    }
}

/// Reusable group of targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub identifier: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excluded: Option<Vec<TargetRef>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub included: Option<Vec<TargetRef>>,

    /// Clauses that must all match for rule-based membership
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<Clause>>,
}

impl Segment {
    pub fn new(identifier: impl Into<String>) -> Self {
        let identifier = identifier.into();
        Self {
            name: identifier.clone(),
            identifier,
            ..Self::default()
        }
    }

    pub fn include(mut self, identifier: impl Into<String>) -> Self {
        self.included
            .get_or_insert_with(Vec::new)
            .push(TargetRef::new(identifier));
        self
    }

    pub fn exclude(mut self, identifier: impl Into<String>) -> Self {
        self.excluded
            .get_or_insert_with(Vec::new)
            .push(TargetRef::new(identifier));
        self
    }

    pub fn with_rule(mut self, clause: Clause) -> Self {
        self.rules.get_or_insert_with(Vec::new).push(clause);
        self
    }
}

/// Whether `identifier` appears in a list of target references.
pub(crate) fn contains_target(list: &[TargetRef], identifier: &str) -> bool {
    list.iter().any(|t| t.identifier == identifier)
}
