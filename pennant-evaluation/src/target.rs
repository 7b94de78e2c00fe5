//! Evaluation targets and their attributes.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

/// Attribute name resolving to [`Target::identifier`].
pub const IDENTIFIER_ATTRIBUTE: &str = "identifier";
/// Attribute name resolving to [`Target::name`].
pub const NAME_ATTRIBUTE: &str = "name";
/// Attribute name resolving to [`Target::anonymous`].
pub const ANONYMOUS_ATTRIBUTE: &str = "anonymous";

/// Value of a custom target attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Number(f64),
    String(String),
    List(Vec<AttributeValue>),
}

impl AttributeValue {
    /// Textual form used by every clause operator.
    ///
    /// Lists render as their elements' text joined with `,`.
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            AttributeValue::String(s) => Cow::Borrowed(s.as_str()),
            AttributeValue::Int(i) => Cow::Owned(i.to_string()),
            AttributeValue::Bool(true) => Cow::Borrowed("true"),
            AttributeValue::Bool(false) => Cow::Borrowed("false"),
            AttributeValue::Number(n) => Cow::Owned(n.to_string()),
            AttributeValue::List(items) => Cow::Owned(
                items
                    .iter()
                    .map(|item| item.to_text())
                    .collect::<Vec<_>>()
                    .join(","),
            ),
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Int(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        AttributeValue::Int(i64::from(value))
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Number(value)
    }
}

impl<T: Into<AttributeValue>> From<Vec<T>> for AttributeValue {
    fn from(values: Vec<T>) -> Self {
        AttributeValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// The entity a flag is evaluated for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Unique identifier within a deployment
    pub identifier: String,

    /// Human readable name
    #[serde(default)]
    pub name: String,

    /// Whether the target is anonymous; `None` when unknown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anonymous: Option<bool>,

    /// Custom attributes
    #[serde(default)]
    pub attributes: HashMap<String, AttributeValue>,
}

impl Target {
    /// Create a target with the given identifier, also used as its name.
    pub fn new(identifier: impl Into<String>) -> Self {
        let identifier = identifier.into();
        Self {
            name: identifier.clone(),
            identifier,
            anonymous: None,
            attributes: HashMap::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn anonymous(mut self, anonymous: bool) -> Self {
        self.anonymous = Some(anonymous);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Resolve an attribute by name.
    ///
    /// Built-in fields match case-insensitively and shadow custom attributes
    /// of the same name; custom attributes match exactly.
    pub fn attribute(&self, name: &str) -> Option<Cow<'_, AttributeValue>> {
        if name.eq_ignore_ascii_case(IDENTIFIER_ATTRIBUTE) {
            return Some(Cow::Owned(AttributeValue::String(self.identifier.clone())));
        }
        if name.eq_ignore_ascii_case(NAME_ATTRIBUTE) {
            return Some(Cow::Owned(AttributeValue::String(self.name.clone())));
        }
        if name.eq_ignore_ascii_case(ANONYMOUS_ATTRIBUTE) {
            return self.anonymous.map(|a| Cow::Owned(AttributeValue::Bool(a)));
        }
        self.attributes.get(name).map(Cow::Borrowed)
    }

    /// Resolve an attribute and coerce it to text.
    pub fn attribute_text(&self, name: &str) -> Option<String> {
        self.attribute(name).map(|value| value.to_text().into_owned())
    }
}
