//! Field definitions and the ordered form data built from them.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A constraint value with the message shown when it is violated.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Constraint<T> {
    pub value: T,
    pub message: String,
}

impl<T> Constraint<T> {
    pub fn new(value: T, message: impl Into<String>) -> Self {
        Self {
            value,
            message: message.into(),
        }
    }
}

/// A compiled format pattern, deserialized from its source string.
#[derive(Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(Self)
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.0.is_match(value)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pattern({:?})", self.0.as_str())
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl TryFrom<String> for Pattern {
    type Error = regex::Error;

    fn try_from(source: String) -> Result<Self, Self::Error> {
        Pattern::new(&source)
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Pattern::try_from(source).map_err(serde::de::Error::custom)
    }
}

impl Serialize for Pattern {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Input type of a field. Only the variants below change validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Number,
    Select,
    Checkbox,
    #[serde(other)]
    Other,
}

/// Static validation rules for one form field.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FieldDefinition {
    pub label: String,
    /// Display name; wins over `label` when set.
    pub title: Option<String>,
    pub required: Constraint<bool>,
    /// Minimum length in characters; `0` disables the check.
    pub min_length: Constraint<usize>,
    /// Maximum length in characters; `0` disables the check.
    pub max_length: Constraint<usize>,
    pub format: Constraint<Option<Pattern>>,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub min: Constraint<Option<f64>>,
    pub max: Constraint<Option<f64>>,
    /// Number step; a fractional step makes the field decimal.
    pub step: Option<Value>,
    /// Allowed keys for select fields.
    pub values: Option<Map<String, Value>>,
    /// Scalar or list default; `Null` means no default.
    pub default_value: Value,
}

impl FieldDefinition {
    /// Name shown to the user in violation messages.
    pub fn display_label(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.label)
    }

    /// Whether number input is parsed as a decimal rather than an integer.
    pub fn is_decimal(&self) -> bool {
        match &self.step {
            Some(Value::Number(n)) => n.as_f64().map(|f| f.fract() != 0.0).unwrap_or(false),
            Some(Value::String(s)) => s.contains('.'),
            _ => false,
        }
    }

    pub fn has_default(&self) -> bool {
        !self.default_value.is_null()
    }
}

/// Field definitions for one `(uri, request type)` pair, in manifest order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    fields: Vec<(String, FieldDefinition)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field, replacing an existing one of the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, field: FieldDefinition) {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = field,
            None => self.fields.push((name, field)),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, field: FieldDefinition) -> Self {
        self.insert(name, field);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, f)| f)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldDefinition)> {
        self.fields.iter().map(|(n, f)| (n.as_str(), f))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Per-resource manifest listing the field names of a form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FormManifest {
    pub fields: Vec<String>,
}
