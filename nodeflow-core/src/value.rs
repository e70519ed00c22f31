//! Dynamic values flowing between node ports.
//!
//! Every port carries a `Value`, a thin wrapper over `serde_json::Value`
//! that adds port-type checks, numeric helpers for the arithmetic
//! computations, and field predicates used by the filter computation.

use crate::error::{NodeflowError, Result};
use crate::flow::PortType;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// A value produced by an output port or bound to an input port.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Value(pub JsonValue);

impl Value {
    /// Create a null value.
    pub fn null() -> Self {
        Self(JsonValue::Null)
    }

    /// Create a boolean value.
    pub fn bool(v: bool) -> Self {
        Self(JsonValue::Bool(v))
    }

    /// Create an integer value.
    pub fn int(v: i64) -> Self {
        Self(JsonValue::Number(v.into()))
    }

    /// Create a floating-point value. Non-finite numbers become null.
    pub fn float(v: f64) -> Self {
        Self(serde_json::Number::from_f64(v).map_or(JsonValue::Null, JsonValue::Number))
    }

    /// Create a string value.
    pub fn string(v: impl Into<String>) -> Self {
        Self(JsonValue::String(v.into()))
    }

    /// Create an array value.
    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        Self(JsonValue::Array(items.into_iter().map(|v| v.0).collect()))
    }

    /// Create an empty object.
    pub fn object() -> Self {
        Self(JsonValue::Object(serde_json::Map::new()))
    }

    /// Parse a value from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map(Self)
            .map_err(|e| NodeflowError::Serialization(format!("failed to parse value: {e}")))
    }

    /// The port type describing this value's kind.
    ///
    /// Null values report `PortType::Null`; nothing reports `Any`.
    #[must_use]
    pub fn port_type(&self) -> PortType {
        match &self.0 {
            JsonValue::Null => PortType::Null,
            JsonValue::Bool(_) => PortType::Boolean,
            JsonValue::Number(_) => PortType::Number,
            JsonValue::String(_) => PortType::String,
            JsonValue::Array(_) => PortType::Array,
            JsonValue::Object(_) => PortType::Object,
        }
    }

    /// Whether the value may travel through a port of the given type.
    #[must_use]
    pub fn conforms_to(&self, port_type: PortType) -> bool {
        port_type == PortType::Any || self.port_type() == port_type
    }

    /// Check if the value is null.
    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    /// Whether this is a number stored without a fractional part.
    pub fn is_integer(&self) -> bool {
        matches!(&self.0, JsonValue::Number(n) if n.is_i64() || n.is_u64())
    }

    /// Numeric value, only for JSON numbers.
    pub fn as_f64(&self) -> Option<f64> {
        self.0.as_f64()
    }

    /// Integer value, only for integral JSON numbers.
    pub fn as_i64(&self) -> Option<i64> {
        self.0.as_i64()
    }

    /// Numeric value, also parsing numeric strings.
    pub fn coerce_f64(&self) -> Option<f64> {
        match &self.0 {
            JsonValue::Number(n) => n.as_f64(),
            JsonValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// String slice, only for JSON strings.
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_str()
    }

    /// Boolean value, only for JSON booleans.
    pub fn as_bool(&self) -> Option<bool> {
        self.0.as_bool()
    }

    /// Array elements, only for JSON arrays.
    pub fn as_array(&self) -> Option<&Vec<JsonValue>> {
        self.0.as_array()
    }

    /// Text form used when joining or comparing values as strings.
    ///
    /// Strings are returned without quotes; null becomes the empty string;
    /// everything else uses its compact JSON form.
    pub fn to_text(&self) -> String {
        match &self.0 {
            JsonValue::String(s) => s.clone(),
            JsonValue::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// Get a field by dot path (`a.b.c`), with `items[0]` indexing and an
    /// optional `$.` prefix. An empty path returns the value itself.
    pub fn get_field(&self, path: &str) -> Option<&JsonValue> {
        let path = path.strip_prefix("$.").unwrap_or(path);
        if path.is_empty() || path == "$" {
            return Some(&self.0);
        }

        let mut current = &self.0;
        for part in path.split('.') {
            if let Some((field, idx)) = part.split_once('[') {
                if !field.is_empty() {
                    current = current.get(field)?;
                }
                let idx: usize = idx.strip_suffix(']')?.parse().ok()?;
                current = current.get(idx)?;
            } else {
                current = current.get(part)?;
            }
        }
        Some(current)
    }

    /// The field at `path` compares equal to `expected`.
    ///
    /// Numbers compare numerically, so `1` equals `1.0`; a string field also
    /// equals the text form of a scalar (`"42"` equals `42`).
    pub fn field_equals(&self, path: &str, expected: &Value) -> bool {
        let Some(field) = self.get_field(path) else {
            return false;
        };
        let field = Value(field.clone());
        if field == *expected {
            return true;
        }
        match (field.as_f64(), expected.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => !field.is_null() && field.to_text() == expected.to_text(),
        }
    }

    /// The field at `path` contains `needle`: substring for strings,
    /// element equality for arrays.
    pub fn field_contains(&self, path: &str, needle: &Value) -> bool {
        match self.get_field(path) {
            Some(JsonValue::String(s)) => s.contains(&needle.to_text()),
            Some(JsonValue::Array(items)) => items.iter().any(|item| *item == needle.0),
            _ => false,
        }
    }

    /// The field at `path` is numerically greater than `threshold`.
    pub fn field_greater_than(&self, path: &str, threshold: f64) -> bool {
        self.get_field(path)
            .and_then(|v| Value(v.clone()).coerce_f64())
            .is_some_and(|v| v > threshold)
    }

    /// The field at `path` is numerically less than `threshold`.
    pub fn field_less_than(&self, path: &str, threshold: f64) -> bool {
        self.get_field(path)
            .and_then(|v| Value(v.clone()).coerce_f64())
            .is_some_and(|v| v < threshold)
    }

    /// The text form of the field at `path` matches `pattern`.
    pub fn field_matches(&self, path: &str, pattern: &regex::Regex) -> bool {
        self.get_field(path)
            .map(|v| Value(v.clone()).to_text())
            .is_some_and(|text| pattern.is_match(&text))
    }

    /// Access the inner serde_json::Value.
    pub fn inner(&self) -> &JsonValue {
        &self.0
    }

    /// Convert into the inner serde_json::Value.
    pub fn into_inner(self) -> JsonValue {
        self.0
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<JsonValue> for Value {
    fn from(v: JsonValue) -> Self {
        Self(v)
    }
}

impl From<Value> for JsonValue {
    fn from(v: Value) -> Self {
        v.0
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::string(s)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::bool(v)
    }
}
