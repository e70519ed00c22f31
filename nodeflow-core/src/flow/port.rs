//! Port declarations.
//!
//! Input ports may be written in shorthand or in full:
//!
//! ```yaml
//! inputs:
//!   a: number
//!   items: { type: array, required: false }
//!   values: { type: number, multi: true }
//! outputs:
//!   sum: number
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The declared type of values carried by a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortType {
    /// Accepts any value.
    #[default]
    Any,
    /// JSON number.
    Number,
    /// JSON string.
    String,
    /// JSON boolean.
    Boolean,
    /// JSON array.
    Array,
    /// JSON object.
    Object,
    /// JSON null.
    Null,
}

impl PortType {
    /// Whether an edge may connect an output of type `self` to an input of
    /// type `target`. `Any` on either side is compatible with everything.
    #[must_use]
    pub fn is_compatible_with(self, target: PortType) -> bool {
        self == target || self == PortType::Any || target == PortType::Any
    }

    /// Lowercase name used on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Number => "number",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Null => "null",
        }
    }
}

impl fmt::Display for PortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PortType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "any" => Ok(Self::Any),
            "number" => Ok(Self::Number),
            "string" => Ok(Self::String),
            "boolean" | "bool" => Ok(Self::Boolean),
            "array" => Ok(Self::Array),
            "object" => Ok(Self::Object),
            "null" => Ok(Self::Null),
            other => Err(format!("unknown port type '{other}'")),
        }
    }
}

/// Declaration of a named input port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "InputPortRepr")]
pub struct InputPort {
    /// Declared value type.
    #[serde(rename = "type")]
    pub port_type: PortType,
    /// Whether the port must be fed for the graph to be valid.
    pub required: bool,
    /// Whether the port accepts several feeds (values arrive as an array).
    pub multi: bool,
}

impl InputPort {
    /// A required, single-feed port of the given type.
    pub fn new(port_type: PortType) -> Self {
        Self {
            port_type,
            required: true,
            multi: false,
        }
    }

    /// Mark the port optional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Allow several feeds.
    pub fn multi(mut self) -> Self {
        self.multi = true;
        self
    }
}

impl From<PortType> for InputPort {
    fn from(port_type: PortType) -> Self {
        Self::new(port_type)
    }
}

fn default_required() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(untagged)]
enum InputPortRepr {
    Short(PortType),
    Full {
        #[serde(rename = "type", default)]
        port_type: PortType,
        #[serde(default = "default_required")]
        required: bool,
        #[serde(default)]
        multi: bool,
    },
}

impl From<InputPortRepr> for InputPort {
    fn from(repr: InputPortRepr) -> Self {
        match repr {
            InputPortRepr::Short(port_type) => Self::new(port_type),
            InputPortRepr::Full {
                port_type,
                required,
                multi,
            } => Self {
                port_type,
                required,
                multi,
            },
        }
    }
}
