//! Edge definition as submitted by callers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default output port used when an edge source names no port.
pub const DEFAULT_OUTPUT_PORT: &str = "out";

/// Default input port used when an edge target names no port.
pub const DEFAULT_INPUT_PORT: &str = "in";

/// A directed connection from an output port to an input port.
///
/// Two wire formats are accepted:
///
/// ```yaml
/// edges:
///   # "node.port" strings; the port defaults to "out" / "in"
///   - from: add.sum
///     to: double.x
///
///   # explicit endpoints
///   - source: add
///     sourcePort: sum
///     target: double
///     targetPort: x
/// ```
///
/// Edges always serialize in the first form with both ports spelled out.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "EdgeRepr", into = "EdgeArrow")]
pub struct EdgeDefinition {
    /// Source node ID.
    pub source: String,
    /// Output port on the source node.
    pub source_port: String,
    /// Target node ID.
    pub target: String,
    /// Input port on the target node.
    pub target_port: String,
}

impl EdgeDefinition {
    /// Create an edge between explicit ports.
    pub fn new(
        source: impl Into<String>,
        source_port: impl Into<String>,
        target: impl Into<String>,
        target_port: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            source_port: source_port.into(),
            target: target.into(),
            target_port: target_port.into(),
        }
    }

    /// Create an edge from `"node.port"` strings.
    pub fn parse(from: &str, to: &str) -> Self {
        let (source, source_port) = parse_node_port(from, DEFAULT_OUTPUT_PORT);
        let (target, target_port) = parse_node_port(to, DEFAULT_INPUT_PORT);
        Self::new(source, source_port, target, target_port)
    }

    /// Source endpoint in `"node.port"` form.
    #[must_use]
    pub fn from_ref(&self) -> String {
        format!("{}.{}", self.source, self.source_port)
    }

    /// Target endpoint in `"node.port"` form.
    #[must_use]
    pub fn to_ref(&self) -> String {
        format!("{}.{}", self.target, self.target_port)
    }
}

impl fmt::Display for EdgeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from_ref(), self.to_ref())
    }
}

/// Split `"node.port"` at the last dot. A missing or malformed suffix
/// leaves the whole string as the node ID and uses `default_port`.
fn parse_node_port<'a>(s: &'a str, default_port: &'a str) -> (&'a str, &'a str) {
    if let Some(dot) = s.rfind('.') {
        let port = &s[dot + 1..];
        if !port.is_empty() && port.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return (&s[..dot], port);
        }
    }
    (s, default_port)
}

#[derive(Serialize, Deserialize)]
struct EdgeArrow {
    from: String,
    to: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EdgeRepr {
    Arrow(EdgeArrow),
    Endpoints {
        source: String,
        #[serde(default, alias = "sourcePort", alias = "sourceHandle")]
        source_port: Option<String>,
        target: String,
        #[serde(default, alias = "targetPort", alias = "targetHandle")]
        target_port: Option<String>,
    },
}

impl From<EdgeRepr> for EdgeDefinition {
    fn from(repr: EdgeRepr) -> Self {
        match repr {
            EdgeRepr::Arrow(EdgeArrow { from, to }) => Self::parse(&from, &to),
            EdgeRepr::Endpoints {
                source,
                source_port,
                target,
                target_port,
            } => Self::new(
                source,
                source_port.unwrap_or_else(|| DEFAULT_OUTPUT_PORT.to_string()),
                target,
                target_port.unwrap_or_else(|| DEFAULT_INPUT_PORT.to_string()),
            ),
        }
    }
}

impl From<EdgeDefinition> for EdgeArrow {
    fn from(edge: EdgeDefinition) -> Self {
        Self {
            from: edge.from_ref(),
            to: edge.to_ref(),
        }
    }
}
