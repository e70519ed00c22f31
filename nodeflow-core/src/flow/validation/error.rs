//! Validation error types.

/// A structural problem in a submitted workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The type of error.
    pub kind: ValidationErrorKind,
    /// Where in the workflow the problem was found (e.g., "nodes.add.inputs.a").
    pub location: String,
    /// Human-readable error message.
    pub message: String,
}

/// Types of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Missing or empty required field.
    MissingField,
    /// Invalid value for a field.
    InvalidValue,
    /// Two nodes share an ID.
    DuplicateId,
    /// Edge references a node that does not exist.
    UnknownNode,
    /// Edge or literal value references an undeclared port.
    UnknownPort,
    /// Connected ports declare incompatible types.
    TypeMismatch,
    /// A single-feed input port is fed more than once.
    DuplicateFeed,
    /// A required input port is not fed at all.
    UnfedInput,
    /// No computation is known for the node's type tag.
    UnknownNodeType,
    /// Size limit exceeded (document, node, edge or port count).
    LimitExceeded,
}

impl ValidationErrorKind {
    /// Upper-case name used in messages and API payloads.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "MISSING_FIELD",
            Self::InvalidValue => "INVALID_VALUE",
            Self::DuplicateId => "DUPLICATE_ID",
            Self::UnknownNode => "UNKNOWN_NODE",
            Self::UnknownPort => "UNKNOWN_PORT",
            Self::TypeMismatch => "TYPE_MISMATCH",
            Self::DuplicateFeed => "DUPLICATE_FEED",
            Self::UnfedInput => "UNFED_INPUT",
            Self::UnknownNodeType => "UNKNOWN_NODE_TYPE",
            Self::LimitExceeded => "LIMIT_EXCEEDED",
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.location, self.message)
    }
}

impl std::fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    /// Create a new validation error.
    pub fn new(
        kind: ValidationErrorKind,
        location: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            location: location.into(),
            message: message.into(),
        }
    }

    /// Create a missing field error.
    pub fn missing_field(location: impl Into<String>, field: &str) -> Self {
        Self::new(
            ValidationErrorKind::MissingField,
            location,
            format!("missing required field '{field}'"),
        )
    }

    /// Create a duplicate ID error.
    pub fn duplicate_id(location: impl Into<String>, id: &str) -> Self {
        Self::new(
            ValidationErrorKind::DuplicateId,
            location,
            format!("duplicate node id '{id}'"),
        )
    }

    /// Create an unknown node error.
    pub fn unknown_node(location: impl Into<String>, node: &str) -> Self {
        Self::new(
            ValidationErrorKind::UnknownNode,
            location,
            format!("reference to non-existent node '{node}'"),
        )
    }

    /// Create an unknown port error.
    pub fn unknown_port(location: impl Into<String>, node: &str, port: &str, side: &str) -> Self {
        Self::new(
            ValidationErrorKind::UnknownPort,
            location,
            format!("node '{node}' declares no {side} port '{port}'"),
        )
    }
}
