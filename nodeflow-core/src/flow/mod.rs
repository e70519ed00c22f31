//! Workflow definition types for JSON and YAML deserialization.
//!
//! - [`WorkflowDefinition`] - the top-level document
//! - [`NodeDefinition`] - a node with its ports, literal values and config
//! - [`EdgeDefinition`] - a connection between two ports
//! - [`PortType`] / [`InputPort`] - port declarations

mod definition;
mod edge;
mod node;
mod port;
mod validation;

pub use definition::WorkflowDefinition;
pub use edge::{EdgeDefinition, DEFAULT_INPUT_PORT, DEFAULT_OUTPUT_PORT};
pub use node::NodeDefinition;
pub use port::{InputPort, PortType};
pub use validation::{GraphLimits, ValidationError, ValidationErrorKind};
