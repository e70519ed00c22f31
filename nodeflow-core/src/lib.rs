//! nodeflow core library
//!
//! Foundational types shared by the nodeflow evaluation engine, its
//! standard computation library and its command line interface.
//!
//! # Key Components
//!
//! - **Flow**: serde definitions of workflows, nodes, edges and ports
//! - **Value**: the dynamic value carried by ports
//! - **Traits**: the `Computation` a node type tag resolves to
//! - **Registry**: type tag to computation lookup
//! - **Error**: the error taxonomy with stable codes
//!
//! # Example
//!
//! ```ignore
//! use nodeflow_core::prelude::*;
//!
//! let workflow = WorkflowDefinition::new()
//!     .with_node(
//!         NodeDefinition::new("add", "math::add")
//!             .with_input("a", PortType::Number)
//!             .with_input("b", PortType::Number)
//!             .with_output("sum", PortType::Number)
//!             .with_value("a", 2i64)
//!             .with_value("b", 3i64),
//!     )
//!     .with_node(
//!         NodeDefinition::new("double", "math::double")
//!             .with_input("x", PortType::Number)
//!             .with_output("doubled", PortType::Number),
//!     )
//!     .connect("add.sum", "double.x");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod flow;
pub mod prelude;
pub mod registry;
pub mod traits;
pub mod types;
pub mod value;

pub use error::{ComputeError, CycleError, NodeError, NodeflowError, Result};
pub use flow::{EdgeDefinition, NodeDefinition, PortType, WorkflowDefinition};
pub use registry::ComputationRegistry;
pub use traits::{Computation, ComputationInfo, ComputeInput, NodeOutputs};
pub use types::{EvaluationId, NodeId};
pub use value::Value;
