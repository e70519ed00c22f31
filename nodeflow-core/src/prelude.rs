//! Prelude for convenient imports.
//!
//! ```ignore
//! use nodeflow_core::prelude::*;
//! ```

pub use crate::error::{ComputeError, CycleError, NodeError, NodeflowError, Result};
pub use crate::flow::{
    EdgeDefinition, GraphLimits, InputPort, NodeDefinition, PortType, ValidationError,
    ValidationErrorKind, WorkflowDefinition,
};
pub use crate::registry::ComputationRegistry;
pub use crate::traits::{
    Computation, ComputationInfo, ComputeFuture, ComputeInput, FnComputation, NodeOutputs,
    PortCatalog,
};
pub use crate::types::{EvaluationId, NodeId};
pub use crate::value::Value;
