//! Core traits for nodeflow components.
//!
//! - `Computation`: the function a node's type tag resolves to
//! - `PortCatalog`: source of default port declarations per type tag

mod catalog;
mod computation;

pub use catalog::PortCatalog;
pub use computation::{
    Computation, ComputationInfo, ComputeFuture, ComputeInput, FnComputation, NodeOutputs,
};
