//! Identifier types shared across nodeflow crates.
//!
//! - `NodeId`: user-assigned identifier of a node within a workflow
//! - `EvaluationId`: identifier for a single evaluation request

mod ids;

pub use ids::{EvaluationId, NodeId};
