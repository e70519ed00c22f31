//! nodeflow engine - workflow graph evaluation.
//!
//! This crate provides the evaluation infrastructure for nodeflow:
//! - Graph model and builder with structural validation
//! - Topological scheduler (Kahn order and waves)
//! - Node executor with time budgets and failure capture
//! - Evaluation engine with best-effort and strict failure modes
//! - REST API for submitting workflows
//! - Tracing subscriber setup

#![warn(missing_docs)]

pub mod api;
pub mod engine;
pub mod executor;
pub mod graph;
pub mod observability;
pub mod scheduler;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::api::{ApiError, ApiServer, AppState, EvaluationRecord, ServerConfig};
    pub use crate::engine::{
        EngineConfig, EvaluationEngine, EvaluationResult, EvaluationStatus, FailureMode,
        NodeReport, NodeState, SkipReason,
    };
    pub use crate::executor::{ExecutionContext, NodeExecutor};
    pub use crate::graph::{build_graph, Graph, GraphBuilder, GraphEdge, GraphNode, NodeIndex};
    pub use crate::observability::{init_tracing, LogFormat, TracingConfig};
    pub use crate::scheduler::{order, waves};
    pub use tokio_util::sync::CancellationToken;
}
