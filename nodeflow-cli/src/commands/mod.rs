//! CLI command implementations.

pub mod evaluate;
pub mod node_types;
pub mod serve;
pub mod validate;
pub mod version;

use anyhow::{Context, Result};
use nodeflow_core::WorkflowDefinition;
use nodeflow_engine::engine::{EngineConfig, EvaluationEngine};
use nodeflow_nodes::standard_registry;
use std::path::Path;
use std::sync::Arc;

/// Load a workflow file; `.json` is parsed as JSON, anything else as YAML.
pub fn load_workflow(path: &Path) -> Result<WorkflowDefinition> {
    if !path.exists() {
        anyhow::bail!("Workflow file not found: {}", path.display());
    }
    WorkflowDefinition::from_file(path)
        .with_context(|| format!("Failed to load workflow from {}", path.display()))
}

/// An engine over the standard computation library.
pub fn standard_engine(config: EngineConfig) -> EvaluationEngine {
    EvaluationEngine::new(Arc::new(standard_registry()), config)
}
