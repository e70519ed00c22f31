//! Generic process (passthrough).

use nodeflow_core::prelude::*;

/// Passes its sole input through unchanged.
///
/// `config.name` labels the step in logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericProcess;

impl Computation for GenericProcess {
    fn info(&self) -> ComputationInfo {
        ComputationInfo::new("std", "generic_process")
            .with_description("Pass the input through unchanged")
            .with_input("in", PortType::Any)
            .with_output("out", PortType::Any)
    }

    fn compute<'a>(&'a self, input: ComputeInput) -> ComputeFuture<'a> {
        Box::pin(async move {
            let (_, value) = input.sole_input()?;
            let name = input.config_str("name").unwrap_or_default();
            tracing::debug!(node_id = %input.node_id, process = %name, "Processing");
            Ok(NodeOutputs::single(value.clone()))
        })
    }
}
