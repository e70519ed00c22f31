//! Data source.

use nodeflow_core::prelude::*;

/// Emits `config.data`.
///
/// # Example Configuration
/// ```yaml
/// nodes:
///   - id: users
///     type: std::data_source
///     config:
///       data:
///         - { name: ada, status: active }
///         - { name: bob, status: idle }
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct DataSource;

impl Computation for DataSource {
    fn info(&self) -> ComputationInfo {
        ComputationInfo::new("std", "data_source")
            .with_description("Emit the configured data")
            .with_output("out", PortType::Any)
    }

    fn compute<'a>(&'a self, input: ComputeInput) -> ComputeFuture<'a> {
        Box::pin(async move {
            let data = input.require_config("data")?;
            tracing::debug!(node_id = %input.node_id, kind = %data.port_type(), "Data source emitting");
            Ok(NodeOutputs::single(data))
        })
    }
}
