//! Constant source.

use nodeflow_core::prelude::*;

/// Emits `config.value` unchanged.
///
/// # Example Configuration
/// ```yaml
/// nodes:
///   - id: seven
///     type: math::constant
///     config: { value: 7 }
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct Constant;

impl Computation for Constant {
    fn info(&self) -> ComputationInfo {
        ComputationInfo::new("math", "constant")
            .with_description("Emit the configured value")
            .with_output("out", PortType::Any)
    }

    fn compute<'a>(&'a self, input: ComputeInput) -> ComputeFuture<'a> {
        Box::pin(async move { Ok(NodeOutputs::single(input.require_config("value")?)) })
    }
}
