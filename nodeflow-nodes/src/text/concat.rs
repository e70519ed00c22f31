//! Concat computation (string combination).

use nodeflow_core::flow::InputPort;
use nodeflow_core::prelude::*;
use serde_json::Value as JsonValue;

/// Joins the text form of every input with `config.separator`.
///
/// Ports are visited in name order. Array values contribute each element,
/// so a multi-feed `in` port joins its feeds in feed order.
///
/// # Example Configuration
/// ```yaml
/// nodes:
///   - id: greeting
///     type: text::concat
///     inputs: { first: string, last: string }
///     config: { separator: " " }
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct Concat;

impl Concat {
    fn parts(input: &ComputeInput) -> Vec<String> {
        let mut parts = Vec::new();
        for value in input.inputs.values() {
            match value.inner() {
                JsonValue::Array(items) => {
                    parts.extend(items.iter().map(|item| Value(item.clone()).to_text()));
                }
                _ => parts.push(value.to_text()),
            }
        }
        parts
    }
}

impl Computation for Concat {
    fn info(&self) -> ComputationInfo {
        ComputationInfo::new("text", "concat")
            .with_description("Join the text form of all inputs with a separator")
            .with_input("in", InputPort::new(PortType::Any).multi())
            .with_output("out", PortType::String)
    }

    fn compute<'a>(&'a self, input: ComputeInput) -> ComputeFuture<'a> {
        Box::pin(async move {
            let separator = match input.config_value("separator") {
                None => String::new(),
                Some(v) => v
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| ComputeError::invalid_config("separator", "expected a string"))?,
            };

            let parts = Self::parts(&input);
            let joined = parts.join(&separator);

            tracing::debug!(
                node_id = %input.node_id,
                parts = parts.len(),
                result_len = joined.len(),
                "Concat: built string"
            );

            Ok(NodeOutputs::single(joined))
        })
    }
}
