//! Add, multiply, subtract and double.

use super::{operand, operands, Number};
use nodeflow_core::prelude::*;

/// Sum of every numeric input.
///
/// Accepts any number of ports; the default `in` port is multi-feed, and
/// nodes may declare their own ports (`a`, `b`, ...) instead.
///
/// # Example Configuration
/// ```yaml
/// nodes:
///   - id: add
///     type: math::add
///     inputs: { a: number, b: number }
///     outputs: { sum: number }
///     values: { a: 2, b: 3 }
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct Add;

impl Computation for Add {
    fn info(&self) -> ComputationInfo {
        ComputationInfo::new("math", "add")
            .with_description("Sum of all numeric inputs; arrays are flattened")
            .with_input("in", InputPort::new(PortType::Number).multi())
            .with_output("out", PortType::Number)
    }

    fn compute<'a>(&'a self, input: ComputeInput) -> ComputeFuture<'a> {
        Box::pin(async move {
            let total = operands(&input)?
                .into_iter()
                .fold(Number::Int(0), Number::add);
            tracing::trace!(node_id = %input.node_id, ?total, "Add: computed sum");
            Ok(NodeOutputs::single(total.into_value()))
        })
    }
}

/// Product of every numeric input.
#[derive(Debug, Default, Clone, Copy)]
pub struct Multiply;

impl Computation for Multiply {
    fn info(&self) -> ComputationInfo {
        ComputationInfo::new("math", "multiply")
            .with_description("Product of all numeric inputs; arrays are flattened")
            .with_input("in", InputPort::new(PortType::Number).multi())
            .with_output("out", PortType::Number)
    }

    fn compute<'a>(&'a self, input: ComputeInput) -> ComputeFuture<'a> {
        Box::pin(async move {
            let product = operands(&input)?
                .into_iter()
                .fold(Number::Int(1), Number::mul);
            Ok(NodeOutputs::single(product.into_value()))
        })
    }
}

/// Input `a` minus input `b`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Subtract;

impl Computation for Subtract {
    fn info(&self) -> ComputationInfo {
        ComputationInfo::new("math", "subtract")
            .with_description("Input a minus input b")
            .with_input("a", PortType::Number)
            .with_input("b", PortType::Number)
            .with_output("out", PortType::Number)
    }

    fn compute<'a>(&'a self, input: ComputeInput) -> ComputeFuture<'a> {
        Box::pin(async move {
            let difference = operand(&input, "a")?.sub(operand(&input, "b")?);
            Ok(NodeOutputs::single(difference.into_value()))
        })
    }
}

/// Twice the sole numeric input.
#[derive(Debug, Default, Clone, Copy)]
pub struct Double;

impl Computation for Double {
    fn info(&self) -> ComputationInfo {
        ComputationInfo::new("math", "double")
            .with_description("Sole numeric input multiplied by two")
            .with_input("in", PortType::Number)
            .with_output("out", PortType::Number)
    }

    fn compute<'a>(&'a self, input: ComputeInput) -> ComputeFuture<'a> {
        Box::pin(async move {
            let (port, value) = input.sole_input()?;
            let doubled = Number::from_value(port, value.inner())?.mul(Number::Int(2));
            Ok(NodeOutputs::single(doubled.into_value()))
        })
    }
}
