//! Arithmetic computations (`math::*`).
//!
//! Operands stay integers while every operand is an integer and no step
//! overflows; otherwise the result is a float.

mod arithmetic;
mod constant;

pub use arithmetic::{Add, Double, Multiply, Subtract};
pub use constant::Constant;

use nodeflow_core::{ComputeError, ComputeInput, Value};
use serde_json::Value as JsonValue;

/// A numeric operand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub(crate) fn from_value(port: &str, value: &JsonValue) -> Result<Self, ComputeError> {
        if let Some(i) = value.as_i64() {
            return Ok(Self::Int(i));
        }
        value
            .as_f64()
            .map(Self::Float)
            .ok_or_else(|| ComputeError::invalid_input(port, format!("expected a number, got {value}")))
    }

    fn as_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
        }
    }

    pub(crate) fn add(self, other: Self) -> Self {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a
                .checked_add(b)
                .map_or(Self::Float(a as f64 + b as f64), Self::Int),
            (a, b) => Self::Float(a.as_f64() + b.as_f64()),
        }
    }

    pub(crate) fn sub(self, other: Self) -> Self {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a
                .checked_sub(b)
                .map_or(Self::Float(a as f64 - b as f64), Self::Int),
            (a, b) => Self::Float(a.as_f64() - b.as_f64()),
        }
    }

    pub(crate) fn mul(self, other: Self) -> Self {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a
                .checked_mul(b)
                .map_or(Self::Float(a as f64 * b as f64), Self::Int),
            (a, b) => Self::Float(a.as_f64() * b.as_f64()),
        }
    }

    pub(crate) fn into_value(self) -> Value {
        match self {
            Self::Int(i) => Value::int(i),
            Self::Float(f) => Value::float(f),
        }
    }
}

/// Every numeric operand across all input ports, in port-name order.
/// Array values contribute each of their elements.
pub(crate) fn operands(input: &ComputeInput) -> Result<Vec<Number>, ComputeError> {
    let mut numbers = Vec::new();
    for (port, value) in &input.inputs {
        match value.inner() {
            JsonValue::Array(items) => {
                for item in items {
                    numbers.push(Number::from_value(port, item)?);
                }
            }
            other => numbers.push(Number::from_value(port, other)?),
        }
    }
    Ok(numbers)
}

/// The number on one named input port.
pub(crate) fn operand(input: &ComputeInput, port: &str) -> Result<Number, ComputeError> {
    Number::from_value(port, input.require(port)?.inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn integer_arithmetic_stays_integral() {
        let sum = Number::Int(2).add(Number::Int(3));
        assert_eq!(sum, Number::Int(5));
        assert!(sum.into_value().is_integer());
    }

    #[test]
    fn overflow_promotes_to_float() {
        let sum = Number::Int(i64::MAX).add(Number::Int(1));
        assert!(matches!(sum, Number::Float(_)));
    }

    #[test]
    fn mixed_operands_are_float() {
        assert_eq!(Number::Int(2).mul(Number::Float(1.5)), Number::Float(3.0));
    }

    #[test]
    fn operands_flatten_arrays() {
        let mut inputs = BTreeMap::new();
        inputs.insert("a".to_string(), Value::from(json!([1, 2])));
        inputs.insert("b".to_string(), Value::int(3));
        let input = ComputeInput::new("n", inputs);

        let numbers = operands(&input).unwrap();
        assert_eq!(numbers, vec![Number::Int(1), Number::Int(2), Number::Int(3)]);
    }

    #[test]
    fn non_numeric_operand_names_the_port() {
        let mut inputs = BTreeMap::new();
        inputs.insert("x".to_string(), Value::string("seven"));
        let input = ComputeInput::new("n", inputs);

        let err = operands(&input).unwrap_err();
        assert!(matches!(err, ComputeError::InvalidInput { ref port, .. } if port == "x"));
    }
}
