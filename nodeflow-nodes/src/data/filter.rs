//! Filter computation (conditional pass).

use nodeflow_core::prelude::*;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::result::Result;

/// Comparison applied to the selected field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterCondition {
    /// Field equals the value (numbers compare numerically).
    #[default]
    Equals,
    /// String field contains the value, or array field holds it.
    Contains,
    /// Field is numerically greater than the value.
    GreaterThan,
    /// Field is numerically less than the value.
    LessThan,
    /// Text form of the field matches the value as a regex.
    Matches,
}

#[derive(Debug, Deserialize)]
struct FilterConfig {
    #[serde(default)]
    field: String,
    #[serde(default)]
    condition: FilterCondition,
    value: Value,
}

/// A condition bound to its operand.
#[derive(Debug)]
enum Predicate {
    Equals(Value),
    Contains(Value),
    GreaterThan(f64),
    LessThan(f64),
    Matches(Regex),
}

impl Predicate {
    fn compile(condition: FilterCondition, value: Value) -> Result<Self, ComputeError> {
        let threshold = |value: &Value| {
            value
                .coerce_f64()
                .ok_or_else(|| ComputeError::invalid_config("value", format!("expected a number, got {value}")))
        };
        Ok(match condition {
            FilterCondition::Equals => Self::Equals(value),
            FilterCondition::Contains => Self::Contains(value),
            FilterCondition::GreaterThan => Self::GreaterThan(threshold(&value)?),
            FilterCondition::LessThan => Self::LessThan(threshold(&value)?),
            FilterCondition::Matches => {
                let pattern = value
                    .as_str()
                    .ok_or_else(|| ComputeError::invalid_config("value", "expected a regex string"))?;
                let regex = Regex::new(pattern)
                    .map_err(|e| ComputeError::invalid_config("value", e.to_string()))?;
                Self::Matches(regex)
            }
        })
    }

    fn test(&self, item: &Value, field: &str) -> bool {
        match self {
            Self::Equals(expected) => item.field_equals(field, expected),
            Self::Contains(needle) => item.field_contains(field, needle),
            Self::GreaterThan(threshold) => item.field_greater_than(field, *threshold),
            Self::LessThan(threshold) => item.field_less_than(field, *threshold),
            Self::Matches(regex) => item.field_matches(field, regex),
        }
    }
}

/// Keeps values whose `config.field` satisfies `config.condition` against
/// `config.value`.
///
/// An array input is filtered element by element and always produces an
/// array. Any other input is passed through when it matches; when it does
/// not, the node produces nothing and downstream consumers see a missing
/// input.
///
/// An empty `field` tests the value itself.
///
/// # Example Configuration
/// ```yaml
/// nodes:
///   - id: active_users
///     type: std::filter
///     config:
///       field: status
///       condition: equals
///       value: active
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct Filter;

impl Filter {
    fn config(input: &ComputeInput) -> Result<(String, Predicate), ComputeError> {
        let config: FilterConfig = serde_json::from_value(input.config.inner().clone())
            .map_err(|e| ComputeError::invalid_config("filter", e.to_string()))?;
        let predicate = Predicate::compile(config.condition, config.value)?;
        Ok((config.field, predicate))
    }
}

impl Computation for Filter {
    fn info(&self) -> ComputationInfo {
        ComputationInfo::new("std", "filter")
            .with_description("Keep values whose field satisfies a condition")
            .with_input("in", PortType::Any)
            .with_output("out", PortType::Any)
    }

    fn compute<'a>(&'a self, input: ComputeInput) -> ComputeFuture<'a> {
        Box::pin(async move {
            let (field, predicate) = Self::config(&input)?;
            let (_, value) = input.sole_input()?;

            if let JsonValue::Array(items) = value.inner() {
                let kept: Vec<Value> = items
                    .iter()
                    .map(|item| Value(item.clone()))
                    .filter(|item| predicate.test(item, &field))
                    .collect();
                tracing::debug!(
                    node_id = %input.node_id,
                    total = items.len(),
                    kept = kept.len(),
                    "Filter: filtered array"
                );
                return Ok(NodeOutputs::single(Value::array(kept)));
            }

            if predicate.test(value, &field) {
                Ok(NodeOutputs::single(value.clone()))
            } else {
                tracing::debug!(node_id = %input.node_id, field = %field, "Filter: value rejected");
                Ok(NodeOutputs::none())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn input(value: JsonValue, config: JsonValue) -> ComputeInput {
        let mut inputs = BTreeMap::new();
        inputs.insert("in".to_string(), Value::from(value));
        ComputeInput::new("filter", inputs).with_config(config)
    }

    #[tokio::test]
    async fn matching_object_passes() {
        let out = Filter
            .compute(input(
                json!({"status": "active"}),
                json!({"field": "status", "value": "active"}),
            ))
            .await
            .unwrap();
        assert_eq!(out, NodeOutputs::single(json!({"status": "active"})));
    }

    #[tokio::test]
    async fn rejected_object_emits_nothing() {
        let out = Filter
            .compute(input(
                json!({"status": "idle"}),
                json!({"field": "status", "condition": "equals", "value": "active"}),
            ))
            .await
            .unwrap();
        assert_eq!(out, NodeOutputs::none());
    }

    #[tokio::test]
    async fn arrays_are_filtered() {
        let out = Filter
            .compute(input(
                json!([{"age": 30}, {"age": 12}, {"age": 45}]),
                json!({"field": "age", "condition": "greater_than", "value": 18}),
            ))
            .await
            .unwrap();
        assert_eq!(out, NodeOutputs::single(json!([{"age": 30}, {"age": 45}])));
    }

    #[tokio::test]
    async fn empty_field_tests_scalars() {
        let out = Filter
            .compute(input(
                json!([1, 5, 10]),
                json!({"condition": "less_than", "value": 6}),
            ))
            .await
            .unwrap();
        assert_eq!(out, NodeOutputs::single(json!([1, 5])));
    }

    #[tokio::test]
    async fn contains_and_matches() {
        let out = Filter
            .compute(input(
                json!(["apple", "banana", "cherry"]),
                json!({"condition": "contains", "value": "an"}),
            ))
            .await
            .unwrap();
        assert_eq!(out, NodeOutputs::single(json!(["banana"])));

        let out = Filter
            .compute(input(
                json!([{"email": "a@x.io"}, {"email": "nope"}]),
                json!({"field": "email", "condition": "matches", "value": "^[^@]+@"}),
            ))
            .await
            .unwrap();
        assert_eq!(out, NodeOutputs::single(json!([{"email": "a@x.io"}])));
    }

    #[tokio::test]
    async fn bad_config_is_rejected() {
        let err = Filter
            .compute(input(json!(1), json!({"condition": "sometimes", "value": 1})))
            .await
            .unwrap_err();
        assert!(matches!(err, ComputeError::InvalidConfig { .. }));

        let err = Filter
            .compute(input(json!(1), json!({"condition": "greater_than", "value": "many"})))
            .await
            .unwrap_err();
        assert!(matches!(err, ComputeError::InvalidConfig { ref key, .. } if key == "value"));

        let err = Filter
            .compute(input(json!("x"), json!({"condition": "matches", "value": "("})))
            .await
            .unwrap_err();
        assert!(matches!(err, ComputeError::InvalidConfig { .. }));
    }

    #[tokio::test]
    async fn missing_value_is_rejected() {
        let err = Filter
            .compute(input(json!(1), json!({"field": "x"})))
            .await
            .unwrap_err();
        assert!(matches!(err, ComputeError::InvalidConfig { .. }));
    }

    #[test]
    fn compile_binds_typed_operands() {
        let predicate = Predicate::compile(FilterCondition::GreaterThan, Value::from(json!("2.5"))).unwrap();
        assert!(matches!(predicate, Predicate::GreaterThan(t) if t == 2.5));
        assert!(predicate.test(&Value::from(json!(3)), ""));

        let err = Predicate::compile(FilterCondition::Matches, Value::from(json!(7))).unwrap_err();
        assert!(matches!(err, ComputeError::InvalidConfig { ref key, .. } if key == "value"));
    }
}
