//! Case transforms.

use nodeflow_core::prelude::*;
use std::result::Result;

fn transform(input: &ComputeInput, f: fn(&str) -> String) -> Result<NodeOutputs, ComputeError> {
    let (_, value) = input.sole_input()?;
    Ok(NodeOutputs::single(f(&value.to_text())))
}

/// Upper-cases the text form of the sole input.
#[derive(Debug, Default, Clone, Copy)]
pub struct Upper;

impl Computation for Upper {
    fn info(&self) -> ComputationInfo {
        ComputationInfo::new("text", "upper")
            .with_description("Upper-case the sole input")
            .with_input("in", PortType::Any)
            .with_output("out", PortType::String)
    }

    fn compute<'a>(&'a self, input: ComputeInput) -> ComputeFuture<'a> {
        Box::pin(async move { transform(&input, str::to_uppercase) })
    }
}

/// Lower-cases the text form of the sole input.
#[derive(Debug, Default, Clone, Copy)]
pub struct Lower;

impl Computation for Lower {
    fn info(&self) -> ComputationInfo {
        ComputationInfo::new("text", "lower")
            .with_description("Lower-case the sole input")
            .with_input("in", PortType::Any)
            .with_output("out", PortType::String)
    }

    fn compute<'a>(&'a self, input: ComputeInput) -> ComputeFuture<'a> {
        Box::pin(async move { transform(&input, str::to_lowercase) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn one(value: Value) -> ComputeInput {
        let mut inputs = BTreeMap::new();
        inputs.insert("in".to_string(), value);
        ComputeInput::new("case", inputs)
    }

    #[tokio::test]
    async fn upper_and_lower() {
        let out = Upper.compute(one(Value::string("MiXed"))).await.unwrap();
        assert_eq!(out, NodeOutputs::single("MIXED"));

        let out = Lower.compute(one(Value::string("MiXed"))).await.unwrap();
        assert_eq!(out, NodeOutputs::single("mixed"));
    }

    #[tokio::test]
    async fn non_strings_use_text_form() {
        let out = Upper.compute(one(Value::bool(true))).await.unwrap();
        assert_eq!(out, NodeOutputs::single("TRUE"));
    }

    #[tokio::test]
    async fn no_input_fails() {
        let err = Lower
            .compute(ComputeInput::new("case", BTreeMap::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, ComputeError::Failed(_)));
    }

    #[test]
    fn transform_applies_function_to_sole_input() {
        let out = transform(&one(Value::string("abc")), |s| s.repeat(2)).unwrap();
        assert_eq!(out, NodeOutputs::single("abcabc"));
    }
}
