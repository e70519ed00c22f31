//! Delay node (timed passthrough).

use nodeflow_core::prelude::*;
use std::result::Result;
use std::time::Duration;

/// Sleeps `config.ms` milliseconds, then passes its sole input through.
///
/// The sleep counts against the node's time budget, so a delay longer than
/// `timeout_ms` fails with a timeout.
///
/// # Example Configuration
/// ```yaml
/// nodes:
///   - id: pause
///     type: std::delay
///     config: { ms: 250 }
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct Delay;

impl Delay {
    fn duration(input: &ComputeInput) -> Result<Duration, ComputeError> {
        match input.config_value("ms") {
            None => Ok(Duration::ZERO),
            Some(ms) => ms
                .inner()
                .as_u64()
                .map(Duration::from_millis)
                .ok_or_else(|| {
                    ComputeError::invalid_config("ms", format!("expected a non-negative integer, got {ms}"))
                }),
        }
    }
}

impl Computation for Delay {
    fn info(&self) -> ComputationInfo {
        ComputationInfo::new("std", "delay")
            .with_description("Wait a fixed number of milliseconds, then pass the input through")
            .with_input("in", PortType::Any)
            .with_output("out", PortType::Any)
    }

    fn compute<'a>(&'a self, input: ComputeInput) -> ComputeFuture<'a> {
        Box::pin(async move {
            let delay = Self::duration(&input)?;
            let (_, value) = input.sole_input()?;

            tracing::debug!(node_id = %input.node_id, delay_ms = delay.as_millis() as u64, "Delaying");
            tokio::time::sleep(delay).await;

            Ok(NodeOutputs::single(value.clone()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::time::Instant;

    fn input(config: serde_json::Value) -> ComputeInput {
        let mut inputs = BTreeMap::new();
        inputs.insert("in".to_string(), Value::string("payload"));
        ComputeInput::new("delay", inputs).with_config(config)
    }

    #[tokio::test]
    async fn waits_then_passes_through() {
        let started = Instant::now();
        let out = Delay.compute(input(json!({"ms": 30}))).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(30));
        assert_eq!(out, NodeOutputs::single("payload"));
    }

    #[tokio::test]
    async fn missing_ms_means_no_wait() {
        let out = Delay.compute(input(json!({}))).await.unwrap();
        assert_eq!(out, NodeOutputs::single("payload"));
    }

    #[tokio::test]
    async fn negative_ms_is_rejected() {
        let err = Delay.compute(input(json!({"ms": -5}))).await.unwrap_err();
        assert!(matches!(err, ComputeError::InvalidConfig { ref key, .. } if key == "ms"));
    }

    #[test]
    fn duration_reads_ms() {
        assert_eq!(Delay::duration(&input(json!({"ms": 40}))).unwrap(), Duration::from_millis(40));
        assert_eq!(Delay::duration(&input(json!({}))).unwrap(), Duration::ZERO);
        assert!(Delay::duration(&input(json!({"ms": "soon"}))).is_err());
    }
}
