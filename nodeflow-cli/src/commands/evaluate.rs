//! Evaluate command - run a workflow file to completion.

use super::{load_workflow, standard_engine};
use anyhow::Result;
use nodeflow_engine::engine::{EngineConfig, EvaluationResult, NodeState, SkipReason};
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Options for the evaluate command.
#[derive(Debug, Clone, Default)]
pub struct EvaluateOptions {
    /// Stop at the first node failure.
    pub strict: bool,
    /// Per-node time budget override.
    pub timeout_ms: Option<u64>,
    /// Concurrency limit override.
    pub max_concurrent: Option<usize>,
    /// Print the full result as JSON.
    pub json: bool,
}

impl EvaluateOptions {
    /// Engine configuration: environment first, then command line overrides.
    pub fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::from_env();
        if self.strict {
            config = config.strict();
        }
        if let Some(ms) = self.timeout_ms {
            config = config.with_node_timeout_ms(ms);
        }
        if let Some(n) = self.max_concurrent {
            config = config.with_max_concurrent_nodes(n);
        }
        config
    }
}

/// Load, build and evaluate a workflow file.
pub async fn evaluate_file(
    path: &Path,
    config: EngineConfig,
    cancel: CancellationToken,
) -> Result<EvaluationResult> {
    let workflow = load_workflow(path)?;
    let engine = standard_engine(config);
    let graph = engine.build(&workflow)?;
    Ok(engine.evaluate_with_cancel(&graph, cancel).await?)
}

/// Run the evaluate command. Fails unless the evaluation completed cleanly.
pub async fn run(file: &str, options: EvaluateOptions) -> Result<()> {
    let path = Path::new(file);
    tracing::info!(file = %file, strict = options.strict, "Evaluating workflow");

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    let signal = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling evaluation");
            on_interrupt.cancel();
        }
    });

    let outcome = evaluate_file(path, options.engine_config(), cancel).await;
    signal.abort();
    let result = outcome?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_summary(file, &result);
    }

    if !result.is_success() {
        anyhow::bail!("Evaluation finished with status '{}'", result.status);
    }
    Ok(())
}

fn print_summary(file: &str, result: &EvaluationResult) {
    println!("Evaluation of {file}: {}", result.status);
    println!();

    for id in &result.order {
        let Some(report) = result.nodes.get(id) else {
            continue;
        };
        let mark = match report.status {
            NodeState::Succeeded => "✓",
            NodeState::Failed => "✗",
            _ => "-",
        };
        print!("  {mark} {:<24} {}", id.as_str(), report.status);
        if let Some(error) = &report.error {
            print!("  {error}");
        }
        match &report.skip {
            Some(SkipReason::Upstream { root, .. }) => print!("  (upstream failure at '{root}')"),
            Some(SkipReason::Cancelled) => print!("  (cancelled)"),
            Some(SkipReason::Aborted) => print!("  (aborted)"),
            None => {}
        }
        println!();
    }

    if !result.terminal_outputs.is_empty() {
        println!();
        println!("Outputs:");
        for (port, value) in &result.terminal_outputs {
            println!("  {port} = {value}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodeflow_core::Value;
    use nodeflow_engine::engine::EvaluationStatus;
    use std::io::Write;

    const ADD_THEN_DOUBLE: &str = r#"
nodes:
  - id: add
    type: math::add
    inputs: { a: number, b: number }
    outputs: { sum: number }
    values: { a: 2, b: 3 }
  - id: double
    type: math::double
    inputs: { x: number }
    outputs: { doubled: number }
edges:
  - from: add.sum
    to: double.x
"#;

    fn write_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn evaluates_yaml_file() {
        let file = write_file(".yaml", ADD_THEN_DOUBLE);
        let result = evaluate_file(file.path(), EngineConfig::default(), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.status, EvaluationStatus::Completed);
        assert_eq!(result.output("double", "doubled"), Some(&Value::int(10)));
    }

    #[tokio::test]
    async fn evaluates_json_file() {
        let json = r#"{"nodes":[{"id":"c","type":"math::constant","config":{"value":4}},
                      {"id":"d","type":"math::double"}],
                      "edges":[{"from":"c","to":"d"}]}"#;
        let file = write_file(".json", json);
        let result = evaluate_file(file.path(), EngineConfig::default(), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.output("d", "out"), Some(&Value::int(8)));
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let err = evaluate_file(
            Path::new("/definitely/not/here.yaml"),
            EngineConfig::default(),
            CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn cycle_is_an_error() {
        let yaml = r#"
nodes:
  - { id: a, type: math::double }
  - { id: b, type: math::double }
edges:
  - { from: a, to: b }
  - { from: b, to: a }
"#;
        let file = write_file(".yml", yaml);
        let err = evaluate_file(file.path(), EngineConfig::default(), CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("E102"));
    }

    #[test]
    fn options_override_engine_config() {
        let options = EvaluateOptions {
            strict: true,
            timeout_ms: Some(250),
            max_concurrent: Some(3),
            json: false,
        };
        let config = options.engine_config();
        assert!(config.is_strict());
        assert_eq!(config.node_timeout_ms, 250);
        assert_eq!(config.max_concurrent_nodes, 3);
    }
}
