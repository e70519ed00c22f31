//! Data sink (rendering and optional file output).

use nodeflow_core::prelude::*;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::result::Result;

/// Rendering format for [`DataSink`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkFormat {
    /// Pretty-printed JSON.
    #[default]
    Json,
    /// Comma separated values with a header row.
    Csv,
}

impl SinkFormat {
    /// Render a value in this format.
    pub fn render(self, value: &Value) -> Result<String, ComputeError> {
        match self {
            Self::Json => serde_json::to_string_pretty(value.inner())
                .map_err(|e| ComputeError::failed(format!("failed to render JSON: {e}"))),
            Self::Csv => Ok(render_csv(value.inner())),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SinkConfig {
    #[serde(default)]
    format: SinkFormat,
    #[serde(default)]
    path: Option<PathBuf>,
}

/// Renders its input in `config.format` (`json` or `csv`).
///
/// The text is written to `config.path` when set, and emitted when the node
/// declares an output port. A sink without outputs only logs what it
/// received.
///
/// # Example Configuration
/// ```yaml
/// nodes:
///   - id: report
///     type: std::data_sink
///     config: { format: csv, path: /tmp/report.csv }
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct DataSink;

impl DataSink {
    fn config(input: &ComputeInput) -> Result<SinkConfig, ComputeError> {
        if input.config.is_null() {
            return Ok(SinkConfig::default());
        }
        serde_json::from_value(input.config.inner().clone())
            .map_err(|e| ComputeError::invalid_config("format", e.to_string()))
    }
}

impl Computation for DataSink {
    fn info(&self) -> ComputationInfo {
        ComputationInfo::new("std", "data_sink")
            .with_description("Render the input as JSON or CSV, optionally to a file")
            .with_input("in", PortType::Any)
    }

    fn compute<'a>(&'a self, input: ComputeInput) -> ComputeFuture<'a> {
        Box::pin(async move {
            let config = Self::config(&input)?;
            let (_, value) = input.sole_input()?;
            let text = config.format.render(value)?;

            if let Some(path) = &config.path {
                tokio::fs::write(path, text.as_bytes()).await.map_err(|e| {
                    ComputeError::failed(format!("failed to write {}: {e}", path.display()))
                })?;
            }

            tracing::info!(
                node_id = %input.node_id,
                format = config.format.as_str(),
                bytes = text.len(),
                path = ?config.path,
                "Data sink received payload"
            );

            Ok(match input.output_ports.as_slice() {
                [] => NodeOutputs::none(),
                [_] => NodeOutputs::single(text),
                _ => NodeOutputs::none().with("out", text),
            })
        })
    }
}

/// Object rows get one column per key, sorted; scalar rows share a
/// trailing `value` column.
fn render_csv(value: &JsonValue) -> String {
    let rows: Vec<&JsonValue> = match value {
        JsonValue::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    let keys: BTreeSet<&str> = rows
        .iter()
        .filter_map(|row| row.as_object())
        .flat_map(|map| map.keys().map(String::as_str))
        .collect();
    let has_scalars = rows.iter().any(|row| !row.is_object());

    let mut out = String::new();
    let header = keys
        .iter()
        .map(|k| k.to_string())
        .chain(has_scalars.then(|| "value".to_string()));
    push_record(&mut out, header);

    for row in rows {
        let object = row.as_object();
        let fields = keys
            .iter()
            .map(|key| {
                object
                    .and_then(|map| map.get(*key))
                    .map(cell)
                    .unwrap_or_default()
            })
            .chain(has_scalars.then(|| match object {
                Some(_) => String::new(),
                None => cell(row),
            }));
        push_record(&mut out, fields);
    }
    out
}

fn cell(value: &JsonValue) -> String {
    Value(value.clone()).to_text()
}

fn push_record(out: &mut String, fields: impl Iterator<Item = String>) {
    let line: Vec<String> = fields.map(|f| escape(&f)).collect();
    out.push_str(&line.join(","));
    out.push('\n');
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
