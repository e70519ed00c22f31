//! Structured logging setup.
//!
//! The engine logs through `tracing`: an `evaluation` span per call carrying
//! the evaluation ID, and a `node_execution` span per node carrying
//! `node_id`, `node_type` and `timeout_ms`. This module installs the
//! subscriber that renders them.
//!
//! The format is selected by `NODEFLOW_LOG_FORMAT`:
//! - `json` - one JSON object per event (log shippers)
//! - `pretty` - multi-line, for terminals
//! - `compact` - single line

mod config;
mod tracing_setup;

pub use config::{LogFormat, TracingConfig};
pub use tracing_setup::init_tracing;
