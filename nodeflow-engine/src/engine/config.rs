//! Engine configuration.

use nodeflow_core::flow::GraphLimits;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the engine reacts to a node failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    /// Keep evaluating every node whose dependencies succeeded.
    #[default]
    BestEffort,
    /// Stop scheduling at the first failure. Nodes already running finish.
    Strict,
}

/// Configuration for the evaluation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Default time budget per node in milliseconds.
    pub node_timeout_ms: u64,
    /// Maximum nodes of one wave executing at the same time.
    ///
    /// Set to 1 for sequential execution (debugging).
    pub max_concurrent_nodes: usize,
    /// Failure policy.
    pub failure_mode: FailureMode,
    /// Size bounds applied when building graphs.
    pub limits: GraphLimits,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            node_timeout_ms: 30_000,
            max_concurrent_nodes: 16,
            failure_mode: FailureMode::BestEffort,
            limits: GraphLimits::default(),
        }
    }
}

impl EngineConfig {
    /// Create configuration from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `NODEFLOW_NODE_TIMEOUT_MS`: Default per-node time budget
    /// - `NODEFLOW_MAX_CONCURRENT_NODES`: Concurrency bound within a wave
    /// - `NODEFLOW_STRICT`: `true`/`1` selects strict failure mode
    ///
    /// Unset or unparseable variables fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let node_timeout_ms = std::env::var("NODEFLOW_NODE_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(defaults.node_timeout_ms);

        let max_concurrent_nodes = std::env::var("NODEFLOW_MAX_CONCURRENT_NODES")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.max_concurrent_nodes);

        let failure_mode = match std::env::var("NODEFLOW_STRICT").ok().as_deref() {
            Some("1" | "true" | "TRUE" | "yes") => FailureMode::Strict,
            _ => FailureMode::BestEffort,
        };

        Self {
            node_timeout_ms,
            max_concurrent_nodes,
            failure_mode,
            limits: defaults.limits,
        }
    }

    /// Set the default node timeout.
    pub fn with_node_timeout_ms(mut self, ms: u64) -> Self {
        self.node_timeout_ms = ms;
        self
    }

    /// Set the concurrency bound. Zero is treated as one.
    pub fn with_max_concurrent_nodes(mut self, n: usize) -> Self {
        self.max_concurrent_nodes = n.max(1);
        self
    }

    /// Set the failure mode.
    pub fn with_failure_mode(mut self, mode: FailureMode) -> Self {
        self.failure_mode = mode;
        self
    }

    /// Shorthand for strict failure mode.
    pub fn strict(self) -> Self {
        self.with_failure_mode(FailureMode::Strict)
    }

    /// Set graph size limits.
    pub fn with_limits(mut self, limits: GraphLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Default node timeout as a `Duration`.
    pub fn node_timeout(&self) -> Duration {
        Duration::from_millis(self.node_timeout_ms)
    }

    /// Whether strict failure mode is active.
    pub fn is_strict(&self) -> bool {
        self.failure_mode == FailureMode::Strict
    }
}
