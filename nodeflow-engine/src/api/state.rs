//! Shared application state for API handlers.

use super::server::ServerConfig;
use crate::engine::{EvaluationEngine, EvaluationResult, EvaluationStatus};
use nodeflow_core::EvaluationId;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Maximum number of evaluations to keep in history.
const MAX_EVALUATION_HISTORY: usize = 256;

/// Shared application state passed to all handlers.
pub struct AppState {
    /// The engine evaluating submitted workflows.
    pub engine: EvaluationEngine,
    /// Server configuration (body limit, default deadline).
    pub config: ServerConfig,
    /// Server start time.
    pub start_time: Instant,
    /// Recent evaluations.
    pub history: RwLock<EvaluationHistory>,
    /// Totals since start.
    pub counters: EvaluationCounters,
}

impl AppState {
    /// Create new application state.
    pub fn new(engine: EvaluationEngine, config: ServerConfig) -> Self {
        Self::with_history_capacity(engine, config, MAX_EVALUATION_HISTORY)
    }

    /// Create application state with a custom history size.
    pub fn with_history_capacity(
        engine: EvaluationEngine,
        config: ServerConfig,
        capacity: usize,
    ) -> Self {
        Self {
            engine,
            config,
            start_time: Instant::now(),
            history: RwLock::new(EvaluationHistory::new(capacity)),
            counters: EvaluationCounters::default(),
        }
    }

    /// Get server uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Count and remember a finished or rejected evaluation.
    pub fn record(&self, record: EvaluationRecord) {
        self.counters.count(record.status);
        self.history.write().push(record);
    }
}

/// Evaluation totals by status.
#[derive(Debug, Default)]
pub struct EvaluationCounters {
    completed: AtomicU64,
    completed_with_failures: AtomicU64,
    cancelled: AtomicU64,
    aborted: AtomicU64,
    rejected: AtomicU64,
    failed: AtomicU64,
}

impl EvaluationCounters {
    fn slot(&self, status: EvaluationStatus) -> &AtomicU64 {
        match status {
            EvaluationStatus::Completed => &self.completed,
            EvaluationStatus::CompletedWithFailures => &self.completed_with_failures,
            EvaluationStatus::Cancelled => &self.cancelled,
            EvaluationStatus::Aborted => &self.aborted,
            EvaluationStatus::Rejected => &self.rejected,
            EvaluationStatus::Failed => &self.failed,
        }
    }

    /// Increment the counter for a status.
    pub fn count(&self, status: EvaluationStatus) {
        self.slot(status).fetch_add(1, Ordering::Relaxed);
    }

    /// Current value for a status.
    pub fn get(&self, status: EvaluationStatus) -> u64 {
        self.slot(status).load(Ordering::Relaxed)
    }

    /// Sum over all statuses.
    pub fn total(&self) -> u64 {
        [
            EvaluationStatus::Completed,
            EvaluationStatus::CompletedWithFailures,
            EvaluationStatus::Cancelled,
            EvaluationStatus::Aborted,
            EvaluationStatus::Rejected,
            EvaluationStatus::Failed,
        ]
        .into_iter()
        .map(|s| self.get(s))
        .sum()
    }

    /// Snapshot as JSON.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "total": self.total(),
            "completed": self.get(EvaluationStatus::Completed),
            "completed_with_failures": self.get(EvaluationStatus::CompletedWithFailures),
            "cancelled": self.get(EvaluationStatus::Cancelled),
            "aborted": self.get(EvaluationStatus::Aborted),
            "rejected": self.get(EvaluationStatus::Rejected),
            "failed": self.get(EvaluationStatus::Failed),
        })
    }
}

/// One evaluation request as seen by the server.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationRecord {
    /// Evaluation ID.
    pub evaluation_id: EvaluationId,
    /// Workflow name, if the document had one.
    pub name: Option<String>,
    /// Outcome.
    pub status: EvaluationStatus,
    /// Number of nodes submitted.
    pub node_count: usize,
    /// Submission time as Unix milliseconds.
    pub submitted_at_ms: u64,
    /// Wall time spent building and evaluating.
    pub elapsed_ms: u64,
    /// Rejection message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Full result. Absent for rejected submissions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<EvaluationResult>,
}

impl EvaluationRecord {
    /// Record for an evaluation that ran.
    pub fn evaluated(
        evaluation_id: EvaluationId,
        name: Option<String>,
        node_count: usize,
        started: Instant,
        result: EvaluationResult,
    ) -> Self {
        Self {
            evaluation_id,
            name,
            status: result.status,
            node_count,
            submitted_at_ms: unix_ms(),
            elapsed_ms: started.elapsed().as_millis() as u64,
            error: None,
            result: Some(result),
        }
    }

    /// Record for a refused submission.
    pub fn rejected(
        evaluation_id: EvaluationId,
        name: Option<String>,
        node_count: usize,
        started: Instant,
        error: impl Into<String>,
    ) -> Self {
        Self::errored(EvaluationStatus::Rejected, evaluation_id, name, node_count, started, error.into())
    }

    /// Record for an evaluation the engine could not finish.
    pub fn failed(
        evaluation_id: EvaluationId,
        name: Option<String>,
        node_count: usize,
        started: Instant,
        error: impl Into<String>,
    ) -> Self {
        Self::errored(EvaluationStatus::Failed, evaluation_id, name, node_count, started, error.into())
    }

    fn errored(
        status: EvaluationStatus,
        evaluation_id: EvaluationId,
        name: Option<String>,
        node_count: usize,
        started: Instant,
        error: String,
    ) -> Self {
        Self {
            evaluation_id,
            name,
            status,
            node_count,
            submitted_at_ms: unix_ms(),
            elapsed_ms: started.elapsed().as_millis() as u64,
            error: Some(error),
            result: None,
        }
    }

    /// Summary without the full result.
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "evaluation_id": self.evaluation_id.to_string(),
            "name": self.name,
            "status": self.status,
            "node_count": self.node_count,
            "submitted_at_ms": self.submitted_at_ms,
            "elapsed_ms": self.elapsed_ms,
            "error": self.error,
        })
    }
}

fn unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Ring buffer of recent evaluation records.
pub struct EvaluationHistory {
    records: VecDeque<EvaluationRecord>,
    capacity: usize,
}

impl EvaluationHistory {
    /// Create a new history with given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Add a record, evicting the oldest when full.
    pub fn push(&mut self, record: EvaluationRecord) {
        if self.capacity == 0 {
            return;
        }
        if self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Get a record by ID.
    pub fn get(&self, evaluation_id: EvaluationId) -> Option<&EvaluationRecord> {
        self.records
            .iter()
            .find(|r| r.evaluation_id == evaluation_id)
    }

    /// All records, most recent first.
    pub fn all(&self) -> impl Iterator<Item = &EvaluationRecord> {
        self.records.iter().rev()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(name: &str) -> EvaluationRecord {
        EvaluationRecord::rejected(
            EvaluationId::new(),
            Some(name.to_string()),
            0,
            Instant::now(),
            "bad",
        )
    }

    #[test]
    fn history_capacity() {
        let mut history = EvaluationHistory::new(3);
        for i in 0..5 {
            history.push(rejected(&format!("flow_{i}")));
        }

        assert_eq!(history.len(), 3);
        assert_eq!(
            history.all().next().and_then(|r| r.name.as_deref()),
            Some("flow_4")
        );
    }

    #[test]
    fn history_lookup() {
        let mut history = EvaluationHistory::new(10);
        let record = rejected("a");
        let id = record.evaluation_id;
        history.push(record);

        assert!(history.get(id).is_some());
        assert!(history.get(EvaluationId::new()).is_none());
    }

    #[test]
    fn counters() {
        let counters = EvaluationCounters::default();
        counters.count(EvaluationStatus::Completed);
        counters.count(EvaluationStatus::Completed);
        counters.count(EvaluationStatus::Rejected);

        assert_eq!(counters.get(EvaluationStatus::Completed), 2);
        assert_eq!(counters.total(), 3);
        assert_eq!(counters.to_json()["rejected"], 1);
    }

    #[test]
    fn summary_omits_result() {
        let summary = rejected("x").summary();
        assert_eq!(summary["status"], "rejected");
        assert_eq!(summary["error"], "bad");
        assert!(summary.get("result").is_none());
    }

    #[test]
    fn failed_records_count_separately() {
        let counters = EvaluationCounters::default();
        let record = EvaluationRecord::failed(EvaluationId::new(), None, 2, Instant::now(), "E302");
        assert_eq!(record.status, EvaluationStatus::Failed);
        counters.count(record.status);

        assert_eq!(counters.get(EvaluationStatus::Rejected), 0);
        assert_eq!(counters.to_json()["failed"], 1);
        assert_eq!(record.summary()["status"], "failed");
    }
}
