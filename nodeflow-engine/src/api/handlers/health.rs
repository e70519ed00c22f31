//! Health and status endpoint handlers.

use crate::api::response;
use crate::api::state::AppState;
use bytes::Bytes;
use http_body_util::Full;
use hyper::Response;
use std::sync::Arc;

/// GET /health
///
/// Simple health check that returns 200 OK if the server is running.
pub async fn get_health(_state: Arc<AppState>) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "status": "healthy",
        "service": "nodeflow",
        "version": env!("CARGO_PKG_VERSION")
    });

    response::ok(&body)
}

/// GET /status
///
/// Uptime, registered computations and evaluation totals.
pub async fn get_status(state: Arc<AppState>) -> Response<Full<Bytes>> {
    let history_size = state.history.read().len();
    let config = state.engine.config();

    let body = serde_json::json!({
        "status": "running",
        "service": "nodeflow",
        "uptime_seconds": state.uptime_secs(),
        "node_types": state.engine.registry().len(),
        "engine": {
            "node_timeout_ms": config.node_timeout_ms,
            "max_concurrent_nodes": config.max_concurrent_nodes,
            "failure_mode": config.failure_mode
        },
        "evaluations": state.counters.to_json(),
        "history_size": history_size
    });

    response::ok(&body)
}
