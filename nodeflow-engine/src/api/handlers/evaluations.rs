//! Evaluation history handlers.

use crate::api::error::ApiError;
use crate::api::response;
use crate::api::state::AppState;
use bytes::Bytes;
use http_body_util::Full;
use hyper::Response;
use nodeflow_core::EvaluationId;
use std::sync::Arc;

/// GET /evaluations
///
/// Summaries of recent evaluations, most recent first.
pub async fn list(state: Arc<AppState>) -> Response<Full<Bytes>> {
    let history = state.history.read();
    let evaluations: Vec<_> = history.all().map(|r| r.summary()).collect();

    let body = serde_json::json!({
        "count": evaluations.len(),
        "evaluations": evaluations
    });

    response::ok(&body)
}

/// GET /evaluations/{id}
///
/// One evaluation record including its full result.
pub async fn get(state: Arc<AppState>, id: &str) -> Response<Full<Bytes>> {
    let Some(evaluation_id) = EvaluationId::parse(id) else {
        return ApiError::bad_request("E000", format!("Invalid evaluation ID: {id}"))
            .into_response();
    };

    let history = state.history.read();
    match history.get(evaluation_id) {
        Some(record) => response::ok(record),
        None => ApiError::not_found("E000", format!("Evaluation '{id}' not found")).into_response(),
    }
}
