//! Workflow submission handlers.

use crate::api::error::ApiError;
use crate::api::request::{self, Submission};
use crate::api::response;
use crate::api::state::{AppState, EvaluationRecord};
use crate::scheduler;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Body;
use hyper::{Request, Response};
use nodeflow_core::{EvaluationId, NodeflowError};
use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// POST /run-flow
///
/// Build and evaluate a submitted workflow. Refused submissions answer
/// with `{"status": "rejected", "error": ...}`; evaluations that ran answer
/// 200 whatever their status.
pub async fn run_flow<B>(req: Request<B>, state: Arc<AppState>) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let evaluation_id = EvaluationId::new();
    let started = Instant::now();

    let limits = &state.engine.config().limits;
    let Submission { workflow, deadline } =
        match request::read_workflow(req, state.config.max_body_bytes, limits).await {
            Ok(submission) => submission,
            Err(e) => return reject(&state, evaluation_id, None, 0, started, e),
        };

    let name = workflow.name.clone();
    let node_count = workflow.nodes.len();

    let graph = match state.engine.build(&workflow) {
        Ok(graph) => graph,
        Err(e) => {
            return reject(&state, evaluation_id, name, node_count, started, ApiError::from(e))
        }
    };

    let cancel = CancellationToken::new();
    let timer = deadline
        .or_else(|| state.config.evaluation_timeout())
        .map(|deadline| {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(deadline).await;
                tracing::info!(
                    deadline_ms = deadline.as_millis() as u64,
                    "Evaluation deadline reached"
                );
                cancel.cancel();
            })
        });

    let outcome = state
        .engine
        .evaluate_as(evaluation_id, &graph, cancel)
        .await;
    if let Some(timer) = timer {
        timer.abort();
    }

    match outcome {
        Ok(result) => {
            let elapsed_ms = started.elapsed().as_millis() as u64;
            tracing::info!(
                evaluation_id = %evaluation_id,
                status = %result.status,
                elapsed_ms,
                "Evaluation request finished"
            );
            let body = serde_json::json!({
                "evaluation_id": evaluation_id.to_string(),
                "status": result.status,
                "elapsed_ms": elapsed_ms,
                "result": result
            });
            state.record(EvaluationRecord::evaluated(
                evaluation_id,
                name,
                node_count,
                started,
                result,
            ));
            response::ok(&body)
        }
        Err(e) => fail(&state, evaluation_id, name, node_count, started, e),
    }
}

/// POST /validate
///
/// Build a submitted workflow without evaluating it.
pub async fn validate<B>(req: Request<B>, state: Arc<AppState>) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let limits = &state.engine.config().limits;
    let workflow = match request::read_workflow(req, state.config.max_body_bytes, limits).await {
        Ok(submission) => submission.workflow,
        Err(e) => return e.into_rejection(),
    };

    let graph = match state.engine.build(&workflow) {
        Ok(graph) => graph,
        Err(e) => return ApiError::from(e).into_rejection(),
    };

    let plan = scheduler::order(&graph).and_then(|order| Ok((order, scheduler::waves(&graph)?)));
    match plan {
        Ok((order, waves)) => response::ok(&serde_json::json!({
            "status": "valid",
            "nodes": graph.len(),
            "edges": graph.edge_count(),
            "order": order,
            "waves": waves
        })),
        Err(e) => ApiError::from(NodeflowError::from(e)).into_rejection(),
    }
}

fn reject(
    state: &AppState,
    evaluation_id: EvaluationId,
    name: Option<String>,
    node_count: usize,
    started: Instant,
    error: ApiError,
) -> Response<Full<Bytes>> {
    tracing::info!(
        evaluation_id = %evaluation_id,
        code = error.code,
        error = %error.message,
        "Workflow rejected"
    );
    state.record(EvaluationRecord::rejected(
        evaluation_id,
        name,
        node_count,
        started,
        error.message.clone(),
    ));
    error.into_rejection()
}

fn fail(
    state: &AppState,
    evaluation_id: EvaluationId,
    name: Option<String>,
    node_count: usize,
    started: Instant,
    error: NodeflowError,
) -> Response<Full<Bytes>> {
    tracing::error!(evaluation_id = %evaluation_id, error = %error, "Evaluation failed");
    state.record(EvaluationRecord::failed(
        evaluation_id,
        name,
        node_count,
        started,
        error.to_string(),
    ));
    ApiError::from(error).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ServerConfig;
    use crate::engine::{EngineConfig, EvaluationEngine, EvaluationStatus};
    use hyper::StatusCode;
    use nodeflow_core::ComputationRegistry;

    #[test]
    fn engine_fault_is_recorded_as_failed() {
        let engine = EvaluationEngine::new(Arc::new(ComputationRegistry::new()), EngineConfig::default());
        let state = AppState::new(engine, ServerConfig::default());
        let id = EvaluationId::new();

        let response = fail(
            &state,
            id,
            Some("broken".to_string()),
            3,
            Instant::now(),
            NodeflowError::TaskFailed("join error".to_string()),
        );

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(state.counters.get(EvaluationStatus::Failed), 1);
        assert_eq!(state.counters.total(), 1);

        let history = state.history.read();
        let record = history.get(id).unwrap();
        assert_eq!(record.status, EvaluationStatus::Failed);
        assert_eq!(record.node_count, 3);
        assert!(record.error.as_deref().unwrap().contains("join error"));
        assert!(record.result.is_none());
    }
}
