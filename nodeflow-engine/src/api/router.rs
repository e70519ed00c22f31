//! Request routing for the API.
//!
//! Routes requests to handlers based on method and path. Every path is
//! served both bare (`/run-flow`) and under the `/api/v1` prefix.

use super::handlers;
use super::response;
use super::state::AppState;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Body;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::error::Error as StdError;
use std::sync::Arc;

/// Route prefix accepted in front of every endpoint.
pub const API_PREFIX: &str = "/api/v1";

/// Route an incoming request to the appropriate handler.
///
/// Generic over the body so handlers can be driven without a socket.
pub async fn route<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let full_path = req.uri().path().to_string();
    let method = req.method().clone();

    tracing::debug!(method = %method, path = %full_path, "Routing request");

    let path = full_path.strip_prefix(API_PREFIX).unwrap_or(&full_path);
    let path = match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };

    let response = match (&method, path) {
        (&Method::GET, "/health") => handlers::health::get_health(state).await,
        (&Method::GET, "/status") => handlers::health::get_status(state).await,

        (&Method::GET, "/node-types") => handlers::nodes::list(state).await,

        (&Method::POST, "/run-flow") => handlers::flows::run_flow(req, state).await,
        (_, "/run-flow") => response::method_not_allowed(&["POST"]),

        (&Method::POST, "/validate") => handlers::flows::validate(req, state).await,
        (_, "/validate") => response::method_not_allowed(&["POST"]),

        (&Method::GET, "/evaluations") => handlers::evaluations::list(state).await,
        (&Method::GET, p) if p.starts_with("/evaluations/") => {
            let id = p.strip_prefix("/evaluations/").unwrap_or("");
            if id.is_empty() || id.contains('/') {
                response::not_found()
            } else {
                handlers::evaluations::get(state, id).await
            }
        }

        (_, "/health" | "/status" | "/node-types" | "/evaluations") => {
            response::method_not_allowed(&["GET"])
        }

        _ => response::not_found(),
    };

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ServerConfig;
    use crate::engine::{EngineConfig, EvaluationEngine};
    use hyper::StatusCode;
    use nodeflow_core::ComputationRegistry;

    fn state() -> Arc<AppState> {
        let engine = EvaluationEngine::new(Arc::new(ComputationRegistry::new()), EngineConfig::default());
        Arc::new(AppState::new(engine, ServerConfig::default()))
    }

    async fn status(method: Method, path: &str) -> Response<Full<Bytes>> {
        let req = Request::builder()
            .method(method)
            .uri(path)
            .body(Full::new(Bytes::new()))
            .unwrap();
        route(req, state()).await.unwrap()
    }

    #[tokio::test]
    async fn prefixed_and_trailing_slash_paths_match() {
        for path in ["/health", "/api/v1/health", "/api/v1/health/", "/health/"] {
            assert_eq!(status(Method::GET, path).await.status(), StatusCode::OK, "{path}");
        }
        assert_eq!(
            status(Method::GET, "/api/v1/node-types").await.status(),
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn wrong_method_lists_allowed() {
        let response = status(Method::GET, "/api/v1/run-flow").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()["allow"], "POST");

        let response = status(Method::DELETE, "/api/v1/evaluations").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()["allow"], "GET");
    }

    #[tokio::test]
    async fn unknown_paths_are_not_found() {
        for path in ["/api/v2/health", "/api/v1", "/evaluations/a/b", "/apiv1/health"] {
            let code = status(Method::GET, path).await.status();
            assert_eq!(code, StatusCode::NOT_FOUND, "{path}");
        }
    }
}
