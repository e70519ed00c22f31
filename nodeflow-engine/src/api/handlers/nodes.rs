//! Node type catalogue handler.

use crate::api::response;
use crate::api::state::AppState;
use bytes::Bytes;
use http_body_util::Full;
use hyper::Response;
use std::sync::Arc;

/// GET /node-types
///
/// Registered computations with their default port declarations.
pub async fn list(state: Arc<AppState>) -> Response<Full<Bytes>> {
    let node_types = state.engine.registry().list();
    let body = serde_json::json!({
        "count": node_types.len(),
        "node_types": node_types
    });

    response::ok(&body)
}
