//! Request body helpers.

use super::error::ApiError;
use bytes::Bytes;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::header::{self, HeaderMap};
use hyper::Request;
use nodeflow_core::flow::{GraphLimits, WorkflowDefinition};
use std::error::Error as StdError;
use std::time::Duration;

/// Header carrying a per-request evaluation deadline in milliseconds.
pub const DEADLINE_HEADER: &str = "x-evaluation-timeout-ms";

/// Encoding of a submitted workflow document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// `application/json` or no content type.
    Json,
    /// Any content type mentioning `yaml`.
    Yaml,
}

impl DocumentFormat {
    /// Pick the format from the `Content-Type` header.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let is_yaml = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("yaml"));
        if is_yaml {
            Self::Yaml
        } else {
            Self::Json
        }
    }
}

/// Read the whole body, refusing anything larger than `limit` bytes.
pub async fn read_body<B>(body: B, limit: usize) -> Result<Bytes, ApiError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            Err(ApiError::payload_too_large(limit))
        }
        Err(e) => Err(ApiError::bad_request(
            "E902",
            format!("Failed to read request body: {e}"),
        )),
    }
}

/// A parsed workflow submission.
#[derive(Debug)]
pub struct Submission {
    /// The workflow definition.
    pub workflow: WorkflowDefinition,
    /// Deadline requested through [`DEADLINE_HEADER`], if any.
    pub deadline: Option<Duration>,
}

/// Read and parse a workflow submission.
///
/// An oversized body is a 413; an unreadable or unparseable document is a
/// 400 with code E801.
pub async fn read_workflow<B>(
    req: Request<B>,
    max_body_bytes: usize,
    limits: &GraphLimits,
) -> Result<Submission, ApiError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let (parts, body) = req.into_parts();

    let declared_len = parts
        .headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared_len.is_some_and(|len| len > max_body_bytes) {
        return Err(ApiError::payload_too_large(max_body_bytes));
    }

    let deadline = match parts.headers.get(DEADLINE_HEADER) {
        None => None,
        Some(value) => {
            let ms = value
                .to_str()
                .ok()
                .and_then(|v| v.trim().parse::<u64>().ok())
                .ok_or_else(|| {
                    ApiError::bad_request(
                        "E802",
                        format!("Header '{DEADLINE_HEADER}' must be a number of milliseconds"),
                    )
                })?;
            Some(Duration::from_millis(ms))
        }
    };

    let format = DocumentFormat::from_headers(&parts.headers);
    let bytes = read_body(body, max_body_bytes).await?;
    let text = std::str::from_utf8(&bytes)
        .map_err(|_| ApiError::bad_request("E801", "Request body is not valid UTF-8"))?;

    let workflow = match format {
        DocumentFormat::Json => WorkflowDefinition::from_json_with_limits(text, limits),
        DocumentFormat::Yaml => WorkflowDefinition::from_yaml_with_limits(text, limits),
    }
    .map_err(ApiError::from)?;

    Ok(Submission { workflow, deadline })
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;
    use hyper::StatusCode;

    fn request(content_type: &str, body: &str) -> Request<Full<Bytes>> {
        Request::builder()
            .method("POST")
            .uri("/run-flow")
            .header("Content-Type", content_type)
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap()
    }

    #[tokio::test]
    async fn reads_json_and_yaml() {
        let limits = GraphLimits::default();
        let json = r#"{"nodes":[{"id":"a","type":"math::constant"}],"edges":[]}"#;
        let sub = read_workflow(request("application/json", json), 1024, &limits)
            .await
            .unwrap();
        assert_eq!(sub.workflow.nodes.len(), 1);
        assert!(sub.deadline.is_none());

        let yaml = "nodes:\n  - id: a\n    type: math::constant\nedges: []\n";
        let sub = read_workflow(request("application/x-yaml", yaml), 1024, &limits)
            .await
            .unwrap();
        assert_eq!(sub.workflow.nodes[0].id.as_str(), "a");
    }

    #[tokio::test]
    async fn oversized_body_is_413() {
        let err = read_body(Full::new(Bytes::from(vec![b'x'; 64])), 16)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn malformed_document_is_400() {
        let err = read_workflow(request("application/json", "{nodes"), 1024, &GraphLimits::default())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, "E801");
    }

    #[tokio::test]
    async fn deadline_header() {
        let mut req = request("application/json", r#"{"nodes":[],"edges":[]}"#);
        req.headers_mut()
            .insert(DEADLINE_HEADER, "250".parse().unwrap());
        let sub = read_workflow(req, 1024, &GraphLimits::default())
            .await
            .unwrap();
        assert_eq!(sub.deadline, Some(Duration::from_millis(250)));
    }

    #[test]
    fn content_type_selects_format() {
        let mut headers = HeaderMap::new();
        assert_eq!(DocumentFormat::from_headers(&headers), DocumentFormat::Json);
        headers.insert(header::CONTENT_TYPE, "text/yaml".parse().unwrap());
        assert_eq!(DocumentFormat::from_headers(&headers), DocumentFormat::Yaml);
    }
}
