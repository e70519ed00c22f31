//! JSON response builders for the API.

use bytes::Bytes;
use http_body_util::Full;
use hyper::http::header::{self, HeaderValue};
use hyper::{Response, StatusCode};
use serde::Serialize;

const CSP_HEADER: &str = "default-src 'none'; frame-ancestors 'none';";

fn apply_security_headers(mut response: Response<Full<Bytes>>) -> Response<Full<Bytes>> {
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(CSP_HEADER),
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    response
}

/// Build a JSON response with status code.
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = serde_json::to_string(body).unwrap_or_else(|e| {
        serde_json::json!({
            "error": {
                "code": "E804",
                "message": format!("Serialization error: {}", e),
                "status": 500
            }
        })
        .to_string()
    });

    let response = Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(json)))
        .expect("response builder should not fail");
    apply_security_headers(response)
}

/// Build a 200 OK JSON response.
pub fn ok<T: Serialize>(body: &T) -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, body)
}

/// Build a 404 Not Found response.
pub fn not_found() -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "error": {
            "code": "E000",
            "message": "Not found",
            "status": 404
        }
    });
    json_response(StatusCode::NOT_FOUND, &body)
}

/// Build a 405 Method Not Allowed response.
pub fn method_not_allowed(allowed: &[&str]) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "error": {
            "code": "E000",
            "message": format!("Method not allowed. Allowed: {}", allowed.join(", ")),
            "status": 405
        }
    });

    let mut response = json_response(StatusCode::METHOD_NOT_ALLOWED, &body);
    if let Ok(value) = HeaderValue::from_str(&allowed.join(", ")) {
        response.headers_mut().insert(header::ALLOW, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_response() {
        let body = serde_json::json!({"status": "healthy"});
        let response = ok(&body);

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("Content-Type").unwrap(),
            "application/json"
        );
        assert!(response
            .headers()
            .contains_key(header::CONTENT_SECURITY_POLICY));
    }

    #[test]
    fn not_found_response() {
        assert_eq!(not_found().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn method_not_allowed_response() {
        let response = method_not_allowed(&["POST"]);
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get("Allow").unwrap(), "POST");
    }
}
