// src/logging_middleware.rs
//! Middleware for logging request and response bodies in debug mode

use axum::body::to_bytes;
use axum::{
    body::Body,
    extract::Request,
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::{debug, enabled, Level};

/// Bodies longer than this are cut before logging
const MAX_LOGGED_BODY: usize = 2048;

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false)
}

pub fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_LOGGED_BODY {
        return body.to_string();
    }
    let mut end = MAX_LOGGED_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}… ({} bytes total)", &body[..end], body.len())
}

/// Middleware to log JSON request and response bodies in debug mode.
/// Multipart uploads and file downloads pass through untouched.
pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    if !enabled!(Level::DEBUG) {
        return Ok(next.run(request).await);
    }

    let request = if is_json(request.headers()) {
        let (parts, body) = request.into_parts();
        let bytes = to_bytes(body, usize::MAX)
            .await
            .map_err(|_| StatusCode::BAD_REQUEST)?;

        if !bytes.is_empty() {
            debug!(
                method = %parts.method,
                uri = %parts.uri,
                request_body = %truncate_body(&String::from_utf8_lossy(&bytes)),
                "📥 Request"
            );
        }

        Request::from_parts(parts, Body::from(bytes))
    } else {
        request
    };

    let response = next.run(request).await;

    if !is_json(response.headers()) {
        return Ok(response);
    }

    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if !bytes.is_empty() {
        debug!(
            status = %parts.status,
            response_body = %truncate_body(&String::from_utf8_lossy(&bytes)),
            "📤 Response"
        );
    }

    Ok(Response::from_parts(parts, Body::from(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_bodies_are_kept() {
        assert_eq!(truncate_body("{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn test_long_bodies_are_truncated_on_char_boundary() {
        let body = "é".repeat(MAX_LOGGED_BODY);
        let logged = truncate_body(&body);
        assert!(logged.ends_with(&format!("({} bytes total)", body.len())));
        assert!(logged.len() < body.len());
    }

    #[test]
    fn test_json_detection() {
        let mut headers = HeaderMap::new();
        assert!(!is_json(&headers));
        headers.insert(CONTENT_TYPE, "application/json; charset=utf-8".parse().unwrap());
        assert!(is_json(&headers));
        headers.insert(CONTENT_TYPE, "multipart/form-data; boundary=x".parse().unwrap());
        assert!(!is_json(&headers));
    }
}
