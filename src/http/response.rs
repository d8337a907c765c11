//! Conversion of a finished context into an HTTP response.
//!
//! # Rules
//! - No status and no body: `404 Not Found`
//! - Body without status: `200 OK`
//! - Status without body: the status' reason phrase as body (none for 204/304)
//! - Missing content type: `text/html` for bodies starting with `<`,
//!   `text/plain` for other text, `application/octet-stream` otherwise

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;

use crate::http::Context;

pub fn into_response(ctx: Context) -> Response {
    let (status, headers, body) = ctx.into_response_parts();

    let (status, body) = match (status, body) {
        (None, None) => (StatusCode::NOT_FOUND, Some(reason_body(StatusCode::NOT_FOUND))),
        (None, Some(body)) => (StatusCode::OK, Some(body)),
        (Some(status), None) if is_bodiless(status) => (status, None),
        (Some(status), None) => (status, Some(reason_body(status))),
        (Some(status), Some(body)) if is_bodiless(status) => {
            tracing::debug!(status = status.as_u16(), len = body.len(), "dropping body");
            (status, None)
        }
        (Some(status), Some(body)) => (status, Some(body)),
    };

    build(status, headers, body)
}

fn build(status: StatusCode, mut headers: HeaderMap, body: Option<Bytes>) -> Response {
    let body = match body {
        Some(body) => {
            if !headers.contains_key(header::CONTENT_TYPE) {
                headers.insert(header::CONTENT_TYPE, sniff_content_type(&body));
            }
            Body::from(body)
        }
        None => {
            headers.remove(header::CONTENT_TYPE);
            Body::empty()
        }
    };

    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

fn is_bodiless(status: StatusCode) -> bool {
    matches!(status, StatusCode::NO_CONTENT | StatusCode::NOT_MODIFIED)
}

fn reason_body(status: StatusCode) -> Bytes {
    Bytes::from_static(status.canonical_reason().unwrap_or("").as_bytes())
}

fn sniff_content_type(body: &Bytes) -> HeaderValue {
    match std::str::from_utf8(body) {
        Ok(text) if text.trim_start().starts_with('<') => {
            HeaderValue::from_static("text/html; charset=utf-8")
        }
        Ok(_) => HeaderValue::from_static("text/plain; charset=utf-8"),
        Err(_) => HeaderValue::from_static("application/octet-stream"),
    }
}
