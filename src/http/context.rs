//! Per-request context threaded through the middleware chain.
//!
//! One `Context` is built per request and owned exclusively by that
//! request's task. The request half is read-only; the response half is
//! filled in by middlewares, filters and actions and converted into an HTTP
//! response once the chain has unwound.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::http::{header, request::Parts, Extensions, HeaderMap, HeaderValue, Method, StatusCode, Uri};

use crate::error::Error;
use crate::http::request::X_REQUEST_ID;
use crate::routing::Route;

/// Request-scoped state shared by every link of the chain.
#[derive(Debug)]
pub struct Context {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    query: HashMap<String, String>,
    extensions: Extensions,

    /// Route resolved for this request; `None` until the resolver (or an
    /// upstream middleware) sets it.
    pub route: Option<Route>,

    status: Option<StatusCode>,
    response_headers: HeaderMap,
    response_body: Option<Bytes>,
}

impl Context {
    /// Create a context for a bodiless request, mostly useful in tests.
    pub fn new(method: Method, uri: Uri) -> Self {
        let query = parse_query(&uri);
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            query,
            extensions: Extensions::new(),
            route: None,
            status: None,
            response_headers: HeaderMap::new(),
            response_body: None,
        }
    }

    /// Create a context from decoded request parts and a buffered body.
    pub fn from_parts(parts: Parts, body: Bytes) -> Self {
        let mut ctx = Self::new(parts.method, parts.uri);
        ctx.headers = parts.headers;
        ctx.extensions = parts.extensions;
        ctx.body = body;
        ctx
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Raw request path, used verbatim as the route cache key.
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Decoded query parameters; the last occurrence of a key wins.
    pub fn query(&self) -> &HashMap<String, String> {
        &self.query
    }

    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn request_body(&self) -> &Bytes {
        &self.body
    }

    /// Request ID assigned at the HTTP boundary, if any.
    pub fn request_id(&self) -> Option<&str> {
        self.headers.get(X_REQUEST_ID).and_then(|v| v.to_str().ok())
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    /// Build an error carrying `status`; return it with `?` or `Err(..)`.
    pub fn throw(&self, status: StatusCode, message: impl Into<String>) -> Error {
        Error::http(status, message)
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.response_body.as_ref()
    }

    /// The response body as UTF-8 text, if set and valid.
    pub fn body_text(&self) -> Option<&str> {
        self.response_body
            .as_ref()
            .and_then(|b| std::str::from_utf8(b).ok())
    }

    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        self.response_body = Some(body.into());
    }

    pub fn response_headers(&self) -> &HeaderMap {
        &self.response_headers
    }

    pub fn response_headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.response_headers
    }

    pub fn set_content_type(&mut self, value: &'static str) {
        self.response_headers
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(value));
    }

    /// Drop everything written to the response so far.
    pub fn clear_response(&mut self) {
        self.status = None;
        self.response_headers.clear();
        self.response_body = None;
    }

    pub(crate) fn into_response_parts(self) -> (Option<StatusCode>, HeaderMap, Option<Bytes>) {
        (self.status, self.response_headers, self.response_body)
    }
}

fn parse_query(uri: &Uri) -> HashMap<String, String> {
    uri.query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}
