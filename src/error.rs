//! Error taxonomy for the dispatch core.
//!
//! # Categories
//! - [`ConfigurationError`]: fatal at startup, aborts `App::start`
//! - [`Error::Http`]: an explicit status raised by a middleware, filter or action
//! - [`Error::InvalidResult`]: a claimed result that carries neither content nor data
//! - [`Error::Internal`]: anything untyped, always reported as a 500
//!
//! Routing misses are not errors; they surface as an absent route.

use axum::http::StatusCode;
use thiserror::Error;

/// Startup-time configuration problems.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// `before`/`after` constraints that cannot be satisfied.
    #[error("middleware ordering constraints form a cycle: {}", names.join(" -> "))]
    Cycle { names: Vec<String> },

    /// Acyclic constraints that still cannot all hold: `{pinned}` must sit
    /// next to `{anchor}`, which is itself pinned to the other side of
    /// `{target}`.
    #[error("ordering constraint `{pinned}` {side} `{anchor}` conflicts with `{anchor}` being pinned to `{target}`")]
    Conflict {
        pinned: String,
        side: &'static str,
        anchor: String,
        target: String,
    },

    /// A route or scope pattern that does not compile.
    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A configured middleware name with no definition in the catalog.
    #[error("middleware `{0}` is not defined")]
    UnknownMiddleware(String),

    /// A middleware factory refused to build its link.
    #[error("middleware factory `{name}` failed: {reason}")]
    Factory { name: String, reason: String },

    /// An earlier start attempt failed; the application cannot be started.
    #[error("application start previously failed: {0}")]
    Aborted(String),
}

/// Errors raised while handling a request.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigurationError),

    #[error("invalid navigate result")]
    InvalidResult,

    #[error("{message}")]
    Http { status: StatusCode, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Build an error carrying an explicit HTTP status.
    ///
    /// An empty message falls back to the status' canonical reason.
    pub fn http(status: StatusCode, message: impl Into<String>) -> Self {
        let mut message = message.into();
        if message.is_empty() {
            message = status.canonical_reason().unwrap_or_default().to_string();
        }
        Error::Http { status, message }
    }

    /// Wrap any error as an untyped internal failure.
    pub fn internal(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Internal(err.into())
    }

    /// The status explicitly attached to this error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for intentional client errors (explicit status below 500).
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| s.as_u16() < 500)
    }
}

/// Result alias used across the request path.
pub type Result<T, E = Error> = std::result::Result<T, E>;
