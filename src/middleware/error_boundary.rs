//! Error boundary middleware.
//!
//! Catches every error raised downstream and turns it into a response.
//! Client errors (explicit status below 500) keep their status and message.
//! Everything else is logged once at error level and answered with a 500
//! whose body depends on the environment.

use std::error::Error as StdError;
use std::fmt::Write as _;

use axum::http::StatusCode;
use futures_util::future::BoxFuture;

use crate::config::Environment;
use crate::error::{Error, Result};
use crate::http::Context;
use crate::middleware::{Middleware, Next};

const GENERIC_MESSAGE: &str = "Internal Server Error";

pub struct ErrorBoundary {
    env: Environment,
}

impl ErrorBoundary {
    pub fn new(env: Environment) -> Self {
        Self { env }
    }

    /// Write the response for `err` into `ctx`.
    pub fn render(&self, ctx: &mut Context, err: &Error) {
        ctx.clear_response();

        if let Some(status) = err.status().filter(|s| s.as_u16() < 500) {
            tracing::debug!(status = status.as_u16(), error = %err, path = ctx.path(), "client error");
            ctx.set_status(status);
            ctx.set_content_type("text/plain; charset=utf-8");
            ctx.set_body(err.to_string());
            return;
        }

        let report = error_chain(err);
        tracing::error!(
            error = %report,
            path = ctx.path(),
            request_id = ctx.request_id().unwrap_or("-"),
            "request failed"
        );

        ctx.set_status(StatusCode::INTERNAL_SERVER_ERROR);
        if self.env.is_development() {
            ctx.set_content_type("text/html; charset=utf-8");
            ctx.set_body(format!("<pre>{}</pre>", escape_html(&report)));
        } else {
            ctx.set_content_type("text/plain; charset=utf-8");
            ctx.set_body(GENERIC_MESSAGE);
        }
    }
}

impl Middleware for ErrorBoundary {
    fn handle<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            if let Err(err) = next.run(&mut *ctx).await {
                self.render(ctx, &err);
            }
            Ok(())
        })
    }

    fn name(&self) -> &str {
        "error-boundary"
    }
}

/// The error message followed by each source, one per line.
fn error_chain(err: &Error) -> String {
    let mut report = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let _ = write!(report, "\ncaused by: {}", cause);
        source = cause.source();
    }
    report
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
