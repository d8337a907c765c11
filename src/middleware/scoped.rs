//! Path/method scoped middleware.

use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::error::{ConfigurationError, Result};
use crate::http::Context;
use crate::middleware::{Middleware, MiddlewareOptions, Next};
use crate::routing::Pattern;

/// Runs the wrapped link only for matching paths and methods; everything
/// else goes straight to `next`.
pub struct ScopedMiddleware {
    name: String,
    pattern: Option<Pattern>,
    methods: Vec<String>,
    inner: Arc<dyn Middleware>,
}

impl ScopedMiddleware {
    pub fn new(
        inner: Arc<dyn Middleware>,
        pattern: Option<&str>,
        methods: Vec<String>,
    ) -> Result<Self, ConfigurationError> {
        let pattern = pattern.map(Pattern::path).transpose()?;
        let name = format!(
            "proxy-{}->{}",
            pattern.as_ref().map(Pattern::as_str).unwrap_or("*"),
            inner.name()
        );
        tracing::info!(name = %name, methods = ?methods, "create scoped middleware");
        Ok(Self {
            name,
            pattern,
            methods,
            inner,
        })
    }

    /// Wrap `inner` according to `options`, or return it untouched.
    pub fn wrap(
        inner: Arc<dyn Middleware>,
        options: &MiddlewareOptions,
    ) -> Result<Arc<dyn Middleware>, ConfigurationError> {
        if !options.is_scoped() {
            return Ok(inner);
        }
        let scoped = Self::new(inner, options.matches.as_deref(), options.methods.clone())?;
        Ok(Arc::new(scoped))
    }

    pub fn applies(&self, ctx: &Context) -> bool {
        let path_ok = self
            .pattern
            .as_ref()
            .map_or(true, |p| p.is_match(ctx.path()));
        let method_ok = self.methods.is_empty()
            || self
                .methods
                .iter()
                .any(|m| m.eq_ignore_ascii_case(ctx.method().as_str()));
        path_ok && method_ok
    }
}

impl Middleware for ScopedMiddleware {
    fn handle<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, Result<()>> {
        if self.applies(ctx) {
            tracing::debug!(path = ctx.path(), name = %self.name, "scope matches");
            self.inner.handle(ctx, next)
        } else {
            next.run(ctx)
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
