//! Middleware chain.
//!
//! # Data Flow
//! ```text
//! App::add_middleware(handler, options)
//!     → registry.rs (descriptor per registration, factories built once)
//!     → ordering engine (level buckets + before/after)
//!     → frozen chain: [Arc<dyn Middleware>]
//!
//! Per request:
//!     Next::new(&chain).run(ctx)
//!         → link[0].handle(ctx, next) → ... → link[n].handle(ctx, next)
//!         ← each link resumes after `next.run(ctx).await`
//! ```
//!
//! # Design Decisions
//! - Every link boundary is an `.await`; downstream work finishes before the caller resumes
//! - The chain is immutable after startup and shared via `Arc`
//! - Errors propagate as `Err` until an [`ErrorBoundary`] shapes them

pub mod catalog;
pub mod error_boundary;
pub mod options;
pub mod registry;
pub mod scoped;

use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::error::Result;
use crate::http::Context;

pub use catalog::MiddlewareCatalog;
pub use error_boundary::ErrorBoundary;
pub use options::MiddlewareOptions;
pub use registry::{Handler, MiddlewareDescriptor, MiddlewareRegistry};
pub use scoped::ScopedMiddleware;

/// Levels used by the built-in links.
pub mod level {
    /// Outermost error boundary.
    pub const ERROR_BOUNDARY: i32 = 0;
    /// Route resolution.
    pub const ROUTER: i32 = 2;
    /// Anything registered without an explicit level.
    pub const DEFAULT: i32 = crate::ordering::DEFAULT_LEVEL;
    /// Navigation and its inner error boundary.
    pub const NAVIGATE: i32 = 4;
}

/// A suspendable link in the request chain.
pub trait Middleware: Send + Sync {
    /// Handle the request, calling `next.run(ctx)` to hand off downstream.
    fn handle<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, Result<()>>;

    /// Name used for `before`/`after` addressing and logs.
    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }
}

/// The remainder of the chain after the current link.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    chain: &'a [Arc<dyn Middleware>],
    tail: Option<&'a Next<'a>>,
}

impl<'a> Next<'a> {
    /// Start of a chain.
    pub fn new(chain: &'a [Arc<dyn Middleware>]) -> Self {
        Self { chain, tail: None }
    }

    /// Run the rest of the chain to completion.
    pub fn run(self, ctx: &'a mut Context) -> BoxFuture<'a, Result<()>> {
        match self.chain.split_first() {
            Some((head, rest)) => head.handle(
                ctx,
                Next {
                    chain: rest,
                    tail: self.tail,
                },
            ),
            None => match self.tail {
                Some(tail) => tail.run(ctx),
                None => Box::pin(async { Ok(()) }),
            },
        }
    }
}

impl std::fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next")
            .field("remaining", &self.chain.len())
            .field("nested", &self.tail.is_some())
            .finish()
    }
}

/// Middleware built from a closure.
pub struct FnMiddleware<F> {
    name: String,
    f: F,
}

/// Wrap a closure as a named middleware.
///
/// ```rust,ignore
/// let hello = middleware::from_fn("hello", |ctx, next| {
///     Box::pin(async move {
///         if ctx.path() == "/hello" {
///             ctx.set_body("hello");
///             return Ok(());
///         }
///         next.run(ctx).await
///     })
/// });
/// ```
pub fn from_fn<F>(name: impl Into<String>, f: F) -> FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut Context, Next<'a>) -> BoxFuture<'a, Result<()>> + Send + Sync,
{
    FnMiddleware {
        name: name.into(),
        f,
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut Context, Next<'a>) -> BoxFuture<'a, Result<()>> + Send + Sync,
{
    fn handle<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, Result<()>> {
        (self.f)(ctx, next)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Several links run as one.
pub struct Compose {
    name: String,
    links: Vec<Arc<dyn Middleware>>,
}

/// Compose `links` into a single middleware named `compose-a|b|c`.
pub fn compose(links: Vec<Arc<dyn Middleware>>) -> Compose {
    let name = format!(
        "compose-{}",
        links.iter().map(|l| l.name()).collect::<Vec<_>>().join("|")
    );
    Compose { name, links }
}

impl Compose {
    /// Rename the composition.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl Middleware for Compose {
    fn handle<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let inner = Next {
                chain: &self.links[..],
                tail: Some(&next),
            };
            inner.run(ctx).await
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Strip the module path and generic arguments from a type name.
pub(crate) fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
