//! Route resolution middleware.

use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::error::Result;
use crate::http::Context;
use crate::middleware::{Middleware, Next};
use crate::observability::metrics;
use crate::routing::{RouteCache, Router};

/// Attaches a [`Route`](crate::routing::Route) to the context when none is set yet.
///
/// A miss leaves the route unset and still hands off downstream; later
/// links (a static file handler, say) may answer the request.
pub struct RouteResolver {
    router: Arc<Router>,
    cache: RouteCache,
}

impl RouteResolver {
    pub fn new(router: Arc<Router>) -> Self {
        Self {
            router,
            cache: RouteCache::new(),
        }
    }

    pub fn cache(&self) -> &RouteCache {
        &self.cache
    }

    /// Resolve and bind a route for the context's path and query.
    pub fn resolve(&self, ctx: &mut Context) {
        let path = ctx.path();
        tracing::debug!(path, "try route");

        let template = match self.cache.get(path) {
            Some(template) => {
                metrics::record_route_cache(true);
                Some(template)
            }
            None => {
                metrics::record_route_cache(false);
                let resolved = self.router.route(path).map(Arc::new);
                if let Some(template) = &resolved {
                    self.cache.set(path, Arc::clone(template));
                }
                resolved
            }
        };

        ctx.route = template.map(|t| t.bind(ctx.query()));
        match &ctx.route {
            Some(route) => tracing::debug!(module = %route.module, action = %route.action, "route success"),
            None => tracing::debug!(path = ctx.path(), "no route"),
        }
    }
}

impl Middleware for RouteResolver {
    fn handle<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, Result<()>> {
        if let Some(route) = &ctx.route {
            tracing::debug!(module = %route.module, action = %route.action, "already routed");
        } else {
            self.resolve(ctx);
        }
        next.run(ctx)
    }

    fn name(&self) -> &str {
        "router"
    }
}
