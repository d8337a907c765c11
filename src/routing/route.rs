//! Route shapes.
//!
//! - [`RouteTemplate`]: what the router resolves and the cache stores. Holds
//!   only the static query assignments baked into a rule's target.
//! - [`Route`]: the template bound to one request; owns a fresh query map.
//! - [`RouteContext`]: the navigation-time view of a route, linked to its
//!   enclosing route so nested navigations can find the top-level one.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

/// Module targeted by an empty module segment.
pub const DEFAULT_MODULE: &str = "index";

/// Action targeted by an empty action segment.
pub const DEFAULT_ACTION: &str = "view";

/// Request-independent resolution of a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTemplate {
    pub module: String,
    pub action: String,
    pub query: HashMap<String, String>,
}

impl RouteTemplate {
    pub fn new(module: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            action: action.into(),
            query: HashMap::new(),
        }
    }

    /// Bind to a request: static assignments first, live query on top.
    pub fn bind(&self, live: &HashMap<String, String>) -> Route {
        let mut query = self.query.clone();
        query.extend(live.iter().map(|(k, v)| (k.clone(), v.clone())));
        Route {
            module: self.module.clone(),
            action: self.action.clone(),
            query,
        }
    }
}

/// A route attached to one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub module: String,
    pub action: String,
    pub query: HashMap<String, String>,
}

impl Route {
    pub fn new(module: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            action: action.into(),
            query: HashMap::new(),
        }
    }
}

/// A route being navigated, with a link to the route that started it.
#[derive(Debug)]
pub struct RouteContext {
    route: Route,
    parent: Option<Weak<RouteContext>>,
}

impl RouteContext {
    /// A route navigated directly from a request: no parent, root is itself.
    pub fn top_level(route: Route) -> Arc<Self> {
        Arc::new(Self {
            route,
            parent: None,
        })
    }

    /// A nested navigation chained off `self`.
    pub fn child(self: &Arc<Self>, route: Route) -> Arc<Self> {
        Arc::new(Self {
            route,
            parent: Some(Arc::downgrade(self)),
        })
    }

    pub fn module(&self) -> &str {
        &self.route.module
    }

    pub fn action(&self) -> &str {
        &self.route.action
    }

    pub fn query(&self) -> &HashMap<String, String> {
        &self.route.query
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn parent(&self) -> Option<Arc<RouteContext>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// The top-level route of this navigation chain.
    pub fn root(self: &Arc<Self>) -> Arc<RouteContext> {
        let mut current = Arc::clone(self);
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }
}
