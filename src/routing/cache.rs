//! Path → route template memoization.

use std::sync::Arc;

use dashmap::DashMap;

use crate::routing::route::RouteTemplate;

/// Resolved templates keyed by the raw request path.
///
/// Entries live as long as the cache; distinct path shapes in a running
/// service are bounded, so nothing is evicted. Two requests missing on the
/// same path may both resolve and both insert; they write equal values.
#[derive(Debug, Clone, Default)]
pub struct RouteCache {
    inner: Arc<DashMap<String, Arc<RouteTemplate>>>,
}

impl RouteCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<Arc<RouteTemplate>> {
        self.inner.get(path).map(|r| Arc::clone(r.value()))
    }

    pub fn set(&self, path: impl Into<String>, template: Arc<RouteTemplate>) {
        self.inner.insert(path.into(), template);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
