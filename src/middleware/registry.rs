//! Middleware registration and preparation.
//!
//! Registrations are collected in call order. [`MiddlewareRegistry::prepare`]
//! builds factory links, names and scopes every entry, and hands the lot to
//! the ordering engine. It consumes the registrations, so the application
//! runs it exactly once, inside its guarded start.

use std::sync::Arc;

use crate::app::AppHandle;
use crate::config::AppConfig;
use crate::error::{ConfigurationError, Result};
use crate::middleware::{Middleware, MiddlewareOptions, ScopedMiddleware};
use crate::ordering::{order, Placement};

/// Builds a link once the application context is frozen.
pub type FactoryFn =
    Box<dyn FnOnce(&AppConfig, &AppHandle) -> Result<Arc<dyn Middleware>> + Send>;

/// What was registered: a ready link or a factory producing one.
pub enum Handler {
    Link(Arc<dyn Middleware>),
    Factory { name: String, build: FactoryFn },
}

impl Handler {
    /// A named factory, invoked once with the config and the frozen app.
    pub fn factory<F>(name: impl Into<String>, build: F) -> Self
    where
        F: FnOnce(&AppConfig, &AppHandle) -> Result<Arc<dyn Middleware>> + Send + 'static,
    {
        Handler::Factory {
            name: name.into(),
            build: Box::new(build),
        }
    }
}

impl<M: Middleware + 'static> From<M> for Handler {
    fn from(link: M) -> Self {
        Handler::Link(Arc::new(link))
    }
}

impl From<Arc<dyn Middleware>> for Handler {
    fn from(link: Arc<dyn Middleware>) -> Self {
        Handler::Link(link)
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Handler::Link(link) => f.debug_tuple("Link").field(&link.name()).finish(),
            Handler::Factory { name, .. } => f.debug_tuple("Factory").field(name).finish(),
        }
    }
}

/// A prepared middleware, ready for ordering and mounting.
pub struct MiddlewareDescriptor {
    pub name: String,
    pub level: Option<i32>,
    pub before: Option<String>,
    pub after: Option<String>,
    pub link: Arc<dyn Middleware>,
}

impl std::fmt::Debug for MiddlewareDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareDescriptor")
            .field("name", &self.name)
            .field("level", &self.level)
            .field("before", &self.before)
            .field("after", &self.after)
            .field("link", &self.link.name())
            .finish()
    }
}

impl Placement for MiddlewareDescriptor {
    fn name(&self) -> &str {
        &self.name
    }

    fn level(&self) -> Option<i32> {
        self.level
    }

    fn before(&self) -> Option<&str> {
        self.before.as_deref()
    }

    fn after(&self) -> Option<&str> {
        self.after.as_deref()
    }
}

#[derive(Debug, Default)]
pub struct MiddlewareRegistry {
    entries: Vec<(Handler, MiddlewareOptions)>,
}

impl MiddlewareRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: impl Into<Handler>, options: impl Into<MiddlewareOptions>) {
        self.entries.push((handler.into(), options.into()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build, name, scope and order every registration.
    pub fn prepare(
        &mut self,
        config: &AppConfig,
        app: &AppHandle,
    ) -> Result<Vec<MiddlewareDescriptor>, ConfigurationError> {
        let mut descriptors = Vec::with_capacity(self.entries.len());

        for (handler, options) in self.entries.drain(..) {
            let (factory_name, link) = match handler {
                Handler::Link(link) => (None, link),
                Handler::Factory { name, build } => {
                    let link = build(config, app).map_err(|e| ConfigurationError::Factory {
                        name: name.clone(),
                        reason: e.to_string(),
                    })?;
                    (Some(name), link)
                }
            };

            let name = options
                .name
                .clone()
                .or(factory_name)
                .unwrap_or_else(|| link.name().to_string());
            let link = ScopedMiddleware::wrap(link, &options)?;

            descriptors.push(MiddlewareDescriptor {
                name,
                level: options.level,
                before: options.before,
                after: options.after,
                link,
            });
        }

        order(descriptors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::from_fn;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn noop(name: &'static str) -> Arc<dyn Middleware> {
        Arc::new(from_fn(name, |ctx, next| next.run(ctx)))
    }

    fn names(descriptors: &[MiddlewareDescriptor]) -> Vec<&str> {
        descriptors.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn test_prepare_orders_and_names() {
        let app = AppHandle::empty();
        let calls = Arc::new(AtomicUsize::new(0));

        let mut registry = MiddlewareRegistry::new();
        registry.register(noop("body"), 3);
        registry.register(noop("auth"), MiddlewareOptions::new().name("session"));
        let counter = Arc::clone(&calls);
        registry.register(
            Handler::factory("boundary", move |_config, _app| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(noop("inner"))
            }),
            0,
        );
        registry.register(noop("csrf"), MiddlewareOptions::new().before("body"));

        let prepared = registry.prepare(app.config(), &app).unwrap();
        assert_eq!(names(&prepared), vec!["boundary", "csrf", "body", "session"]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_scoped_link_keeps_name() {
        let app = AppHandle::empty();
        let mut registry = MiddlewareRegistry::new();
        registry.register(noop("static"), MiddlewareOptions::new().matches("/public/*"));

        let prepared = registry.prepare(app.config(), &app).unwrap();
        assert_eq!(prepared[0].name, "static");
        assert_eq!(prepared[0].link.name(), "proxy-/public/*->static");
    }

    #[test]
    fn test_factory_failure_aborts() {
        let app = AppHandle::empty();
        let mut registry = MiddlewareRegistry::new();
        registry.register(
            Handler::factory("broken", |_config, _app| {
                Err(crate::error::Error::internal("missing secret"))
            }),
            MiddlewareOptions::new(),
        );

        let err = registry.prepare(app.config(), &app).unwrap_err();
        assert!(matches!(err, ConfigurationError::Factory { ref name, .. } if name == "broken"));
    }

    #[test]
    fn test_cycle_is_rejected() {
        let app = AppHandle::empty();
        let mut registry = MiddlewareRegistry::new();
        registry.register(noop("a"), MiddlewareOptions::new().before("b"));
        registry.register(noop("b"), MiddlewareOptions::new().before("a"));

        let err = registry.prepare(app.config(), &app).unwrap_err();
        assert!(matches!(err, ConfigurationError::Cycle { .. }));
    }
}
