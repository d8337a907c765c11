//! The application: registration, one-shot start, and serving.
//!
//! # Data Flow
//! ```text
//! App::new(config)
//!     → configured routes, built-in middlewares registered
//! add_middleware / add_filter / add_module / add_route ...
//!     → collected, nothing runs yet
//! start() (first call from start/router/middleware/server/listen)
//!     → router, filters, modules, responder frozen into an AppHandle
//!     → configured middlewares resolved through the catalog
//!     → factories built, links scoped and ordered
//!     → chain: [Arc<dyn Middleware>]
//! ```
//!
//! # Built-in chain
//! | level | link |
//! |---|---|
//! | 0 | error boundary (outermost) |
//! | 2 | route resolver |
//! | 3 | anything registered without a level |
//! | 4 | error boundary, then navigation |

use std::sync::Arc;

use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::sync::broadcast;

use crate::config::AppConfig;
use crate::error::{ConfigurationError, Error, Result};
use crate::http::{Chain, HttpServer};
use crate::lifecycle::Startup;
use crate::middleware::{
    compose, level, ErrorBoundary, Handler, Middleware, MiddlewareCatalog, MiddlewareOptions,
    MiddlewareRegistry,
};
use crate::navigate::{DataResponder, Filter, FilterDescriptor, Module, ModuleRegistry, NavigateMiddleware};
use crate::ordering::{order, DEFAULT_LEVEL};
use crate::routing::{RouteResolver, Router};

/// Read-only view of a started application.
///
/// Handed to middleware factories and held by the navigation middleware.
#[derive(Clone)]
pub struct AppHandle {
    inner: Arc<Frozen>,
}

struct Frozen {
    config: Arc<AppConfig>,
    router: Arc<Router>,
    filters: Vec<FilterDescriptor>,
    modules: ModuleRegistry,
    responder: Option<Arc<dyn DataResponder>>,
}

impl AppHandle {
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.inner.router
    }

    /// Filters in execution order.
    pub fn filters(&self) -> &[FilterDescriptor] {
        &self.inner.filters
    }

    pub fn modules(&self) -> &ModuleRegistry {
        &self.inner.modules
    }

    pub fn responder(&self) -> Option<&Arc<dyn DataResponder>> {
        self.inner.responder.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn empty() -> Self {
        Self {
            inner: Arc::new(Frozen {
                config: Arc::new(AppConfig::default()),
                router: Arc::new(Router::new()),
                filters: Vec::new(),
                modules: ModuleRegistry::new(),
                responder: None,
            }),
        }
    }
}

impl std::fmt::Debug for AppHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppHandle")
            .field("env", &self.inner.config.env)
            .field("routes", &self.inner.router.len())
            .field("filters", &self.inner.filters)
            .field("modules", &self.inner.modules.len())
            .finish()
    }
}

/// Registrations collected before start.
#[derive(Default)]
struct Pending {
    router: Router,
    middlewares: MiddlewareRegistry,
    catalog: MiddlewareCatalog,
    filters: Vec<FilterDescriptor>,
    modules: ModuleRegistry,
    responder: Option<Arc<dyn DataResponder>>,
}

struct Started {
    handle: AppHandle,
    chain: Chain,
}

pub struct App {
    config: Arc<AppConfig>,
    pending: Pending,
    startup: Startup<Started>,
}

impl App {
    /// Create an application with the built-in chain and configured routes.
    pub fn new(config: AppConfig) -> Result<Self, ConfigurationError> {
        let mut router = if config.router.disable_default_router {
            Router::without_conventions()
        } else {
            Router::new()
        };
        for route in &config.routes {
            if route.regex {
                router.add_regex(&route.pattern, route.to.as_str())?;
            } else {
                router.add(&route.pattern, route.to.as_str())?;
            }
        }

        let mut app = Self {
            config: Arc::new(config),
            pending: Pending {
                router,
                ..Pending::default()
            },
            startup: Startup::new(),
        };
        app.register_builtins();
        Ok(app)
    }

    fn register_builtins(&mut self) {
        let boundary = |config: &AppConfig, _app: &AppHandle| -> Result<Arc<dyn Middleware>> {
            Ok(Arc::new(ErrorBoundary::new(config.env)))
        };

        let registry = &mut self.pending.middlewares;
        registry.register(
            Handler::factory("error-boundary", boundary),
            level::ERROR_BOUNDARY,
        );
        registry.register(
            Handler::factory("router", |_config, app| {
                Ok(Arc::new(RouteResolver::new(Arc::clone(app.router()))) as Arc<dyn Middleware>)
            }),
            level::ROUTER,
        );
        registry.register(
            Handler::factory("error-boundary", boundary),
            level::NAVIGATE,
        );
        registry.register(
            Handler::factory("navigate", |_config, app| {
                Ok(Arc::new(NavigateMiddleware::new(app.clone())) as Arc<dyn Middleware>)
            }),
            level::NAVIGATE,
        );
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn is_started(&self) -> bool {
        self.startup.is_started()
    }

    /// The frozen application context, once started.
    pub fn handle(&self) -> Option<&AppHandle> {
        self.startup.get().map(|started| &started.handle)
    }

    fn accepting(&self, what: &str) -> bool {
        if self.startup.is_attempted() {
            tracing::warn!(what, "registration after start ignored");
            return false;
        }
        true
    }

    /// Register a middleware link or factory.
    ///
    /// `options` is a level (`app.add_middleware(link, 2)`) or full
    /// [`MiddlewareOptions`].
    pub fn add_middleware(
        &mut self,
        handler: impl Into<Handler>,
        options: impl Into<MiddlewareOptions>,
    ) -> &mut Self {
        if self.accepting("middleware") {
            self.pending.middlewares.register(handler, options);
        }
        self
    }

    /// Define a named factory that `[[middlewares]]` config entries can load.
    pub fn define_middleware<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&AppConfig, &AppHandle) -> Result<Arc<dyn Middleware>> + Send + Sync + 'static,
    {
        if self.accepting("middleware definition") {
            self.pending.catalog.define(name, factory);
        }
        self
    }

    /// Add a path-form route rule (`/post/:id` → `post/view?id=$1`).
    pub fn add_route(&mut self, pattern: &str, target: &str) -> Result<&mut Self, ConfigurationError> {
        if self.accepting("route") {
            self.pending.router.add(pattern, target)?;
        }
        Ok(self)
    }

    /// Add a regular-expression route rule.
    pub fn add_regex_route(
        &mut self,
        pattern: &str,
        target: &str,
    ) -> Result<&mut Self, ConfigurationError> {
        if self.accepting("route") {
            self.pending.router.add_regex(pattern, target)?;
        }
        Ok(self)
    }

    pub fn add_filter<F: Filter + 'static>(&mut self, filter: F, level: Option<i32>) -> &mut Self {
        if self.accepting("filter") {
            self.pending
                .filters
                .push(FilterDescriptor::new(Arc::new(filter), level));
        }
        self
    }

    pub fn add_module<M: Module + 'static>(&mut self, name: impl Into<String>, module: M) -> &mut Self {
        if self.accepting("module") {
            self.pending.modules.insert(name, Arc::new(module));
        }
        self
    }

    /// Replace the JSON/JSONP serialization of `data` results.
    pub fn set_responder<R: DataResponder + 'static>(&mut self, responder: R) -> &mut Self {
        if self.accepting("responder") {
            self.pending.responder = Some(Arc::new(responder));
        }
        self
    }

    /// Freeze registrations and build the chain. Runs once; later calls
    /// return the first outcome.
    pub fn start(&mut self) -> Result<&AppHandle, ConfigurationError> {
        let config = &self.config;
        let pending = &mut self.pending;
        self.startup
            .start_with(|| prepare(config, pending))
            .map(|started| &started.handle)
    }

    fn chain(&mut self) -> Result<Chain, ConfigurationError> {
        self.start()?;
        self.startup
            .get()
            .map(|started| Arc::clone(&started.chain))
            .ok_or_else(|| ConfigurationError::Aborted("application not started".to_string()))
    }

    /// An axum router serving this application, for tests or embedding.
    pub fn router(&mut self) -> Result<axum::Router, ConfigurationError> {
        let chain = self.chain()?;
        Ok(HttpServer::build_router(chain, &self.config.server))
    }

    /// The whole started chain as one link, for mounting inside another app.
    pub fn middleware(&mut self) -> Result<Arc<dyn Middleware>, ConfigurationError> {
        let chain = self.chain()?;
        Ok(Arc::new(compose(chain.to_vec())))
    }

    pub fn server(&mut self) -> Result<HttpServer, ConfigurationError> {
        let chain = self.chain()?;
        Ok(HttpServer::new(chain, &self.config.server))
    }

    /// Start, bind `addr`, and serve until `signal` fires.
    pub async fn listen(
        &mut self,
        addr: impl ToSocketAddrs,
        signal: broadcast::Receiver<()>,
    ) -> Result<()> {
        let server = self.server()?;
        let listener = TcpListener::bind(addr).await.map_err(Error::Io)?;
        server.run(listener, signal).await?;
        Ok(())
    }
}

fn prepare(config: &Arc<AppConfig>, pending: &mut Pending) -> Result<Started, ConfigurationError> {
    let filters = order(std::mem::take(&mut pending.filters))?;
    for filter in &filters {
        tracing::info!(name = filter.name(), level = filter.level(), "load filter");
    }

    let handle = AppHandle {
        inner: Arc::new(Frozen {
            config: Arc::clone(config),
            router: Arc::new(std::mem::take(&mut pending.router)),
            filters,
            modules: std::mem::take(&mut pending.modules),
            responder: pending.responder.take(),
        }),
    };

    for entry in &config.middlewares {
        let (handler, options) = pending.catalog.handler(entry)?;
        pending.middlewares.register(handler, options);
    }

    let descriptors = pending.middlewares.prepare(config, &handle)?;
    for descriptor in &descriptors {
        tracing::info!(
            name = %descriptor.name,
            level = descriptor.level.unwrap_or(DEFAULT_LEVEL),
            "load middleware"
        );
    }

    let chain: Chain = descriptors.into_iter().map(|d| d.link).collect();
    tracing::info!(
        env = %config.env,
        middlewares = chain.len(),
        routes = handle.router().len(),
        modules = handle.modules().len(),
        "application started"
    );
    Ok(Started { handle, chain })
}
