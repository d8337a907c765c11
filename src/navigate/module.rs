//! Action modules.
//!
//! A module groups actions under one name. Routes address an action as
//! `module/action`; the navigation dispatches it through the invoker with
//! the action name as the hook name, so an action follows the same success
//! predicate as a filter.

use std::collections::HashMap;
use std::sync::Arc;

use crate::http::Context;
use crate::navigate::invoker::Hooks;
use crate::navigate::result::HookFuture;
use crate::routing::RouteContext;

/// A named set of actions.
pub trait Module: Send + Sync {
    /// The action named `name`, ready to run, or `None` if this module has no
    /// such action.
    fn action<'a>(
        &'a self,
        name: &str,
        route: &'a RouteContext,
        ctx: &'a mut Context,
    ) -> Option<HookFuture<'a>>;
}

type ActionFn =
    Box<dyn for<'a> Fn(&'a RouteContext, &'a mut Context) -> HookFuture<'a> + Send + Sync>;

/// A module assembled from closures.
///
/// ```rust,ignore
/// let post = Actions::new()
///     .on("view", |route, _ctx| {
///         let id = route.query().get("id").cloned();
///         Box::pin(async move { Ok(NavigateResult::data(json!({ "id": id })).into()) })
///     });
/// ```
#[derive(Default)]
pub struct Actions {
    actions: HashMap<String, ActionFn>,
}

impl Actions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action.
    pub fn on<F>(mut self, name: impl Into<String>, action: F) -> Self
    where
        F: for<'a> Fn(&'a RouteContext, &'a mut Context) -> HookFuture<'a> + Send + Sync + 'static,
    {
        self.actions.insert(name.into(), Box::new(action));
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }
}

impl Module for Actions {
    fn action<'a>(
        &'a self,
        name: &str,
        route: &'a RouteContext,
        ctx: &'a mut Context,
    ) -> Option<HookFuture<'a>> {
        self.actions.get(name).map(|action| action(route, ctx))
    }
}

/// Modules addressable by name.
#[derive(Default, Clone)]
pub struct ModuleRegistry {
    modules: HashMap<String, Arc<dyn Module>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, module: Arc<dyn Module>) {
        let name = name.into();
        if self.modules.insert(name.clone(), module).is_some() {
            tracing::warn!(module = %name, "module replaced");
        }
    }

    pub fn get(&self, name: &str) -> Option<ModuleEntry> {
        self.modules.get(name).map(|module| ModuleEntry {
            name: name.to_string(),
            module: Arc::clone(module),
        })
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// A module looked up for one dispatch; its hooks are its actions.
pub struct ModuleEntry {
    name: String,
    module: Arc<dyn Module>,
}

impl Hooks for ModuleEntry {
    fn name(&self) -> &str {
        &self.name
    }

    fn hook<'a>(
        &'a self,
        hook: &str,
        route: &'a RouteContext,
        ctx: &'a mut Context,
    ) -> Option<HookFuture<'a>> {
        self.module.action(hook, route, ctx)
    }
}
