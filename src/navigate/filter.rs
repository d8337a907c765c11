//! Navigation filters.

use std::sync::Arc;

use crate::http::Context;
use crate::middleware::short_type_name;
use crate::navigate::invoker::Hooks;
use crate::navigate::result::HookFuture;
use crate::ordering::{Placement, DEFAULT_LEVEL};
use crate::routing::RouteContext;

/// Filter phases, in the order a navigation visits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Before the action runs; filters are asked in order.
    BeforeAction,
    /// After the action ran; filters are asked in reverse order.
    AfterAction,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::BeforeAction => "before_action",
            Phase::AfterAction => "after_action",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "before_action" => Some(Phase::BeforeAction),
            "after_action" => Some(Phase::AfterAction),
            _ => None,
        }
    }
}

/// An interceptor consulted around action dispatch.
///
/// Every hook is optional: the default returns `None`, which the invoker
/// reads as "not interested in this phase". A hook that exists returns a
/// future resolving to an [`Outcome`](crate::navigate::Outcome).
pub trait Filter: Send + Sync {
    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }

    fn before_action<'a>(
        &'a self,
        route: &'a RouteContext,
        ctx: &'a mut Context,
    ) -> Option<HookFuture<'a>> {
        let _ = (route, ctx);
        None
    }

    fn after_action<'a>(
        &'a self,
        route: &'a RouteContext,
        ctx: &'a mut Context,
    ) -> Option<HookFuture<'a>> {
        let _ = (route, ctx);
        None
    }
}

/// A registered filter with its level.
#[derive(Clone)]
pub struct FilterDescriptor {
    name: String,
    level: i32,
    filter: Arc<dyn Filter>,
}

impl FilterDescriptor {
    pub fn new(filter: Arc<dyn Filter>, level: Option<i32>) -> Self {
        Self {
            name: filter.name().to_string(),
            level: level.unwrap_or(DEFAULT_LEVEL),
            filter,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn filter(&self) -> &Arc<dyn Filter> {
        &self.filter
    }
}

impl std::fmt::Debug for FilterDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterDescriptor")
            .field("name", &self.name)
            .field("level", &self.level)
            .finish()
    }
}

impl Placement for FilterDescriptor {
    fn name(&self) -> &str {
        &self.name
    }

    fn level(&self) -> Option<i32> {
        Some(self.level)
    }
}

impl Hooks for FilterDescriptor {
    fn name(&self) -> &str {
        &self.name
    }

    fn hook<'a>(
        &'a self,
        hook: &str,
        route: &'a RouteContext,
        ctx: &'a mut Context,
    ) -> Option<HookFuture<'a>> {
        match Phase::from_name(hook)? {
            Phase::BeforeAction => self.filter.before_action(route, ctx),
            Phase::AfterAction => self.filter.after_action(route, ctx),
        }
    }
}
