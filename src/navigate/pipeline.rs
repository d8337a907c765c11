//! The navigation middleware: route → filters → action → response.

use std::slice;

use futures_util::future::BoxFuture;

use crate::app::AppHandle;
use crate::error::{Error, Result};
use crate::http::Context;
use crate::middleware::{Middleware, Next};
use crate::navigate::filter::Phase;
use crate::navigate::invoker::{invoke, Direction};
use crate::navigate::result::{NavigateResult, Outcome};
use crate::navigate::responder::{DataResponder, JsonResponder};
use crate::routing::{Route, RouteContext};

const LOG_PREVIEW: usize = 1000;

/// Dispatches the request's route and writes the result into the response.
///
/// Requests without a route pass through to the next link untouched.
/// Routed requests end here: the remainder of the chain is not run.
pub struct NavigateMiddleware {
    app: AppHandle,
}

impl NavigateMiddleware {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }

    /// Run filters and the action for `route`, returning whichever outcome
    /// claimed the request.
    pub async fn navigate(&self, route: Route, ctx: &mut Context) -> Result<Option<Outcome>> {
        let route = RouteContext::top_level(route);
        let filters = self.app.filters();

        let mut outcome = invoke(
            filters,
            Phase::BeforeAction.as_str(),
            &route,
            ctx,
            Direction::Forward,
        )
        .await?;

        if outcome.is_none() {
            outcome = self.dispatch(&route, ctx).await?;
        }

        let after = invoke(
            filters,
            Phase::AfterAction.as_str(),
            &route,
            ctx,
            Direction::Reverse,
        )
        .await?;

        Ok(after.or(outcome))
    }

    async fn dispatch(&self, route: &RouteContext, ctx: &mut Context) -> Result<Option<Outcome>> {
        let Some(module) = self.app.modules().get(route.module()) else {
            tracing::debug!(module = route.module(), "module not found");
            return Ok(None);
        };
        tracing::debug!(module = route.module(), action = route.action(), "dispatch action");
        invoke(
            slice::from_ref(&module),
            route.action(),
            route,
            ctx,
            Direction::Forward,
        )
        .await
    }

    fn respond(&self, ctx: &mut Context, result: NavigateResult) -> Result<()> {
        if let Some(content) = result.content {
            log_result(&content);
            ctx.set_body(content);
            return Ok(());
        }
        if let Some(data) = result.data_value() {
            log_result(&data.to_string());
            return match self.app.responder() {
                Some(responder) => responder.respond(ctx, data),
                None => JsonResponder.respond(ctx, data),
            };
        }
        // reported at error level by the boundary that catches it
        tracing::debug!(result = ?result, "invalid navigate result");
        Err(Error::InvalidResult)
    }
}

impl Middleware for NavigateMiddleware {
    fn handle<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let Some(route) = ctx.route.clone() else {
                return next.run(ctx).await;
            };

            match self.navigate(route, ctx).await? {
                Some(Outcome::Result(result)) => self.respond(ctx, result),
                Some(Outcome::Halt) | Some(Outcome::Continue) | None => Ok(()),
            }
        })
    }

    fn name(&self) -> &str {
        "navigate"
    }
}

fn log_result(text: &str) {
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }
    let preview: String = text.chars().take(LOG_PREVIEW).collect();
    tracing::debug!(preview = %preview, "set response");
}
