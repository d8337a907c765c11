//! Ordered iteration with early exit over hook-bearing items.
//!
//! The invoker asks each item, in order, for the hook named `hook`. Items
//! without that hook are skipped. Each present hook is awaited, and the first
//! outcome that claims the request (see [`Outcome::is_success`]) ends the
//! iteration and is returned. Filters and actions are both dispatched this way.

use crate::error::Result;
use crate::http::Context;
use crate::navigate::result::{HookFuture, Outcome};
use crate::routing::RouteContext;

/// Something that exposes zero or more named hooks.
pub trait Hooks: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// The hook named `hook`, ready to run, or `None` when this item does not
    /// implement it.
    fn hook<'a>(
        &'a self,
        hook: &str,
        route: &'a RouteContext,
        ctx: &'a mut Context,
    ) -> Option<HookFuture<'a>>;
}

/// Iteration order over the item list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

/// Run `hook` over `items` until one claims the request.
///
/// Returns `Ok(None)` when every item deferred or lacked the hook. Errors
/// raised by a hook propagate immediately.
pub async fn invoke<H: Hooks>(
    items: &[H],
    hook: &str,
    route: &RouteContext,
    ctx: &mut Context,
    direction: Direction,
) -> Result<Option<Outcome>> {
    let count = items.len();
    for step in 0..count {
        let index = match direction {
            Direction::Forward => step,
            Direction::Reverse => count - step - 1,
        };
        let item = &items[index];

        let Some(pending) = item.hook(hook, route, ctx) else {
            continue;
        };

        tracing::debug!(item = item.name(), hook, "invoke");
        let outcome = pending.await?;
        if outcome.is_success() {
            return Ok(Some(outcome));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::navigate::result::NavigateResult;
    use crate::routing::Route;
    use axum::http::{Method, StatusCode, Uri};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Test item: answers `hook` with a fixed value, counting calls.
    struct Stub {
        name: &'static str,
        hook: Option<&'static str>,
        reply: Value,
        calls: Arc<AtomicUsize>,
    }

    impl Stub {
        fn new(name: &'static str, hook: Option<&'static str>, reply: Value) -> Self {
            Self {
                name,
                hook,
                reply,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl Hooks for Stub {
        fn name(&self) -> &str {
            self.name
        }

        fn hook<'a>(
            &'a self,
            hook: &str,
            _route: &'a RouteContext,
            ctx: &'a mut Context,
        ) -> Option<HookFuture<'a>> {
            if self.hook != Some(hook) {
                return None;
            }
            Some(Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                let trail = format!("{}{}", ctx.body_text().unwrap_or_default(), self.name);
                ctx.set_body(trail);
                Ok(Outcome::from(self.reply.clone()))
            }))
        }
    }

    fn fixtures() -> (Arc<RouteContext>, Context) {
        (
            RouteContext::top_level(Route::new("index", "view")),
            Context::new(Method::GET, Uri::from_static("/")),
        )
    }

    #[tokio::test]
    async fn test_explicit_false_stops_iteration() {
        let items = vec![
            Stub::new("f1", Some("other"), Value::Null),
            Stub::new("f2", Some("before_action"), json!(false)),
            Stub::new("f3", Some("before_action"), json!({"x": 1})),
        ];
        let (route, mut ctx) = fixtures();

        let outcome = invoke(&items, "before_action", &route, &mut ctx, Direction::Forward)
            .await
            .unwrap();

        assert_eq!(outcome, Some(Outcome::Halt));
        assert_eq!(items[0].calls.load(Ordering::SeqCst), 0);
        assert_eq!(items[1].calls.load(Ordering::SeqCst), 1);
        assert_eq!(items[2].calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_undefined_defers_to_next() {
        let items = vec![
            Stub::new("f1", Some("hook"), Value::Null),
            Stub::new("f2", Some("hook"), json!(1)),
            Stub::new("f3", Some("hook"), json!({"data": [1]})),
        ];
        let (route, mut ctx) = fixtures();

        let outcome = invoke(&items, "hook", &route, &mut ctx, Direction::Forward)
            .await
            .unwrap();

        assert_eq!(outcome, Some(Outcome::Result(NavigateResult::data(json!([1])))));
        assert_eq!(ctx.body_text(), Some("f1f2f3"));
    }

    #[tokio::test]
    async fn test_reverse_order() {
        let items = vec![
            Stub::new("a", Some("hook"), Value::Null),
            Stub::new("b", Some("hook"), Value::Null),
            Stub::new("c", Some("hook"), Value::Null),
        ];
        let (route, mut ctx) = fixtures();

        let outcome = invoke(&items, "hook", &route, &mut ctx, Direction::Reverse)
            .await
            .unwrap();

        assert_eq!(outcome, None);
        assert_eq!(ctx.body_text(), Some("cba"));
    }

    #[tokio::test]
    async fn test_missing_hook_everywhere() {
        let items = vec![Stub::new("a", None, json!(false))];
        let (route, mut ctx) = fixtures();
        let outcome = invoke(&items, "hook", &route, &mut ctx, Direction::Forward)
            .await
            .unwrap();
        assert_eq!(outcome, None);
        assert!(ctx.body().is_none());
    }

    struct Failing;

    impl Hooks for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn hook<'a>(
            &'a self,
            _hook: &str,
            _route: &'a RouteContext,
            _ctx: &'a mut Context,
        ) -> Option<HookFuture<'a>> {
            Some(Box::pin(async {
                Err(Error::http(StatusCode::FORBIDDEN, "denied"))
            }))
        }
    }

    #[tokio::test]
    async fn test_hook_error_propagates() {
        let (route, mut ctx) = fixtures();
        let err = invoke(&[Failing], "any", &route, &mut ctx, Direction::Forward)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
    }
}
