//! End-to-end tests of the request pipeline through the axum router.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use futures_util::future::BoxFuture;
use serde_json::json;

use common::{app, development, get, oneshot, send, Collect, Push};
use courier::middleware::from_fn;
use courier::navigate::{HookFuture, Outcome};
use courier::routing::RouteContext;
use courier::{
    Actions, ConfigurationError, Context, Error, Filter, Middleware, MiddlewareOptions,
    NavigateResult, Next, Result,
};

/// Raises `status` for every request it sees.
struct Raise(StatusCode);

impl Middleware for Raise {
    fn handle<'a>(&'a self, ctx: &'a mut Context, _next: Next<'a>) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move { Err(ctx.throw(self.0, "")) })
    }
}

/// Fails with an untyped error.
struct Crash;

impl Middleware for Crash {
    fn handle<'a>(&'a self, _ctx: &'a mut Context, _next: Next<'a>) -> BoxFuture<'a, Result<()>> {
        Box::pin(async { Err(Error::internal("disk on fire <now>")) })
    }
}

fn post_module() -> Actions {
    Actions::new()
        .on("view", |route, _ctx| {
            let id = route.query().get("id").cloned();
            Box::pin(async move { Ok(NavigateResult::data(json!({ "id": id })).into()) })
        })
        .on("edit", |_route, _ctx| {
            Box::pin(async { Ok(NavigateResult::content("<form></form>").into()) })
        })
        .on("broken", |_route, _ctx| {
            Box::pin(async { Ok(Outcome::Result(NavigateResult::default())) })
        })
        .on("empty", |_route, _ctx| {
            Box::pin(async { Ok(NavigateResult::data(serde_json::Value::Null).into()) })
        })
}

#[tokio::test]
async fn test_levels_order_the_chain() {
    let mut app = app("");
    app.add_middleware(Push::new("plover", "Plover"), MiddlewareOptions::new());
    app.add_middleware(Push::new("hello", "Hello"), 2);
    app.add_middleware(Collect, 0);

    let reply = get(&mut app, "/").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, "Hello Plover");
}

#[tokio::test]
async fn test_before_constraint_within_level() {
    #[derive(Clone)]
    struct IgnoreCsrf;

    let mut app = app("");
    app.add_middleware(
        from_fn("mycsrf", |ctx, next| {
            Box::pin(async move {
                if ctx.extensions().get::<IgnoreCsrf>().is_some() {
                    ctx.set_body("ignore csrf");
                    return Ok(());
                }
                if ctx.method() == Method::POST {
                    return Err(ctx.throw(StatusCode::FORBIDDEN, "invalid csrf token"));
                }
                next.run(ctx).await
            })
        }),
        MiddlewareOptions::new(),
    );
    app.add_middleware(
        from_fn("csrf-bypass", |ctx, next| {
            Box::pin(async move {
                ctx.extensions_mut().insert(IgnoreCsrf);
                next.run(ctx).await
            })
        }),
        MiddlewareOptions::new().before("mycsrf"),
    );

    let reply = send(&mut app, Method::POST, "/").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, "ignore csrf");
}

#[tokio::test]
async fn test_after_constraint_moves_link_later() {
    let mut app = app("");
    app.add_middleware(Collect, 0);
    app.add_middleware(Push::new("second", "second"), MiddlewareOptions::new().after("first"));
    app.add_middleware(Push::new("first", "first"), MiddlewareOptions::new());

    let reply = get(&mut app, "/").await;
    assert_eq!(reply.body, "first second");
}

#[tokio::test]
async fn test_development_error_page() {
    let mut app = development();
    app.add_middleware(Crash, MiddlewareOptions::new());

    let reply = get(&mut app, "/").await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(reply.body.starts_with("<pre>"));
    assert!(reply.body.contains("disk on fire &lt;now&gt;"));
    assert!(reply.header("content-type").unwrap().starts_with("text/html"));
}

#[tokio::test]
async fn test_production_hides_error_details() {
    let mut app = app("");
    app.add_middleware(Crash, MiddlewareOptions::new());

    let reply = get(&mut app, "/").await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply.body, "Internal Server Error");
    assert!(!reply.body.contains("disk on fire"));
}

#[tokio::test]
async fn test_client_errors_keep_their_status() {
    let mut app = development();
    app.add_middleware(
        Raise(StatusCode::UNAUTHORIZED),
        MiddlewareOptions::new().matches("/admin/*"),
    );
    app.add_middleware(
        Raise(StatusCode::BAD_REQUEST),
        MiddlewareOptions::new().matches("/form").method("POST"),
    );

    let reply = get(&mut app, "/admin/users").await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.body, "Unauthorized");

    let reply = send(&mut app, Method::POST, "/form").await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = get(&mut app, "/form").await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_data_result_is_json() {
    let mut app = app("");
    app.add_route("/post/:id", "post/view?id=$1").unwrap();
    app.add_module("post", post_module());

    let reply = get(&mut app, "/post/42").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, r#"{"id":"42"}"#);
    assert_eq!(reply.header("content-type"), Some("application/json; charset=utf-8"));
    assert_eq!(reply.header("x-content-type-options"), Some("nosniff"));
}

#[tokio::test]
async fn test_data_result_as_jsonp() {
    let mut app = app("");
    app.add_route("/post/:id", "post/view?id=$1").unwrap();
    app.add_module("post", post_module());

    let reply = get(&mut app, "/post/42?callback=render").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(
        reply.body,
        r#"/**/ typeof render === 'function' && render({"id":"42"});"#
    );
    assert_eq!(reply.header("content-type"), Some("text/javascript; charset=utf-8"));
    assert_eq!(reply.header("x-content-type-options"), Some("nosniff"));
}

#[tokio::test]
async fn test_convention_routes_reach_actions() {
    let mut app = app("");
    app.add_module("post", post_module());

    let reply = get(&mut app, "/post/edit").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, "<form></form>");
    assert!(reply.header("content-type").unwrap().starts_with("text/html"));

    let reply = get(&mut app, "/post/missing").await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let reply = get(&mut app, "/nowhere").await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_result_is_a_server_error() {
    let mut app = app("");
    app.add_module("post", post_module());

    let reply = get(&mut app, "/post/broken").await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply.body, "Internal Server Error");

    let reply = get(&mut app, "/post/empty").await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply.body, "Internal Server Error");
}

#[tokio::test]
async fn test_filter_claims_request() {
    struct Maintenance;

    impl Filter for Maintenance {
        fn before_action<'a>(
            &'a self,
            route: &'a RouteContext,
            ctx: &'a mut Context,
        ) -> Option<HookFuture<'a>> {
            if route.module() != "post" {
                return None;
            }
            Some(Box::pin(async move {
                ctx.set_status(StatusCode::SERVICE_UNAVAILABLE);
                ctx.set_body("down for maintenance");
                Ok(Outcome::Halt)
            }))
        }
    }

    struct Stamp;

    impl Filter for Stamp {
        fn after_action<'a>(
            &'a self,
            _route: &'a RouteContext,
            ctx: &'a mut Context,
        ) -> Option<HookFuture<'a>> {
            Some(Box::pin(async move {
                ctx.response_headers_mut()
                    .insert("x-stamp", "after".parse().unwrap());
                Ok(Outcome::Continue)
            }))
        }
    }

    let mut app = app("");
    app.add_module("post", post_module());
    app.add_module(
        "about",
        Actions::new().on("view", |_route, _ctx| {
            Box::pin(async { Ok(NavigateResult::content("about us").into()) })
        }),
    );
    app.add_filter(Maintenance, None);
    app.add_filter(Stamp, Some(1));

    let reply = get(&mut app, "/post/edit").await;
    assert_eq!(reply.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(reply.body, "down for maintenance");
    assert_eq!(reply.header("x-stamp"), Some("after"));

    let reply = get(&mut app, "/about").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, "about us");
    assert_eq!(reply.header("x-stamp"), Some("after"));
}

#[tokio::test]
async fn test_mount_started_app_as_middleware() {
    let mut inner = app("");
    inner.add_middleware(
        from_fn("hello", |ctx, next| {
            Box::pin(async move {
                if ctx.path() == "/hello" {
                    ctx.set_body("hello plover");
                    return Ok(());
                }
                next.run(ctx).await
            })
        }),
        MiddlewareOptions::new(),
    );
    let mounted = inner.middleware().unwrap();

    let mut outer = app("");
    outer.add_middleware(mounted, 1);

    let reply = get(&mut outer, "/hello").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, "hello plover");
}

#[tokio::test]
async fn test_configured_middleware_from_catalog() {
    let mut app = app(
        r#"
        [[middlewares]]
        module = "powered-by"
        level = 1
        match = "/api/*"
        "#,
    );
    app.define_middleware("powered-by", |_config, _app| {
        Ok(Arc::new(from_fn("powered-by", |ctx, next| {
            Box::pin(async move {
                next.run(&mut *ctx).await?;
                ctx.response_headers_mut()
                    .insert("x-powered-by", "courier".parse().unwrap());
                Ok(())
            })
        })) as Arc<dyn Middleware>)
    });

    let reply = get(&mut app, "/api/items").await;
    assert_eq!(reply.header("x-powered-by"), Some("courier"));

    let reply = get(&mut app, "/items").await;
    assert_eq!(reply.header("x-powered-by"), None);
}

#[tokio::test]
async fn test_cycle_aborts_start() {
    let mut app = app("");
    app.add_middleware(Push::new("a", "a"), MiddlewareOptions::new().before("b"));
    app.add_middleware(Push::new("b", "b"), MiddlewareOptions::new().before("a"));

    let err = app.router().unwrap_err();
    assert!(matches!(err, ConfigurationError::Cycle { .. }));
    assert!(matches!(app.start().unwrap_err(), ConfigurationError::Aborted(_)));
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let mut app = app("");
    let router = app.router().unwrap();

    let request = Request::builder()
        .uri("/")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .unwrap();
    let reply = oneshot(router.clone(), request).await;
    assert_eq!(reply.header("x-request-id"), Some("abc-123"));

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let reply = oneshot(router, request).await;
    assert!(reply.header("x-request-id").is_some());
}
