//! Shared utilities for integration tests.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use futures_util::future::BoxFuture;
use tower::ServiceExt;

use courier::config::{parse_config, AppConfig};
use courier::{App, Context, Middleware, Next, Result};

/// A response reduced to what the assertions look at.
pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl Reply {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// An application built from TOML (empty string for defaults).
pub fn app(config: &str) -> App {
    let config = if config.is_empty() {
        AppConfig::default()
    } else {
        parse_config(config).unwrap()
    };
    App::new(config).unwrap()
}

pub fn development() -> App {
    app(r#"env = "development""#)
}

/// Send one request through the app's router.
pub async fn send(app: &mut App, method: Method, uri: &str) -> Reply {
    let router = app.router().unwrap();
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    oneshot(router, request).await
}

pub async fn get(app: &mut App, uri: &str) -> Reply {
    send(app, Method::GET, uri).await
}

pub async fn oneshot(router: axum::Router, request: Request<Body>) -> Reply {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    Reply {
        status,
        headers,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

/// Words pushed by [`Push`] links, in the order they ran.
#[derive(Debug, Clone, Default)]
pub struct Trail(pub Vec<&'static str>);

/// Starts a trail and writes it, space separated, as the response body once
/// the rest of the chain has run.
pub struct Collect;

impl Middleware for Collect {
    fn handle<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            ctx.extensions_mut().insert(Trail::default());
            next.run(&mut *ctx).await?;
            let words = ctx
                .extensions()
                .get::<Trail>()
                .map(|t| t.0.join(" "))
                .unwrap_or_default();
            ctx.set_body(words);
            Ok(())
        })
    }

    fn name(&self) -> &str {
        "collect"
    }
}

/// Appends a word to the trail and hands off.
pub struct Push {
    pub name: &'static str,
    pub word: &'static str,
}

impl Push {
    pub fn new(name: &'static str, word: &'static str) -> Self {
        Self { name, word }
    }
}

impl Middleware for Push {
    fn handle<'a>(&'a self, ctx: &'a mut Context, next: Next<'a>) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            if let Some(trail) = ctx.extensions_mut().get_mut::<Trail>() {
                trail.0.push(self.word);
            }
            next.run(ctx).await
        })
    }

    fn name(&self) -> &str {
        self.name
    }
}
