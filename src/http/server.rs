//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router whose fallback runs the middleware chain
//! - Wire up layers (tracing, timeout, body limit, request ID)
//! - Buffer the request body and build the per-request [`Context`]
//! - Bind server to listener with graceful shutdown
//! - Observability (metrics, correlation IDs)

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultOnFailure, TraceLayer},
};

use crate::config::ServerConfig;
use crate::http::request::{RequestIdGenerator, X_REQUEST_ID};
use crate::http::{response, Context};
use crate::lifecycle::shutdown;
use crate::middleware::{Middleware, Next};
use crate::observability::metrics;

/// The started middleware chain, shared by every request.
pub type Chain = Arc<[Arc<dyn Middleware>]>;

#[derive(Clone)]
struct DispatchState {
    chain: Chain,
    max_body_size: usize,
}

/// HTTP server for a started application.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(chain: Chain, config: &ServerConfig) -> Self {
        Self {
            router: Self::build_router(chain, config),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(chain: Chain, config: &ServerConfig) -> Router {
        let state = DispatchState {
            chain,
            max_body_size: config.max_body_size,
        };

        Router::new()
            .fallback(dispatch)
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(|request: &Request| {
                        let request_id = request
                            .headers()
                            .get(X_REQUEST_ID)
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or("-");
                        tracing::info_span!(
                            "request",
                            method = %request.method(),
                            uri = %request.uri(),
                            request_id = %request_id,
                        )
                    })
                    // 5xx responses are already reported by the error boundary
                    .on_failure(DefaultOnFailure::new().level(tracing::Level::DEBUG)),
            )
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, RequestIdGenerator))
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `signal` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        signal: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(signal))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Run one request through the chain.
async fn dispatch(State(state): State<DispatchState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();

    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, state.max_body_size).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, limit = state.max_body_size, "request body rejected");
            metrics::record_request(&method, StatusCode::PAYLOAD_TOO_LARGE.as_u16(), start);
            return (StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large").into_response();
        }
    };

    let mut ctx = Context::from_parts(parts, body);
    tracing::debug!(path = ctx.path(), "dispatch");

    let outcome = Next::new(&state.chain).run(&mut ctx).await;
    let response = match outcome {
        Ok(()) => response::into_response(ctx),
        Err(err) => {
            tracing::error!(error = %err, path = ctx.path(), "unhandled error escaped the chain");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    };

    metrics::record_request(&method, response.status().as_u16(), start);
    response
}
