//! Courier demo server.
//!
//! ```text
//!     Client Request
//!     ──────────────▶ axum (request ID, trace, timeout, body limit)
//!                        │
//!                        ▼
//!                  ┌──────────────────────────────────────────┐
//!                  │ error boundary      (level 0)            │
//!                  │ route resolver      (level 2)            │
//!                  │ app middlewares     (level 3)            │
//!                  │ error boundary      (level 4)            │
//!                  │ navigate            (level 4)            │
//!                  │   filters → module action → filters      │
//!                  └──────────────────────────────────────────┘
//!                        │
//!     Client Response    ▼
//!     ◀────────────── Context → Response
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use axum::http::HeaderValue;
use clap::Parser;
use serde_json::json;

use courier::config::{load_config, AppConfig};
use courier::middleware::{from_fn, Middleware};
use courier::observability::{init_logging, init_metrics};
use courier::{Actions, App, NavigateResult, Shutdown};

#[derive(Debug, Parser)]
#[command(name = "courier", version, about = "Module/action request dispatcher")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `server.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }

    init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "courier starting");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "failed to parse metrics address"
            ),
        }
    }

    let bind_address = config.server.bind_address.clone();
    let mut app = App::new(config)?;

    app.define_middleware("powered-by", |_config, _app| {
        Ok(Arc::new(from_fn("powered-by", |ctx, next| {
            Box::pin(async move {
                next.run(&mut *ctx).await?;
                ctx.response_headers_mut()
                    .insert("x-powered-by", HeaderValue::from_static("courier"));
                Ok(())
            })
        })) as Arc<dyn Middleware>)
    });

    app.add_module(
        "index",
        Actions::new().on("view", |_route, _ctx| {
            Box::pin(async { Ok(NavigateResult::content("<h1>courier</h1>").into()) })
        }),
    );
    app.add_module(
        "status",
        Actions::new().on("view", |route, _ctx| {
            let body = json!({
                "status": "ok",
                "module": route.module(),
                "query": route.query(),
            });
            Box::pin(async move { Ok(NavigateResult::data(body).into()) })
        }),
    );

    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();

    app.listen(bind_address.as_str(), shutdown.subscribe()).await?;

    tracing::info!("shutdown complete");
    Ok(())
}
