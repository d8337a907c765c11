//! Courier: request-dispatch core for module/action web applications.
//!
//! Turns an unordered set of middlewares, filters and route rules into one
//! deterministic per-request pipeline on top of axum.

pub mod app;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod middleware;
pub mod navigate;
pub mod observability;
pub mod ordering;
pub mod routing;

pub use app::{App, AppHandle};
pub use config::AppConfig;
pub use error::{ConfigurationError, Error, Result};
pub use http::{Context, HttpServer};
pub use lifecycle::Shutdown;
pub use middleware::{Middleware, MiddlewareOptions, Next};
pub use navigate::{Actions, Filter, NavigateResult, Outcome};
