//! HTTP boundary.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layers, body buffering)
//!     → request.rs (request ID assigned or kept)
//!     → context.rs (Context built from request parts)
//!     → middleware chain
//!     → response.rs (Context → Response, defaults applied)
//!     → Send to client
//! ```

pub mod context;
pub mod request;
pub mod response;
pub mod server;

pub use context::Context;
pub use request::{RequestIdGenerator, X_REQUEST_ID};
pub use response::into_response;
pub use server::{Chain, HttpServer};
