//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     first start/router/middleware/listen call
//!         → freeze router, filters, modules
//!         → build factories, order middlewares
//!         → chain ready (later calls reuse it)
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C or trigger() → stop accepting → drain in-flight requests → exit
//! ```
//!
//! # Design Decisions
//! - Startup errors are fatal and sticky
//! - Ordered shutdown: stop accept, drain, close

pub mod shutdown;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::Startup;
