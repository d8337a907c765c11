//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, JSON lines)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID travels as a header and shows up in request spans
//! - Metrics are cheap (atomic increments) and off unless configured

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
pub use metrics::init_metrics;
