//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → resolver.rs (skip if a route is already attached)
//!     → cache.rs (exact path lookup)
//!     → router.rs on miss (custom rules, then conventions)
//!     → pattern.rs (match, expand target)
//!     → RouteTemplate bound to the live query → ctx.route
//! ```
//!
//! # Design Decisions
//! - Rules compiled at registration, immutable after startup
//! - Deterministic: same path always resolves to the same template
//! - First match wins (registration order)
//! - The cache stores request-independent templates only

pub mod cache;
pub mod pattern;
pub mod resolver;
pub mod route;
pub mod router;

pub use cache::RouteCache;
pub use pattern::{Pattern, Target};
pub use resolver::RouteResolver;
pub use route::{Route, RouteContext, RouteTemplate};
pub use router::Router;
