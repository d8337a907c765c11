//! Navigation: running filters and actions for a routed request.
//!
//! # Data Flow
//! ```text
//! ctx.route (set by the resolver)
//!     → pipeline.rs builds a top-level RouteContext
//!     → invoker.rs: filters "before_action" (forward)
//!     → invoker.rs: module action, unless a filter claimed the request
//!     → invoker.rs: filters "after_action" (reverse)
//!     → NavigateResult → content body | responder.rs (JSON/JSONP)
//! ```
//!
//! # Design Decisions
//! - Filters and actions share one claiming protocol ([`Outcome`])
//! - Hooks are optional; a missing hook is a skip, not an error
//! - A result without content or data is an error, never an empty 200

pub mod filter;
pub mod invoker;
pub mod module;
pub mod pipeline;
pub mod responder;
pub mod result;

pub use filter::{Filter, FilterDescriptor, Phase};
pub use invoker::{invoke, Direction, Hooks};
pub use module::{Actions, Module, ModuleEntry, ModuleRegistry};
pub use pipeline::NavigateMiddleware;
pub use responder::{jsonp_body, DataResponder, JsonResponder};
pub use result::{HookFuture, NavigateResult, Outcome};
