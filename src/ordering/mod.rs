//! Ordering engine.
//!
//! # Data Flow
//! ```text
//! Registered items (name, level, before/after)
//!     → stable sort by level (lower first, default 3)
//!     → constraint pass: pin constrained items next to their anchors
//!     → cycle check: anything left unplaced is a configuration error
//!     → one total order
//! ```
//!
//! # Design Decisions
//! - Constraints override levels; unconstrained items keep their baseline order
//! - Several items pinned to one anchor stack in declaration order
//! - A constraint naming an unknown sibling is dropped with a warning

pub mod engine;

pub use engine::{order, Placement, DEFAULT_LEVEL};
