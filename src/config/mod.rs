//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → App::new (routes, router switches, configured middlewares)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once the app starts
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AppConfig, Environment, MiddlewareEntry, MiddlewareSettings, ObservabilityConfig, RouteConfig,
    RouterConfig, ServerConfig,
};
pub use validation::ValidationError;
