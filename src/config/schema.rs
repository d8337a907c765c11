//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! application. All types derive Serde traits for deserialization from
//! config files.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::middleware::MiddlewareOptions;

/// Root configuration for an application.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Runtime environment; controls how much error detail responses carry.
    pub env: Environment,

    /// HTTP listener settings.
    pub server: ServerConfig,

    /// Convention router settings.
    pub router: RouterConfig,

    /// Custom route rules, tried in order before the conventions.
    pub routes: Vec<RouteConfig>,

    /// Middlewares loaded from the catalog at startup.
    pub middlewares: Vec<MiddlewareEntry>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Test,
    #[default]
    Production,
}

impl Environment {
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Production => "production",
        };
        f.write_str(name)
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Whole-request timeout at the HTTP boundary.
    pub request_timeout_secs: u64,

    /// Largest request body buffered into the context, in bytes.
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
            max_body_size: 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Turn off the `/` and `/{module}/{action}` convention rules.
    pub disable_default_router: bool,
}

/// A custom route rule.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Path pattern (`/post/:id`) or, with `regex = true`, a regular expression.
    pub pattern: String,

    /// Target template (`post/view?id=$1`).
    pub to: String,

    #[serde(default)]
    pub regex: bool,
}

/// A configured middleware: either a bare catalog name or full settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum MiddlewareEntry {
    Name(String),
    Settings(MiddlewareSettings),
}

impl MiddlewareEntry {
    /// Catalog names this entry loads, in order.
    pub fn modules(&self) -> Vec<String> {
        match self {
            MiddlewareEntry::Name(name) => vec![name.clone()],
            MiddlewareEntry::Settings(settings) => settings.modules(),
        }
    }

    pub fn options(&self) -> MiddlewareOptions {
        match self {
            MiddlewareEntry::Name(_) => MiddlewareOptions::new(),
            MiddlewareEntry::Settings(settings) => MiddlewareOptions {
                name: None,
                level: settings.level,
                before: settings.before.clone(),
                after: settings.after.clone(),
                matches: settings.matches.clone(),
                methods: settings.method.clone().map(OneOrMany::into_vec).unwrap_or_default(),
            },
        }
    }
}

/// Full middleware settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MiddlewareSettings {
    pub module: Option<OneOrMany>,
    pub modules: Option<OneOrMany>,
    pub level: Option<i32>,
    pub before: Option<String>,
    pub after: Option<String>,
    #[serde(rename = "match")]
    pub matches: Option<String>,
    pub method: Option<OneOrMany>,
}

impl MiddlewareSettings {
    pub fn modules(&self) -> Vec<String> {
        self.module
            .clone()
            .or_else(|| self.modules.clone())
            .map(OneOrMany::into_vec)
            .unwrap_or_default()
    }
}

/// A string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive.
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
