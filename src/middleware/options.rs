//! Registration options for middlewares.

use serde::Deserialize;

/// Where and when a middleware runs.
///
/// A bare integer converts into options carrying only a level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MiddlewareOptions {
    /// Explicit name tag; takes precedence over the link's own name.
    pub name: Option<String>,
    /// Priority bucket, lower runs earlier (default 3).
    pub level: Option<i32>,
    /// Run immediately before the named middleware.
    pub before: Option<String>,
    /// Run immediately after the named middleware.
    pub after: Option<String>,
    /// Only run for paths matching this pattern (`/api/:version/*`).
    #[serde(rename = "match")]
    pub matches: Option<String>,
    /// Only run for these HTTP methods (case-insensitive).
    #[serde(rename = "method")]
    pub methods: Vec<String>,
}

impl MiddlewareOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn level(mut self, level: i32) -> Self {
        self.level = Some(level);
        self
    }

    pub fn before(mut self, name: impl Into<String>) -> Self {
        self.before = Some(name.into());
        self
    }

    pub fn after(mut self, name: impl Into<String>) -> Self {
        self.after = Some(name.into());
        self
    }

    pub fn matches(mut self, pattern: impl Into<String>) -> Self {
        self.matches = Some(pattern.into());
        self
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.methods.push(method.into());
        self
    }

    /// True when the link must be wrapped in a path/method scope.
    pub fn is_scoped(&self) -> bool {
        self.matches.is_some() || !self.methods.is_empty()
    }
}

impl From<i32> for MiddlewareOptions {
    fn from(level: i32) -> Self {
        Self::new().level(level)
    }
}
