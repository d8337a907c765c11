//! Route lookup.
//!
//! # Responsibilities
//! - Store custom rules in registration order
//! - Fall back to the convention rules unless disabled
//! - Return the matched template or an explicit miss (`None`)
//!
//! # Design Decisions
//! - Immutable after startup (shared via `Arc`, no locks)
//! - O(n) scan over custom rules; results are memoized by the route cache
//! - First match wins

use crate::error::ConfigurationError;
use crate::routing::pattern::{Pattern, Target};
use crate::routing::route::RouteTemplate;

/// Module and action names reachable by convention must start with a letter,
/// so `_internal` actions stay callable from code but not from URLs.
const CONVENTION_PATTERN: &str =
    r"^/([a-zA-Z][-A-Za-z0-9_]*?)(?:/([a-zA-Z][-A-Za-z0-9_]*?))?(?:\.(?:html|htm|json|jsonp))?/?$";

#[derive(Debug, Clone)]
struct Rule {
    pattern: Pattern,
    target: Target,
}

/// Ordered custom rules plus the optional convention fallback.
#[derive(Debug, Clone)]
pub struct Router {
    rules: Vec<Rule>,
    conventions: Option<Vec<Rule>>,
}

impl Router {
    /// An empty router with the convention fallback enabled.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            conventions: Some(convention_rules()),
        }
    }

    /// An empty router without the convention fallback.
    pub fn without_conventions() -> Self {
        Self {
            rules: Vec::new(),
            conventions: None,
        }
    }

    pub fn disable_conventions(&mut self) {
        self.conventions = None;
    }

    pub fn has_conventions(&self) -> bool {
        self.conventions.is_some()
    }

    /// Append a path-form rule (`/post/:id` → `post/view?id=$1`).
    pub fn add(
        &mut self,
        pattern: &str,
        target: impl Into<Target>,
    ) -> Result<&mut Self, ConfigurationError> {
        let pattern = Pattern::path(pattern)?;
        Ok(self.add_pattern(pattern, target))
    }

    /// Append a regular-expression rule.
    pub fn add_regex(
        &mut self,
        pattern: &str,
        target: impl Into<Target>,
    ) -> Result<&mut Self, ConfigurationError> {
        let pattern = Pattern::regex(pattern)?;
        Ok(self.add_pattern(pattern, target))
    }

    /// Append an already compiled rule.
    pub fn add_pattern(&mut self, pattern: Pattern, target: impl Into<Target>) -> &mut Self {
        let target = target.into();
        tracing::debug!(pattern = pattern.as_str(), target = target.as_str(), "add route");
        self.rules.push(Rule { pattern, target });
        self
    }

    /// Number of custom rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Resolve `path`: custom rules first, then conventions.
    pub fn route(&self, path: &str) -> Option<RouteTemplate> {
        scan(&self.rules, path).or_else(|| {
            self.conventions
                .as_deref()
                .and_then(|rules| scan(rules, path))
        })
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

fn scan(rules: &[Rule], path: &str) -> Option<RouteTemplate> {
    rules.iter().find_map(|rule| {
        rule.pattern
            .captures(path)
            .map(|caps| rule.target.expand(&caps))
    })
}

fn convention_rules() -> Vec<Rule> {
    let rules = [(r"^/$", "index/view"), (CONVENTION_PATTERN, "$1/$2")];
    rules
        .into_iter()
        .filter_map(|(pattern, target)| match Pattern::regex(pattern) {
            Ok(pattern) => Some(Rule {
                pattern,
                target: Target::new(target),
            }),
            Err(e) => {
                tracing::error!(error = %e, "convention route failed to compile");
                None
            }
        })
        .collect()
}
