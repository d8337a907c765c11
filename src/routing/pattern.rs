//! Route pattern and target DSLs.
//!
//! # Patterns
//! - Path form: `/post/:id`, `/static/*`. `:name` captures one segment,
//!   `*` captures the remainder, everything else is literal. Matching is
//!   case-insensitive and tolerates one trailing `/`.
//! - Regex form: any `regex` crate expression, matched as written.
//!
//! # Targets
//! `module/action?key=$1&flag=on` or `module/action&key=$1`, where `$n` is
//! replaced by capture group `n` (empty when the group did not participate). An empty module resolves to
//! `index`, an empty action to `view`, and query pairs with empty values are
//! dropped.

use std::collections::HashMap;

use regex::Regex;

use crate::error::ConfigurationError;
use crate::routing::route::{RouteTemplate, DEFAULT_ACTION, DEFAULT_MODULE};

/// A compiled path matcher.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile a path-form pattern.
    pub fn path(pattern: &str) -> Result<Self, ConfigurationError> {
        let trimmed = if pattern.len() > 1 {
            pattern.trim_end_matches('/')
        } else {
            ""
        };

        let mut expr = String::from("(?i)^");
        let mut chars = trimmed.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                ':' if chars.peek().is_some_and(|n| n.is_ascii_alphanumeric() || *n == '_') => {
                    while chars
                        .peek()
                        .is_some_and(|n| n.is_ascii_alphanumeric() || *n == '_')
                    {
                        chars.next();
                    }
                    expr.push_str("([^/]+?)");
                }
                '*' => expr.push_str("(.*)"),
                other => expr.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
            }
        }
        expr.push_str("/?$");

        let regex = Regex::new(&expr).map_err(|source| ConfigurationError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Compile a regular expression pattern.
    pub fn regex(pattern: &str) -> Result<Self, ConfigurationError> {
        let regex = Regex::new(pattern).map_err(|source| ConfigurationError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self::from(regex))
    }

    /// The pattern as it was written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Positional captures; index 0 is the whole match.
    pub fn captures<'p>(&self, path: &'p str) -> Option<Vec<Option<&'p str>>> {
        self.regex
            .captures(path)
            .map(|caps| caps.iter().map(|m| m.map(|m| m.as_str())).collect())
    }
}

impl From<Regex> for Pattern {
    fn from(regex: Regex) -> Self {
        Self {
            source: regex.as_str().to_string(),
            regex,
        }
    }
}

/// A route target template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    template: String,
}

impl Target {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Substitute captures and split into module, action and static query.
    pub fn expand(&self, captures: &[Option<&str>]) -> RouteTemplate {
        let expanded = substitute(&self.template, captures);
        let (location, query) = match expanded.find(['?', '&']) {
            Some(at) => (&expanded[..at], &expanded[at + 1..]),
            None => (expanded.as_str(), ""),
        };

        let location = location.trim_start_matches('/');
        let (module, action) = location.split_once('/').unwrap_or((location, ""));
        let module = if module.is_empty() { DEFAULT_MODULE } else { module };
        let action = if action.is_empty() { DEFAULT_ACTION } else { action };

        let query: HashMap<String, String> = url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .filter(|(_, v)| !v.is_empty())
            .collect();

        RouteTemplate {
            module: module.to_string(),
            action: action.to_string(),
            query,
        }
    }
}

impl From<&str> for Target {
    fn from(template: &str) -> Self {
        Self::new(template)
    }
}

fn substitute(template: &str, captures: &[Option<&str>]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }

        let start = i + 1;
        let mut end = start;
        while let Some(&(j, d)) = chars.peek() {
            if !d.is_ascii_digit() {
                break;
            }
            end = j + d.len_utf8();
            chars.next();
        }

        if end == start {
            out.push('$');
            continue;
        }

        let group: usize = template[start..end].parse().unwrap_or(usize::MAX);
        if let Some(Some(value)) = captures.get(group) {
            out.push_str(value);
        }
    }
    out
}
