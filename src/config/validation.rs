//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that route and scope patterns compile
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{AppConfig, MiddlewareEntry};
use crate::routing::Pattern;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field}: invalid socket address `{value}`")]
    InvalidAddress { field: &'static str, value: String },

    #[error("server.request_timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("server.max_body_size must be greater than zero")]
    ZeroBodySize,

    #[error("routes[{index}]: {reason}")]
    InvalidRoute { index: usize, reason: String },

    #[error("middlewares[{index}]: {reason}")]
    InvalidMiddleware { index: usize, reason: String },
}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "server.bind_address",
            value: config.server.bind_address.clone(),
        });
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    if config.server.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodySize);
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    for (index, route) in config.routes.iter().enumerate() {
        if route.to.trim().is_empty() {
            errors.push(ValidationError::InvalidRoute {
                index,
                reason: "empty target".to_string(),
            });
        }
        let compiled = if route.regex {
            Pattern::regex(&route.pattern).map(drop).map_err(|e| e.to_string())
        } else {
            Pattern::path(&route.pattern).map(drop).map_err(|e| e.to_string())
        };
        if let Err(reason) = compiled {
            errors.push(ValidationError::InvalidRoute { index, reason });
        }
    }

    for (index, entry) in config.middlewares.iter().enumerate() {
        if entry.modules().iter().all(|m| m.trim().is_empty()) {
            errors.push(ValidationError::InvalidMiddleware {
                index,
                reason: "no module given".to_string(),
            });
        }
        if let MiddlewareEntry::Settings(settings) = entry {
            if let Some(pattern) = &settings.matches {
                if let Err(e) = Pattern::path(pattern) {
                    errors.push(ValidationError::InvalidMiddleware {
                        index,
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
