//! One-shot startup guard.
//!
//! An application can be started from several entry points (`start`,
//! `router`, `middleware`, `listen`). The guard runs the start sequence on
//! the first call only; later calls return the stored result.
//!
//! # Design Decisions
//! - Fail fast: a failed start is remembered, never retried
//! - No locking: the guard is owned by the application and driven through `&mut`

use crate::error::ConfigurationError;

#[derive(Debug)]
enum State<T> {
    Pending,
    Started(T),
    Failed(String),
}

#[derive(Debug)]
pub struct Startup<T> {
    state: State<T>,
}

impl<T> Startup<T> {
    pub fn new() -> Self {
        Self {
            state: State::Pending,
        }
    }

    /// Run `start` if this is the first call; return the started value.
    pub fn start_with<F>(&mut self, start: F) -> Result<&T, ConfigurationError>
    where
        F: FnOnce() -> Result<T, ConfigurationError>,
    {
        if let State::Pending = self.state {
            match start() {
                Ok(value) => self.state = State::Started(value),
                Err(err) => {
                    tracing::error!(error = %err, "startup failed");
                    self.state = State::Failed(err.to_string());
                    return Err(err);
                }
            }
        }

        match &self.state {
            State::Started(value) => Ok(value),
            State::Failed(reason) => Err(ConfigurationError::Aborted(reason.clone())),
            State::Pending => Err(ConfigurationError::Aborted("start did not run".to_string())),
        }
    }

    pub fn get(&self) -> Option<&T> {
        match &self.state {
            State::Started(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_started(&self) -> bool {
        matches!(self.state, State::Started(_))
    }

    /// True once a start has been attempted, successful or not.
    pub fn is_attempted(&self) -> bool {
        !matches!(self.state, State::Pending)
    }
}

impl<T> Default for Startup<T> {
    fn default() -> Self {
        Self::new()
    }
}
