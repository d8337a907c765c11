//! Named middleware factories for configuration-driven loading.
//!
//! A config entry such as
//!
//! ```toml
//! [[middlewares]]
//! modules = ["cors", "csrf"]
//! level = 2
//! match = "/api/*"
//! ```
//!
//! names factories defined with `App::define_middleware`. Several modules in
//! one entry are composed into a single link named `compose-cors|csrf`.

use std::collections::HashMap;
use std::sync::Arc;

use crate::app::AppHandle;
use crate::config::{AppConfig, MiddlewareEntry};
use crate::error::{ConfigurationError, Result};
use crate::middleware::{compose, Handler, Middleware, MiddlewareOptions};

type Definition = Arc<dyn Fn(&AppConfig, &AppHandle) -> Result<Arc<dyn Middleware>> + Send + Sync>;

#[derive(Default, Clone)]
pub struct MiddlewareCatalog {
    definitions: HashMap<String, Definition>,
}

impl MiddlewareCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&AppConfig, &AppHandle) -> Result<Arc<dyn Middleware>> + Send + Sync + 'static,
    {
        self.definitions.insert(name.into(), Arc::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Turn a config entry into a registration.
    pub fn handler(
        &self,
        entry: &MiddlewareEntry,
    ) -> Result<(Handler, MiddlewareOptions), ConfigurationError> {
        let modules = entry.modules();
        let definitions = modules
            .iter()
            .map(|name| {
                self.definitions
                    .get(name)
                    .cloned()
                    .ok_or_else(|| ConfigurationError::UnknownMiddleware(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let name = match modules.as_slice() {
            [single] => single.clone(),
            _ => format!("compose-{}", modules.join("|")),
        };

        let build_name = name.clone();
        let handler = Handler::factory(name, move |config, app| {
            let mut links = definitions
                .iter()
                .map(|define| define(config, app))
                .collect::<Result<Vec<_>>>()?;
            if links.len() == 1 {
                return Ok(links.remove(0));
            }
            Ok(Arc::new(compose(links).named(build_name)) as Arc<dyn Middleware>)
        });

        Ok((handler, entry.options()))
    }
}

impl std::fmt::Debug for MiddlewareCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.definitions.keys()).finish()
    }
}
