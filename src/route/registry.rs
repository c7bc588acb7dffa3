//! Process-wide table of finalized route definitions.
//!
//! # Responsibilities
//! - Hold every registered RouteDefinition keyed by (method, path)
//! - Reject duplicate registrations at startup
//! - Serve O(1) lookups for the dispatcher
//!
//! # Design Decisions
//! - Explicitly constructed and passed into the transport binding; no
//!   process-wide mutable singleton
//! - Populated only during startup, then sealed behind Arc; request tasks
//!   read it concurrently without locks
//! - Duplicate (method, path) aborts startup rather than silently winning

use std::collections::HashMap;

use axum::http::Method;

use crate::route::builder::RouteDefinition;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("duplicate route registered for {0} {1}")]
    Duplicate(Method, String),
}

/// Read-only-after-startup mapping from (method, path) to definition.
#[derive(Default)]
pub struct Registry {
    table: HashMap<(Method, String), RouteDefinition>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a finalized definition. Called exactly once per definition,
    /// during the startup registration phase.
    pub fn register(&mut self, definition: RouteDefinition) -> Result<(), RegistryError> {
        let key = (definition.method().clone(), definition.path().to_string());
        if self.table.contains_key(&key) {
            return Err(RegistryError::Duplicate(key.0, key.1));
        }
        tracing::debug!(
            method = %definition.method(),
            path = %definition.path(),
            guarded = definition.guard_enabled(),
            middleware = definition.middleware().len(),
            "route attached"
        );
        self.table.insert(key, definition);
        Ok(())
    }

    /// Find the definition for an exact (method, path pattern) pair.
    pub fn lookup(&self, method: &Method, path: &str) -> Option<&RouteDefinition> {
        self.table.get(&(method.clone(), path.to_string()))
    }

    pub fn definitions(&self) -> impl Iterator<Item = &RouteDefinition> {
        self.table.values()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
