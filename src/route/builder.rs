//! Incremental composition of a route's behavior.
//!
//! Each step is independent and order-insensitive except for the documented
//! middleware accumulation contract. `method_and_path` consumes the builder,
//! so a definition cannot be finalized twice, and an unfinalized builder is
//! simply dropped without reaching the registry.

use std::sync::Arc;

use axum::http::Method;

use crate::dispatch::{HandlerFactory, Middleware};
use crate::validation::{self, Schema};

/// Finalized description of how one (method, path) pair is handled.
///
/// Immutable once built; owned by the [`Registry`](crate::route::Registry)
/// after registration.
#[derive(Clone)]
pub struct RouteDefinition {
    method: Method,
    path: String,
    guard_enabled: bool,
    middleware: Vec<Arc<dyn Middleware>>,
    response_status: u16,
    factory: HandlerFactory,
}

impl RouteDefinition {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn guard_enabled(&self) -> bool {
        self.guard_enabled
    }

    /// Middleware in execution order (front runs first).
    pub fn middleware(&self) -> &[Arc<dyn Middleware>] {
        &self.middleware
    }

    pub fn response_status(&self) -> u16 {
        self.response_status
    }

    pub fn handler_factory(&self) -> &HandlerFactory {
        &self.factory
    }
}

impl std::fmt::Debug for RouteDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteDefinition")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("guard_enabled", &self.guard_enabled)
            .field("middleware", &self.middleware.len())
            .field("response_status", &self.response_status)
            .finish()
    }
}

/// Accumulates a route's behavior through composable steps.
///
/// # Middleware ordering contract
///
/// Every `middleware` / `middleware_stack` call PREPENDS to the accumulated
/// sequence, and the sequence executes front-to-back. So the step applied
/// last runs first:
///
/// ```text
/// RouteBuilder::handler(h).middleware(a).middleware(b)
///     → sequence [b, a] → b runs, then a, then the handler
/// ```
///
/// The validation adapter is an exception: it always runs before every other
/// middleware, regardless of when `validate` was applied.
pub struct RouteBuilder {
    guard_enabled: bool,
    response_status: u16,
    middleware: Vec<Arc<dyn Middleware>>,
    validation: Option<Arc<dyn Middleware>>,
    factory: HandlerFactory,
}

impl RouteBuilder {
    /// Start a definition from its handler factory. Successful responses
    /// default to status 200.
    pub fn handler(factory: HandlerFactory) -> Self {
        Self {
            guard_enabled: false,
            response_status: 200,
            middleware: Vec::new(),
            validation: None,
            factory,
        }
    }

    /// Require a valid signed token before anything else runs. Idempotent.
    #[must_use]
    pub fn guard(mut self) -> Self {
        self.guard_enabled = true;
        self
    }

    /// Override the success response status. Last write wins.
    #[must_use]
    pub fn response_status(mut self, code: u16) -> Self {
        self.response_status = code;
        self
    }

    /// Prepend one middleware to the accumulated sequence.
    #[must_use]
    pub fn middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middleware.insert(0, middleware);
        self
    }

    /// Prepend a group of middleware, preserving the group's internal order
    /// and the relative order of everything already accumulated.
    #[must_use]
    pub fn middleware_stack(mut self, stack: Vec<Arc<dyn Middleware>>) -> Self {
        self.middleware.splice(0..0, stack);
        self
    }

    /// Reject request bodies that do not satisfy `S` before any other
    /// middleware runs. The first violated field becomes a 400 whose message
    /// has its first character upper-cased.
    #[must_use]
    pub fn validate<S>(mut self) -> Self
    where
        S: Schema + Send + 'static,
    {
        self.validation = Some(validation::adapter::<S>());
        self
    }

    /// Finalizing step: reads the fully accumulated state and produces the
    /// immutable definition. Must be applied exactly once, after all other
    /// steps; the move semantics enforce "at most once".
    #[must_use]
    pub fn method_and_path(self, method: Method, path: impl Into<String>) -> RouteDefinition {
        let mut middleware = self.middleware;
        if let Some(adapter) = self.validation {
            middleware.insert(0, adapter);
        }
        RouteDefinition {
            method,
            path: path.into(),
            guard_enabled: self.guard_enabled,
            middleware,
            response_status: self.response_status,
            factory: self.factory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{handler_fn, middleware_fn, Flow};
    use serde::Deserialize;
    use serde_json::json;

    fn noop_factory() -> HandlerFactory {
        handler_fn(|_req, res| async move { Ok((res, json!(null))) })
    }

    fn noop_middleware() -> Arc<dyn Middleware> {
        middleware_fn(|_req, res| async move { Ok((res, Flow::Continue)) })
    }

    #[derive(Deserialize)]
    struct Anything {}

    impl Schema for Anything {
        fn check(&self) -> Result<(), crate::validation::Violation> {
            Ok(())
        }
    }

    #[test]
    fn defaults_are_plain_unguarded_200() {
        let def = RouteBuilder::handler(noop_factory()).method_and_path(Method::GET, "/ping");
        assert_eq!(def.method(), &Method::GET);
        assert_eq!(def.path(), "/ping");
        assert!(!def.guard_enabled());
        assert_eq!(def.response_status(), 200);
        assert!(def.middleware().is_empty());
    }

    #[test]
    fn guard_is_idempotent_and_status_last_write_wins() {
        let def = RouteBuilder::handler(noop_factory())
            .guard()
            .guard()
            .response_status(202)
            .response_status(201)
            .method_and_path(Method::POST, "/things");
        assert!(def.guard_enabled());
        assert_eq!(def.response_status(), 201);
    }

    #[test]
    fn middleware_count_accumulates() {
        let def = RouteBuilder::handler(noop_factory())
            .middleware(noop_middleware())
            .middleware_stack(vec![noop_middleware(), noop_middleware()])
            .method_and_path(Method::GET, "/x");
        assert_eq!(def.middleware().len(), 3);
    }

    #[test]
    fn validation_adapter_lands_at_the_front() {
        let def = RouteBuilder::handler(noop_factory())
            .validate::<Anything>()
            .middleware(noop_middleware())
            .method_and_path(Method::POST, "/x");
        // adapter + one middleware; ordering itself is pinned behaviorally in
        // the integration suite
        assert_eq!(def.middleware().len(), 2);
    }
}
