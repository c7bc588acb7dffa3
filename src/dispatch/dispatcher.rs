//! Per-request execution of a matched route definition.
//!
//! # Responsibilities
//! - Look up the route definition for (method, path pattern)
//! - Run guard → middleware chain → handler, in that order
//! - Write exactly one response per request
//! - Hand every failure to the error normalizer
//!
//! # Design Decisions
//! - The guard runs before anything else; a rejected token means no
//!   middleware and no handler execute
//! - A middleware may end the chain early with `Flow::Complete`
//! - Error bodies are never serialized here; the normalizer owns that

use std::sync::Arc;
use std::time::Instant;

use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;

use crate::dispatch::context::{Flow, RequestContext, ResponseContext};
use crate::errors::{ErrorNormalizer, Exception};
use crate::guard::TokenGuard;
use crate::observability::metrics;
use crate::route::Registry;

/// Drives one request through its matched route definition.
pub struct Dispatcher {
    registry: Arc<Registry>,
    guard: TokenGuard,
    normalizer: ErrorNormalizer,
}

impl Dispatcher {
    pub fn new(registry: Arc<Registry>, guard: TokenGuard, normalizer: ErrorNormalizer) -> Self {
        Self {
            registry,
            guard,
            normalizer,
        }
    }

    /// Execute one request. Always produces a response.
    pub async fn dispatch(&self, method: Method, pattern: &str, ctx: RequestContext) -> Response {
        let started = Instant::now();
        let response = match self.run(&method, pattern, ctx).await {
            Ok(response) => response,
            Err(failure) => self.normalizer.resolve(failure),
        };
        metrics::record_dispatch(method.as_str(), response.status().as_u16(), started);
        response
    }

    /// Resolve a failure detected before dispatch could start (unmatched
    /// route, unreadable body). Still exactly one response.
    pub fn reject(&self, exception: Exception) -> Response {
        self.normalizer.resolve_exception(exception)
    }

    async fn run(
        &self,
        method: &Method,
        pattern: &str,
        mut ctx: RequestContext,
    ) -> Result<Response, anyhow::Error> {
        let Some(def) = self.registry.lookup(method, pattern) else {
            return Err(anyhow::Error::new(
                Exception::not_found().with_message(format!("Cannot find {}", ctx.original_url)),
            ));
        };

        if def.guard_enabled() {
            let claims = self.guard.verify(&ctx.headers).map_err(anyhow::Error::new)?;
            ctx.claims = Some(claims);
        }

        let req = Arc::new(ctx);
        let mut res = ResponseContext::new();

        for middleware in def.middleware() {
            let (next_res, flow) = middleware
                .call(Arc::clone(&req), res)
                .await
                .map_err(anyhow::Error::new)?;
            res = next_res;
            if let Flow::Complete(done) = flow {
                return Ok(write_response(res, done.status, done.body));
            }
        }

        let handler = (def.handler_factory())();
        let (res, value) = handler
            .handle(Arc::clone(&req), res)
            .await
            .map_err(anyhow::Error::new)?;

        Ok(write_response(res, def.response_status(), value))
    }
}

/// Materialize the transport response from the accumulated ResponseContext.
///
/// A redirect wins over a body; a runtime status override wins over the
/// route's configured status. Invalid header names or values set along the
/// chain are dropped rather than failing the response.
pub(crate) fn write_response(res: ResponseContext, fallback_status: u16, body: Value) -> Response {
    let mut response = match res.redirect_target() {
        Some(location) => {
            let status = res
                .status_override()
                .filter(|code| (300..400).contains(code))
                .unwrap_or(302);
            let mut redirect = status_code(status).into_response();
            if let Ok(value) = HeaderValue::from_str(location) {
                redirect
                    .headers_mut()
                    .insert(axum::http::header::LOCATION, value);
            }
            redirect
        }
        None => {
            let status = res.status_override().unwrap_or(fallback_status);
            (status_code(status), Json(body)).into_response()
        }
    };

    for (name, value) in res.headers() {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            response.headers_mut().insert(name, value);
        }
    }
    for cookie in res.cookies() {
        if let Ok(value) = HeaderValue::from_str(cookie) {
            response
                .headers_mut()
                .append(axum::http::header::SET_COOKIE, value);
        }
    }

    response
}

fn status_code(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn write_uses_fallback_status_and_chain_headers() {
        let mut res = ResponseContext::new();
        res.set_header("X-Example", "yes");
        res.set_cookie("session", "abc");
        let response = write_response(res, 201, json!({"ok": true}));
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers().get("X-Example").unwrap(), "yes");
        assert!(response
            .headers()
            .get(axum::http::header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("session=abc"));
    }

    #[test]
    fn runtime_status_override_wins() {
        let mut res = ResponseContext::new();
        res.set_status(202);
        let response = write_response(res, 200, json!(null));
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[test]
    fn redirect_wins_over_body() {
        let mut res = ResponseContext::new();
        res.redirect("/elsewhere");
        let response = write_response(res, 200, json!({"ignored": true}));
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(axum::http::header::LOCATION).unwrap(),
            "/elsewhere"
        );
    }

    #[test]
    fn redirect_respects_3xx_override_only() {
        let mut res = ResponseContext::new();
        res.redirect("/moved");
        res.set_status(308);
        let response = write_response(res, 200, json!(null));
        assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);

        let mut res = ResponseContext::new();
        res.redirect("/moved");
        res.set_status(201);
        let response = write_response(res, 200, json!(null));
        assert_eq!(response.status(), StatusCode::FOUND);
    }
}
