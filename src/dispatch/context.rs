//! Per-request context values and the middleware/handler contracts.
//!
//! `RequestContext` projects the transport request into a plain value object;
//! `ResponseContext` accumulates everything a middleware or handler wants on
//! the eventual response. Both are created fresh per request and discarded at
//! response completion.

use std::collections::HashMap;
use std::future::Future;
use std::net::IpAddr;
use std::pin::Pin;
use std::sync::Arc;

use axum::http::{HeaderMap, Method};
use serde_json::Value;

use crate::errors::Exception;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Request data container, read-only for the lifetime of the request.
#[derive(Debug)]
pub struct RequestContext {
    pub method: Method,
    /// Matched route pattern (e.g. `/users/{id}`).
    pub path: String,
    /// Original request URL as received from the client.
    pub original_url: String,
    /// Parsed JSON body; `{}` when the request carried no body.
    pub body: Value,
    pub params: HashMap<String, String>,
    pub query: HashMap<String, String>,
    pub headers: HeaderMap,
    pub cookies: HashMap<String, String>,
    /// Verified token claims, present only after a guard has run.
    pub claims: Option<Value>,
    pub client_ip: Option<IpAddr>,
}

impl RequestContext {
    /// Look up a request header as a string.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Response data accumulated while the chain runs.
///
/// Headers, cookies, a redirect, or a runtime status override set here are
/// applied when the dispatcher writes the final response.
#[derive(Debug, Default)]
pub struct ResponseContext {
    /// Scratch space shared along the chain (middleware → handler).
    pub locals: HashMap<String, Value>,
    headers: Vec<(String, String)>,
    cookies: Vec<String>,
    status_override: Option<u16>,
    redirect_to: Option<String>,
}

impl ResponseContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    pub fn set_cookie(&mut self, name: &str, value: &str) {
        self.cookies.push(format!("{name}={value}; Path=/"));
    }

    pub fn clear_cookie(&mut self, name: &str) {
        self.cookies.push(format!("{name}=; Max-Age=0; Path=/"));
    }

    /// Redirect the client instead of writing a body. Written as 302 unless
    /// a 3xx status override is also set.
    pub fn redirect(&mut self, location: impl Into<String>) {
        self.redirect_to = Some(location.into());
    }

    /// Override the route's configured response status for this request.
    pub fn set_status(&mut self, code: u16) {
        self.status_override = Some(code);
    }

    pub(crate) fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub(crate) fn cookies(&self) -> &[String] {
        &self.cookies
    }

    pub(crate) fn status_override(&self) -> Option<u16> {
        self.status_override
    }

    pub(crate) fn redirect_target(&self) -> Option<&str> {
        self.redirect_to.as_deref()
    }
}

/// A response completed by a middleware, ending the chain early.
#[derive(Debug)]
pub struct Completed {
    pub status: u16,
    pub body: Value,
}

/// Outcome of one middleware step.
#[derive(Debug)]
pub enum Flow {
    /// Pass control to the next middleware (or the handler).
    Continue,
    /// Stop the chain; the dispatcher writes this response immediately.
    Complete(Completed),
}

pub type MiddlewareResult = Result<(ResponseContext, Flow), Exception>;
pub type HandlerResult = Result<(ResponseContext, Value), Exception>;

/// One link in a route's middleware chain.
///
/// Implemented for any `Fn(Arc<RequestContext>, ResponseContext)` returning a
/// boxed future; use [`middleware_fn`] to wrap plain async functions.
pub trait Middleware: Send + Sync {
    fn call(&self, req: Arc<RequestContext>, res: ResponseContext) -> BoxFuture<MiddlewareResult>;
}

impl<F> Middleware for F
where
    F: Fn(Arc<RequestContext>, ResponseContext) -> BoxFuture<MiddlewareResult> + Send + Sync,
{
    fn call(&self, req: Arc<RequestContext>, res: ResponseContext) -> BoxFuture<MiddlewareResult> {
        self(req, res)
    }
}

/// Wrap an async function as a shareable middleware.
pub fn middleware_fn<F, Fut>(f: F) -> Arc<dyn Middleware>
where
    F: Fn(Arc<RequestContext>, ResponseContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = MiddlewareResult> + Send + 'static,
{
    Arc::new(
        move |req: Arc<RequestContext>, res: ResponseContext| -> BoxFuture<MiddlewareResult> {
            Box::pin(f(req, res))
        },
    )
}

/// A route's terminal handler. A fresh instance is produced per request by
/// the route's [`HandlerFactory`] and holds no state beyond that request.
pub trait Handler: Send + Sync {
    fn handle(&self, req: Arc<RequestContext>, res: ResponseContext) -> BoxFuture<HandlerResult>;
}

impl<F> Handler for F
where
    F: Fn(Arc<RequestContext>, ResponseContext) -> BoxFuture<HandlerResult> + Send + Sync,
{
    fn handle(&self, req: Arc<RequestContext>, res: ResponseContext) -> BoxFuture<HandlerResult> {
        self(req, res)
    }
}

/// Produces a fresh handler instance for each request.
pub type HandlerFactory = Arc<dyn Fn() -> Box<dyn Handler> + Send + Sync>;

/// Wrap an async function as a handler factory.
pub fn handler_fn<F, Fut>(f: F) -> HandlerFactory
where
    F: Fn(Arc<RequestContext>, ResponseContext) -> Fut + Send + Sync + Clone + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(move || {
        let f = f.clone();
        Box::new(
            move |req: Arc<RequestContext>, res: ResponseContext| -> BoxFuture<HandlerResult> {
                Box::pin(f(req, res))
            },
        )
    })
}

/// Parse the `Cookie` header into name/value pairs.
pub(crate) fn parse_cookies(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .get(axum::http::header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(|raw| {
            raw.split(';')
                .filter_map(|pair| {
                    let (name, value) = pair.trim().split_once('=')?;
                    Some((name.to_string(), value.to_string()))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Decode a raw query string into key/value pairs, with the same
/// percent-decoding and `+`-as-space handling as axum's `Query` extractor.
/// Repeated keys keep the last value, matching typical form semantics.
pub(crate) fn parse_query(raw: Option<&str>) -> HashMap<String, String> {
    raw.and_then(|q| serde_urlencoded::from_str(q).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn cookies_parse_from_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static("session=abc123; theme=dark"),
        );
        let cookies = parse_cookies(&headers);
        assert_eq!(cookies.get("session").map(String::as_str), Some("abc123"));
        assert_eq!(cookies.get("theme").map(String::as_str), Some("dark"));
    }

    #[test]
    fn missing_cookie_header_yields_empty_map() {
        assert!(parse_cookies(&HeaderMap::new()).is_empty());
    }

    #[test]
    fn query_string_parses_pairs_and_bare_keys() {
        let query = parse_query(Some("page=2&sort=name&flag"));
        assert_eq!(query.get("page").map(String::as_str), Some("2"));
        assert_eq!(query.get("sort").map(String::as_str), Some("name"));
        assert_eq!(query.get("flag").map(String::as_str), Some(""));
        assert!(parse_query(None).is_empty());
    }

    #[test]
    fn query_values_are_url_decoded() {
        let query = parse_query(Some("q=hello%20world&name=Ada+Lovelace"));
        assert_eq!(query.get("q").map(String::as_str), Some("hello world"));
        assert_eq!(query.get("name").map(String::as_str), Some("Ada Lovelace"));
    }

    #[test]
    fn response_context_accumulates_headers_and_cookies() {
        let mut res = ResponseContext::new();
        res.set_header("X-Example", "1");
        res.set_cookie("session", "abc");
        res.clear_cookie("old");
        res.set_status(204);
        assert_eq!(res.headers().len(), 1);
        assert_eq!(res.cookies().len(), 2);
        assert!(res.cookies()[1].starts_with("old=;"));
        assert_eq!(res.status_override(), Some(204));
    }
}
