//! HTTP server setup.
//!
//! # Responsibilities
//! - Build the axum Router from a sealed Registry
//! - Register the fixed endpoints (health check, root, 404 fallback)
//! - Wire up middleware layers (tracing, timeout, request id)
//! - Project transport requests into RequestContexts for the dispatcher
//! - Serve with graceful shutdown
//!
//! # Startup ordering
//! `HttpServer::new` consumes the fully populated Registry, so every route
//! is registered before `run` can bind the listener. A request can never
//! observe a half-populated table.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, RawPathParams, Request},
    http::{Method, StatusCode},
    response::Response,
    routing::{any, get, on, MethodFilter},
    Router,
};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServiceConfig;
use crate::dispatch::context::{parse_cookies, parse_query};
use crate::dispatch::{Dispatcher, RequestContext};
use crate::errors::{ErrorNormalizer, Exception};
use crate::guard::TokenGuard;
use crate::http::request::RequestIdLayer;
use crate::route::Registry;

/// Largest request body the dispatcher will buffer.
const BODY_LIMIT: usize = 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("cannot route HTTP method {0}")]
    UnsupportedMethod(Method),
}

/// HTTP server binding the sealed registry to the axum transport.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Build the server from configuration and a fully populated registry.
    pub fn new(config: ServiceConfig, registry: Registry) -> Result<Self, ServerError> {
        if registry.is_empty() {
            tracing::warn!("no routes registered; only fixed endpoints will respond");
        }
        let registry = Arc::new(registry);
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&registry),
            TokenGuard::new(&config.guard),
            ErrorNormalizer::new(&config.reporting),
        ));
        let router = build_router(&config, &registry, dispatcher)?;
        Ok(Self { router, config })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The composed router, mainly for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until the
    /// shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the axum router: fixed endpoints, one route per definition, the
/// 404 fallback, and the middleware layers.
fn build_router(
    config: &ServiceConfig,
    registry: &Arc<Registry>,
    dispatcher: Arc<Dispatcher>,
) -> Result<Router, ServerError> {
    let mut router = Router::new()
        .route("/health-check", get(health_check))
        .route("/", any(root));

    for def in registry.definitions() {
        let filter = MethodFilter::try_from(def.method().clone())
            .map_err(|_| ServerError::UnsupportedMethod(def.method().clone()))?;
        let method = def.method().clone();
        let pattern = def.path().to_string();
        let dispatcher = Arc::clone(&dispatcher);

        let entry = move |params: RawPathParams, request: Request| {
            let dispatcher = Arc::clone(&dispatcher);
            let method = method.clone();
            let pattern = pattern.clone();
            async move {
                match build_request_context(&pattern, &params, request).await {
                    Ok(ctx) => dispatcher.dispatch(method, &pattern, ctx).await,
                    Err(exception) => dispatcher.reject(exception),
                }
            }
        };
        router = router.route(def.path(), on(filter, entry));
    }

    let fallback_dispatcher = Arc::clone(&dispatcher);
    let router = router.fallback(move |request: Request| {
        let dispatcher = Arc::clone(&fallback_dispatcher);
        async move { not_found(&dispatcher, &request) }
    });

    Ok(router
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.timeouts.request_secs,
        )))
        .layer(RequestIdLayer)
        .layer(TraceLayer::new_for_http()))
}

/// Health check endpoint for load balancers: 200 with an empty body.
async fn health_check() {}

/// Root and prefix catch-all: a successful response with no content, so
/// probes against `/` do not pollute the error logs.
async fn root() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Unmatched path: synthesize the NotFound exception carrying the original
/// URL and let the normalizer shape the response.
fn not_found(dispatcher: &Dispatcher, request: &Request) -> Response {
    let original_url = request
        .uri()
        .path_and_query()
        .map(|pq| pq.to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    dispatcher.reject(Exception::not_found().with_message(format!("Cannot find {original_url}")))
}

/// Whether a body read failed because the size limit was hit, anywhere in
/// the error chain.
fn is_length_limit(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut source = Some(err);
    while let Some(e) = source {
        if e.is::<http_body_util::LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}

/// Project the transport request into the dispatcher's value object.
async fn build_request_context(
    pattern: &str,
    params: &RawPathParams,
    request: Request,
) -> Result<RequestContext, Exception> {
    let (parts, body) = request.into_parts();

    let client_ip = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip());
    let original_url = parts
        .uri
        .path_and_query()
        .map(|pq| pq.to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());

    let bytes = axum::body::to_bytes(body, BODY_LIMIT).await.map_err(|e| {
        if is_length_limit(&e) {
            Exception::payload_too_large().with_cause(e.into())
        } else {
            Exception::bad_request()
                .with_message("Unreadable request body")
                .with_cause(e.into())
        }
    })?;
    let body: Value = if bytes.is_empty() {
        Value::Object(serde_json::Map::new())
    } else {
        serde_json::from_slice(&bytes).map_err(|e| {
            Exception::bad_request()
                .with_message("Invalid JSON payload")
                .with_cause(e.into())
        })?
    };

    let cookies = parse_cookies(&parts.headers);
    Ok(RequestContext {
        method: parts.method,
        path: pattern.to_string(),
        original_url,
        body,
        params: params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        query: parse_query(parts.uri.query()),
        headers: parts.headers,
        cookies,
        claims: None,
        client_ip,
    })
}
