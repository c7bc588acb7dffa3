//! Demo service: the users resource wired through the composition layer.
//!
//! Routes are enumerated statically here and registered before the listener
//! binds; there is no runtime discovery.

use std::path::PathBuf;
use std::sync::Arc;

use axum::http::Method;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use switchboard::dispatch::{HandlerResult, MiddlewareResult};
use switchboard::route::RegistryError;
use switchboard::{
    handler_fn, middleware_fn, Flow, HttpServer, Registry, RequestContext, ResponseContext,
    RouteBuilder, Schema, ServiceConfig, Shutdown, Violation,
};

/// Validation rules for `POST /users`. Fields are optional at the serde
/// level so presence is checked (and messaged) by `check`.
#[derive(Debug, Deserialize)]
struct CreateUser {
    name: Option<String>,
    email: Option<String>,
}

impl Schema for CreateUser {
    fn check(&self) -> Result<(), Violation> {
        if self.name.is_none() {
            return Err(Violation::new("name", "name is required"));
        }
        match &self.email {
            None => Err(Violation::new("email", "email is required")),
            Some(email) if !email.contains('@') => {
                Err(Violation::new("email", "email must be an email"))
            }
            Some(_) => Ok(()),
        }
    }
}

async fn create_user(req: Arc<RequestContext>, res: ResponseContext) -> HandlerResult {
    let body = json!({
        "id": Uuid::new_v4(),
        "name": req.body["name"],
        "email": req.body["email"],
    });
    Ok((res, body))
}

async fn get_user(req: Arc<RequestContext>, res: ResponseContext) -> HandlerResult {
    let id = req.params.get("id").cloned().unwrap_or_default();
    let body = json!({
        "id": id,
        "name": "Example",
        "email": "example@example.com",
    });
    Ok((res, body))
}

/// Example middleware: stamp a header on the response and pass control on.
async fn example_header(_req: Arc<RequestContext>, mut res: ResponseContext) -> MiddlewareResult {
    res.set_header("ExampleHeader", "Example arg setting header");
    Ok((res, Flow::Continue))
}

/// The statically enumerated registration list.
fn routes() -> Result<Registry, RegistryError> {
    let mut registry = Registry::new();

    registry.register(
        RouteBuilder::handler(handler_fn(create_user))
            .middleware(middleware_fn(example_header))
            .validate::<CreateUser>()
            .response_status(201)
            .guard()
            .method_and_path(Method::POST, "/users"),
    )?;

    registry.register(
        RouteBuilder::handler(handler_fn(get_user)).method_and_path(Method::GET, "/users/{id}"),
    )?;

    Ok(registry)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    switchboard::observability::logging::init();

    let config = match std::env::var("SWITCHBOARD_CONFIG") {
        Ok(path) => switchboard::config::load_config(&PathBuf::from(path))?,
        Err(_) => {
            tracing::warn!("SWITCHBOARD_CONFIG not set; using built-in defaults");
            ServiceConfig::default()
        }
    };

    if config.guard.secret.is_empty() {
        tracing::warn!("guard secret is empty; guarded routes will reject every token");
    }

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            switchboard::observability::metrics::init_metrics(addr);
        }
    }

    // Every route is registered before the listener binds.
    let registry = routes()?;
    tracing::info!(routes = registry.len(), "route registration complete");

    let server = HttpServer::new(config, registry)?;
    let listener = tokio::net::TcpListener::bind(&server.config().listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "listening for connections");

    let shutdown = Shutdown::new();
    shutdown.listen_for_ctrl_c();
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("shutdown complete");
    Ok(())
}
