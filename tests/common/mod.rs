//! Shared fixtures for the integration suite: a real server on an ephemeral
//! port plus token minting for guarded routes.
#![allow(dead_code)]

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::json;
use switchboard::{HttpServer, Registry, ServiceConfig, Shutdown};

/// Signing secret every test server is configured with.
pub const TEST_SECRET: &str = "integration-test-secret";

/// A running server torn down when the fixture drops.
pub struct TestServer {
    base_url: String,
    shutdown: Shutdown,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Spawn a server with default configuration (plus the test secret)
    /// serving the given routes.
    pub async fn spawn(registry: Registry) -> Self {
        let mut config = ServiceConfig::default();
        config.guard.secret = TEST_SECRET.into();
        Self::spawn_with_config(config, registry).await
    }

    pub async fn spawn_with_config(config: ServiceConfig, registry: Registry) -> Self {
        let server = HttpServer::new(config, registry).expect("server should build");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("ephemeral port should bind");
        let addr = listener.local_addr().expect("listener has an address");

        let shutdown = Shutdown::new();
        let signal = shutdown.subscribe();
        let handle = tokio::spawn(async move {
            server
                .run(listener, signal)
                .await
                .expect("server should run until shutdown");
        });

        Self {
            base_url: format!("http://{addr}"),
            shutdown,
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
        self.handle.abort();
    }
}

/// Mint an HS256 token the test server's guard accepts.
pub fn mint_token() -> String {
    mint_token_with_secret(TEST_SECRET)
}

pub fn mint_token_with_secret(secret: &str) -> String {
    let exp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock after epoch")
        .as_secs()
        + 600;
    encode(
        &Header::new(Algorithm::HS256),
        &json!({"sub": "integration-tester", "exp": exp}),
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("token should encode")
}
