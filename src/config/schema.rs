//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Token guard settings for guarded routes.
    pub guard: GuardConfig,

    /// Error reporting settings.
    pub reporting: ReportingConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:7050").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:7050".to_string(),
        }
    }
}

/// Token guard configuration for guarded routes.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GuardConfig {
    /// HS256 signing secret used to verify bearer tokens.
    pub secret: String,

    /// Expected audience claim. Not checked when absent.
    pub audience: Option<String>,

    /// Expected issuer claim. Not checked when absent.
    pub issuer: Option<String>,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            audience: None,
            issuer: None,
        }
    }
}

/// Error reporting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportingConfig {
    /// Statuses that are never forwarded to telemetry. Redirects and common
    /// client errors by default.
    pub ignore_codes: Vec<u16>,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            ignore_codes: vec![301, 307, 308, 401, 402, 403, 404, 405, 409, 418, 422],
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole-request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Whether to expose a Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Address for the metrics endpoint.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
