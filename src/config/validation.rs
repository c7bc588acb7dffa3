//! Semantic validation of a parsed configuration.

use std::net::SocketAddr;

use crate::config::schema::ServiceConfig;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address is not a valid socket address: {0}")]
    InvalidBindAddress(String),

    #[error("observability.metrics_address is not a valid socket address: {0}")]
    InvalidMetricsAddress(String),

    #[error("reporting.ignore_codes contains an implausible status: {0}")]
    ImplausibleIgnoreCode(u16),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,
}

/// Check everything serde cannot express. Collects all problems rather than
/// stopping at the first.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    for &code in &config.reporting.ignore_codes {
        if !(100..=599).contains(&code) {
            errors.push(ValidationError::ImplausibleIgnoreCode(code));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
