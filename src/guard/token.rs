//! HS256 bearer token verification.

use axum::http::{header, HeaderMap};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde_json::Value;

use crate::config::GuardConfig;
use crate::errors::Exception;

/// Verifies bearer tokens for guarded routes.
///
/// Built once at startup from [`GuardConfig`] and shared read-only across
/// request tasks.
#[derive(Clone)]
pub struct TokenGuard {
    key: DecodingKey,
    validation: Validation,
}

impl TokenGuard {
    pub fn new(config: &GuardConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(audience) = &config.audience {
            validation.set_audience(&[audience]);
        }
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }
        Self {
            key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }

    /// Verify the bearer token on a request and return its claims.
    ///
    /// Missing header, wrong scheme, bad signature, expired token, or an
    /// audience/issuer mismatch all yield 401.
    pub fn verify(&self, headers: &HeaderMap) -> Result<Value, Exception> {
        let token = extract_bearer(headers)?;
        let data = jsonwebtoken::decode::<Value>(token, &self.key, &self.validation)
            .map_err(|e| {
                Exception::unauthorized()
                    .with_message("Invalid or expired token")
                    .with_cause(e.into())
            })?;
        Ok(data.claims)
    }
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, Exception> {
    let header = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| Exception::unauthorized().with_message("Missing bearer token"))?;

    let header = header
        .to_str()
        .map_err(|_| Exception::unauthorized().with_message("Missing bearer token"))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| Exception::unauthorized().with_message("Missing bearer token"))?
        .trim();

    if token.is_empty() {
        return Err(Exception::unauthorized().with_message("Missing bearer token"));
    }

    Ok(token)
}
