//! Error normalization and reporting.
//!
//! # Responsibilities
//! - Classify: taxonomy members pass through unchanged
//! - Coerce: foreign failures with a plausible status hint become taxonomy
//!   members; everything else collapses to 500
//! - Deliver: report non-ignored statuses, then write the uniform body
//!
//! # Design Decisions
//! - Linear pipeline, no retries; this component never fails
//! - Ignore list keeps expected client errors and redirects out of telemetry
//! - The client body is always `{name, status, message}`, never the cause

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::config::ReportingConfig;
use crate::errors::taxonomy::Exception;
use crate::observability::metrics;

/// Interop seam for failures that carry an HTTP status without being part of
/// the taxonomy. Transport adapters and embedders can wrap such errors in
/// this type; the coercion stage probes the cause chain for it.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct StatusHint {
    pub status: u16,
    pub message: String,
}

/// A status is plausible when it has three digits outside the reserved
/// 0xx and 6xx ranges.
fn plausible_status(status: u16) -> bool {
    matches!(status, 100..=599 | 700..=999)
}

/// Collapse any failure into a taxonomy member.
///
/// Stage A: an `Exception` passes through unchanged. Stage B: anything else
/// is probed for a [`StatusHint`]; a plausible hint keeps its status and
/// message, otherwise the failure becomes a 500 carrying its own message.
/// Either way the original failure is retained as the cause.
pub fn normalize(failure: anyhow::Error) -> Exception {
    match failure.downcast::<Exception>() {
        Ok(exception) => exception,
        Err(other) => {
            let hint = other
                .chain()
                .find_map(|e| e.downcast_ref::<StatusHint>())
                .filter(|h| plausible_status(h.status))
                .map(|h| (h.status, h.message.clone()));
            match hint {
                Some((status, message)) => {
                    Exception::for_status(status, message).with_cause(other)
                }
                None => {
                    let message = other.to_string();
                    Exception::internal_server_error()
                        .with_message(message)
                        .with_cause(other)
                }
            }
        }
    }
}

/// Terminal stage of every failed dispatch: decides reporting and writes the
/// client-visible error body.
#[derive(Debug, Clone)]
pub struct ErrorNormalizer {
    ignore_codes: Vec<u16>,
}

impl ErrorNormalizer {
    pub fn new(reporting: &ReportingConfig) -> Self {
        Self {
            ignore_codes: reporting.ignore_codes.clone(),
        }
    }

    /// Resolve an arbitrary failure into the final error response.
    pub fn resolve(&self, failure: anyhow::Error) -> Response {
        self.resolve_exception(normalize(failure))
    }

    /// Resolve an already-classified exception into the final error response.
    pub fn resolve_exception(&self, exception: Exception) -> Response {
        self.report(&exception);
        render(&exception)
    }

    /// Whether a failure with this status is forwarded to telemetry.
    pub fn should_report(&self, status: u16) -> bool {
        !self.ignore_codes.contains(&status)
    }

    fn report(&self, exception: &Exception) {
        if !self.should_report(exception.status()) {
            return;
        }
        metrics::record_reported_error(exception.status());
        tracing::error!(
            status = exception.status(),
            name = %exception.name(),
            message = %exception.message(),
            cause = ?std::error::Error::source(exception),
            "request failed"
        );
    }
}

/// Serialize the uniform client-visible error body.
fn render(exception: &Exception) -> Response {
    let status = StatusCode::from_u16(exception.status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = json!({
        "name": exception.name(),
        "status": exception.status(),
        "message": exception.message(),
    });
    (status, Json(body)).into_response()
}
