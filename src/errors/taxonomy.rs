//! Status-bearing exception values.
//!
//! One constructor per supported HTTP status, each with a default name and
//! message. Both are overridable, and an arbitrary wrapped cause can be
//! attached for server-side diagnostics. Instances are immutable after
//! construction and flow one-directionally toward the normalizer.

use std::borrow::Cow;
use std::fmt;

/// An HTTP-status-bearing error raised anywhere during dispatch.
///
/// The `cause` never reaches clients; it exists so the reporter can log the
/// full chain server-side.
#[derive(Debug)]
pub struct Exception {
    status: u16,
    name: Cow<'static, str>,
    message: String,
    cause: Option<anyhow::Error>,
}

macro_rules! taxonomy {
    ($($fn_name:ident => $status:literal, $name:literal, $message:literal;)+) => {
        /// Default (status, name, message) for every taxonomy member.
        pub(crate) const TAXONOMY: &[(u16, &str, &str)] = &[$(($status, $name, $message)),+];

        impl Exception {
            $(
                #[doc = concat!($name, " (", stringify!($status), ").")]
                pub fn $fn_name() -> Self {
                    Self {
                        status: $status,
                        name: Cow::Borrowed($name),
                        message: String::from($message),
                        cause: None,
                    }
                }
            )+
        }
    };
}

taxonomy! {
    moved_permanently => 301, "MovedPermanently", "Moved Permanently";
    temporary_redirect => 307, "TemporaryRedirect", "Temporary Redirect";
    permanent_redirect => 308, "PermanentRedirect", "Permanent Redirect";
    bad_request => 400, "BadRequest", "Bad Request";
    unauthorized => 401, "Unauthorized", "Unauthorized";
    payment_required => 402, "PaymentRequired", "Payment Required";
    forbidden => 403, "Forbidden", "Forbidden";
    not_found => 404, "NotFound", "Not Found";
    method_not_allowed => 405, "MethodNotAllowed", "Method Not Allowed";
    not_acceptable => 406, "NotAcceptable", "Not Acceptable";
    request_timeout => 408, "RequestTimeout", "Request Timeout";
    conflict => 409, "Conflict", "Conflict";
    gone => 410, "Gone", "Gone";
    length_required => 411, "LengthRequired", "Length Required";
    precondition_failed => 412, "PreconditionFailed", "Precondition Failed";
    payload_too_large => 413, "PayloadTooLarge", "Payload Too Large";
    uri_too_long => 414, "UriTooLong", "URI Too Long";
    im_a_teapot => 418, "ImATeapot", "I'm a Teapot";
    unprocessable_entity => 422, "UnprocessableEntity", "Unprocessable Entity";
    too_many_requests => 429, "TooManyRequests", "Too Many Requests";
    internal_server_error => 500, "InternalServerError", "Oops! Something went wrong.";
    not_implemented => 501, "NotImplemented", "Not Implemented";
    bad_gateway => 502, "BadGateway", "Bad Gateway";
    service_unavailable => 503, "ServiceUnavailable", "Service Unavailable";
    gateway_timeout => 504, "GatewayTimeout", "Gateway Timeout";
    bandwidth_limit_exceeded => 509, "BandwidthLimitExceeded", "Bandwidth Limit Exceeded";
}

impl Exception {
    /// Build an exception for an arbitrary status with the given message.
    ///
    /// Taxonomy members keep their default name; anything else gets the
    /// generic name `Error`.
    pub fn for_status(status: u16, message: impl Into<String>) -> Self {
        let name = TAXONOMY
            .iter()
            .find(|(s, _, _)| *s == status)
            .map(|(_, n, _)| Cow::Borrowed(*n))
            .unwrap_or(Cow::Borrowed("Error"));
        Self {
            status,
            name,
            message: message.into(),
            cause: None,
        }
    }

    /// Replace the default message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Replace the default name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Cow::Owned(name.into());
        self
    }

    /// Attach the underlying failure for server-side diagnostics.
    #[must_use]
    pub fn with_cause(mut self, cause: anyhow::Error) -> Self {
        self.cause = Some(cause);
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.name, self.status, self.message)
    }
}

impl std::error::Error for Exception {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn constructors_carry_defaults() {
        let ex = Exception::not_found();
        assert_eq!(ex.status(), 404);
        assert_eq!(ex.name(), "NotFound");
        assert_eq!(ex.message(), "Not Found");

        let ex = Exception::internal_server_error();
        assert_eq!(ex.status(), 500);
        assert_eq!(ex.message(), "Oops! Something went wrong.");
    }

    #[test]
    fn message_and_name_are_overridable() {
        let ex = Exception::conflict()
            .with_message("My custom conflict message")
            .with_name("DoubleBooking");
        assert_eq!(ex.status(), 409);
        assert_eq!(ex.name(), "DoubleBooking");
        assert_eq!(ex.message(), "My custom conflict message");
    }

    #[test]
    fn for_status_resolves_taxonomy_names() {
        let ex = Exception::for_status(418, "short and stout");
        assert_eq!(ex.name(), "ImATeapot");

        let ex = Exception::for_status(299, "odd but plausible");
        assert_eq!(ex.name(), "Error");
    }

    #[test]
    fn cause_is_exposed_as_source() {
        let ex = Exception::bad_gateway().with_cause(anyhow::anyhow!("connection reset"));
        assert_eq!(ex.source().unwrap().to_string(), "connection reset");
    }
}
