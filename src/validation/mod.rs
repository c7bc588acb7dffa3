//! Request body validation adapter.
//!
//! The constraint rules themselves live on schema types supplied by route
//! authors; this module only adapts them into the middleware chain. The
//! adapter shapes the JSON body into the schema, asks it for the first
//! violated field, and turns that into a 400 with the violation message
//! capitalized. It always runs ahead of every other middleware on the route.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::dispatch::{middleware_fn, Flow, Middleware, RequestContext, ResponseContext};
use crate::errors::Exception;

/// A single violated constraint. Only the first violation per request is
/// ever surfaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

impl Violation {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Field-level constraints for a request body.
///
/// The deserialized value doubles as the request's typed body shape, so
/// schemas usually declare every field as `Option` and let `check` decide
/// what is required.
pub trait Schema: DeserializeOwned {
    /// Return the first violated field, if any.
    fn check(&self) -> Result<(), Violation>;
}

/// Build the validation middleware for a schema type.
pub(crate) fn adapter<S>() -> Arc<dyn Middleware>
where
    S: Schema + Send + 'static,
{
    middleware_fn(
        move |req: Arc<RequestContext>, res: ResponseContext| async move {
            let shaped: S = match serde_json::from_value(req.body.clone()) {
                Ok(shaped) => shaped,
                Err(_) => {
                    return Err(Exception::bad_request()
                        .with_message("Looks like something is missing. Please try again."));
                }
            };
            if let Err(violation) = shaped.check() {
                return Err(
                    Exception::bad_request().with_message(capitalise_first(&violation.message))
                );
            }
            Ok((res, Flow::Continue))
        },
    )
}

/// Make the first letter of a string uppercase. Constraint messages tend to
/// start with the lowercase field name.
fn capitalise_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn capitalises_only_the_first_character() {
        assert_eq!(capitalise_first("name is required"), "Name is required");
        assert_eq!(capitalise_first("Name is required"), "Name is required");
        assert_eq!(capitalise_first(""), "");
    }

    #[derive(Deserialize)]
    struct Signup {
        name: Option<String>,
        email: Option<String>,
    }

    impl Schema for Signup {
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

    #[test]
    fn first_violation_wins() {
        let empty: Signup = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(empty.check().unwrap_err().field, "name");

        let named: Signup =
            serde_json::from_value(serde_json::json!({"name": "Ada"})).unwrap();
        assert_eq!(named.check().unwrap_err().field, "email");

        let complete: Signup =
            serde_json::from_value(serde_json::json!({"name": "Ada", "email": "ada@example.com"}))
                .unwrap();
        assert!(complete.check().is_ok());
    }
}
