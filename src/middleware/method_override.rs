//! HTML-form method spoofing.
//!
//! Browsers only submit `GET` and `POST`. A form that means `PUT`, `PATCH`
//! or `DELETE` sends `POST` with a hidden `_method` field; this stage
//! rewrites the request method before routing.

use tracing::debug;

use crate::method::Method;
use crate::request::Request;

/// Form field carrying the intended method.
pub const METHOD_FIELD: &str = "_method";

/// Rewrites `req.method` when it is a urlencoded `POST` with a valid
/// `_method` field. Returns the new method if one was applied.
pub fn apply(req: &mut Request) -> Option<Method> {
    if req.method != Method::Post || !req.is_form() {
        return None;
    }
    let requested = req.form_value(METHOD_FIELD)?;
    let method = requested.to_ascii_uppercase().parse::<Method>().ok()?;
    if !method.is_overridable() {
        return None;
    }
    debug!(path = req.path(), %method, "method override");
    req.method = method;
    Some(method)
}
