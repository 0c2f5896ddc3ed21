use crate::error::Error;
use crate::request::Request;
use crate::response::Response;

use super::Rejection;

/// Result of one middleware check.
#[derive(Debug)]
pub enum Outcome {
    /// Run the next middleware, then the handler.
    Continue,
    /// Stop with a standard 401/403 rendering.
    Reject(Rejection),
    /// Stop with this exact response.
    Halt(Response),
}

/// A user-defined route middleware, registered by name on the
/// [`RouteBuilder`](crate::RouteBuilder).
///
/// Returning `Err` means the check itself broke (a missing claim, a bad
/// lookup). The router logs it and answers `500`.
///
/// ```rust
/// use kiln::middleware::Outcome;
/// use kiln::{Request, RouteBuilder};
///
/// let mut routes = RouteBuilder::new();
/// routes.policy("verified", |req: &Request| -> Result<Outcome, kiln::Error> {
///     Ok(if req.header("x-verified").is_some() {
///         Outcome::Continue
///     } else {
///         Outcome::Halt(kiln::Response::status(kiln::StatusCode::PRECONDITION_REQUIRED))
///     })
/// });
/// ```
pub trait Policy: Send + Sync + 'static {
    fn check(&self, req: &Request) -> Result<Outcome, Error>;
}

impl<F> Policy for F
where
    F: Fn(&Request) -> Result<Outcome, Error> + Send + Sync + 'static,
{
    fn check(&self, req: &Request) -> Result<Outcome, Error> {
        self(req)
    }
}
