//! Middleware layer.
//!
//! Two kinds of middleware run on every request, in this order:
//!
//! 1. **Global** stages that prepare the request: [`method_override`] and
//!    the [`AuthMiddleware`], which attaches an
//!    [`AuthContext`](crate::auth::AuthContext).
//! 2. **Route** middleware, named by string identifiers on the route or its
//!    groups and evaluated in declaration order. The first one that does not
//!    continue ends the request.
//!
//! Route identifiers:
//!
//! | identifier | passes when | otherwise |
//! |---|---|---|
//! | `"auth"` | request is authenticated | 401 JSON (API) / 302 to login (web) |
//! | registered [`Policy`] name | the policy says so | the policy's response |
//! | any other string | authenticated with exactly that role | as `"auth"` when anonymous, else 403 |

mod auth;
pub mod method_override;
mod policy;

use std::collections::HashMap;
use std::sync::Arc;

use http::StatusCode;
use tracing::debug;

use crate::error::Error;
use crate::request::Request;
use crate::response::Response;

pub use auth::AuthMiddleware;
pub use policy::{Outcome, Policy};

/// Identifier of the authentication middleware.
pub const AUTH: &str = "auth";

// ── Identifier lists ──────────────────────────────────────────────────────────

/// Anything accepted where a middleware list is expected. A single string is
/// a one-element list.
pub trait IntoMiddleware {
    fn into_middleware(self) -> Vec<String>;
}

impl IntoMiddleware for &str {
    fn into_middleware(self) -> Vec<String> { vec![self.to_owned()] }
}

impl IntoMiddleware for String {
    fn into_middleware(self) -> Vec<String> { vec![self] }
}

impl IntoMiddleware for &[&str] {
    fn into_middleware(self) -> Vec<String> { self.iter().map(|s| (*s).to_owned()).collect() }
}

impl<const N: usize> IntoMiddleware for [&str; N] {
    fn into_middleware(self) -> Vec<String> { self.iter().map(|s| (*s).to_owned()).collect() }
}

impl IntoMiddleware for Vec<&str> {
    fn into_middleware(self) -> Vec<String> { self.into_iter().map(str::to_owned).collect() }
}

impl IntoMiddleware for Vec<String> {
    fn into_middleware(self) -> Vec<String> { self }
}

// ── Rejections ────────────────────────────────────────────────────────────────

/// Where failed checks send the client.
#[derive(Debug, Clone)]
pub struct AccessPaths {
    api_prefix: String,
    login_path: String,
}

impl AccessPaths {
    pub fn new(api_prefix: &str, login_path: &str) -> Self {
        Self {
            api_prefix: api_prefix.trim_end_matches('/').to_owned(),
            login_path: login_path.to_owned(),
        }
    }

    /// Whether `path` is under the API prefix (JSON errors instead of pages).
    pub fn is_api(&self, path: &str) -> bool {
        if self.api_prefix.is_empty() {
            return false;
        }
        path.strip_prefix(self.api_prefix.as_str())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }

    /// Login location carrying `path` for the post-login redirect.
    pub fn login_redirect(&self, path: &str) -> String {
        format!("{}?redirect={path}", self.login_path)
    }
}

impl Default for AccessPaths {
    fn default() -> Self {
        Self::new("/api", "/login")
    }
}

/// A failed access check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// No valid session. Recoverable by logging in.
    Unauthorized,
    /// Authenticated, but without the required role.
    Forbidden { role: String },
}

impl Rejection {
    /// Renders the rejection for `req`: JSON on API paths, a redirect or an
    /// HTML page elsewhere.
    pub fn respond(&self, req: &Request, paths: &AccessPaths) -> Response {
        let api = paths.is_api(req.path());
        match self {
            Self::Unauthorized if api => {
                Response::error(StatusCode::UNAUTHORIZED, "Unauthorized", "Authentication required")
            }
            Self::Unauthorized => Response::redirect(&paths.login_redirect(req.path())),
            Self::Forbidden { role } if api => {
                Response::error(StatusCode::FORBIDDEN, "Forbidden", format!("Requires {role} role"))
            }
            Self::Forbidden { role } => Response::builder()
                .status(StatusCode::FORBIDDEN)
                .html(format!("<h1>403 Forbidden</h1>\n<p>Requires {role} role</p>\n")),
        }
    }
}

// ── Resolved route middleware ─────────────────────────────────────────────────

/// A route middleware identifier resolved at build time.
#[derive(Clone)]
pub(crate) enum Middleware {
    Auth,
    Role(String),
    Policy { name: String, policy: Arc<dyn Policy> },
}

impl Middleware {
    pub(crate) fn resolve(id: &str, policies: &HashMap<String, Arc<dyn Policy>>) -> Self {
        if let Some(policy) = policies.get(id) {
            return Self::Policy { name: id.to_owned(), policy: Arc::clone(policy) };
        }
        match id {
            AUTH => Self::Auth,
            role => Self::Role(role.to_owned()),
        }
    }

    pub(crate) fn name(&self) -> &str {
        match self {
            Self::Auth => AUTH,
            Self::Role(role) => role,
            Self::Policy { name, .. } => name,
        }
    }

    pub(crate) fn evaluate(&self, req: &Request) -> Result<Outcome, Error> {
        let auth = req.auth();
        let outcome = match self {
            Self::Auth if auth.authenticated => Outcome::Continue,
            Self::Auth => Outcome::Reject(Rejection::Unauthorized),
            Self::Role(_) if !auth.authenticated => Outcome::Reject(Rejection::Unauthorized),
            Self::Role(role) if auth.has_role(role) => Outcome::Continue,
            Self::Role(role) => Outcome::Reject(Rejection::Forbidden { role: role.clone() }),
            Self::Policy { policy, .. } => policy.check(req)?,
        };
        if !matches!(outcome, Outcome::Continue) {
            debug!(middleware = self.name(), path = req.path(), "request stopped by middleware");
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthContext;
    use crate::method::Method;

    fn as_user(path: &str, role: &str) -> Request {
        let mut req = Request::new(Method::Get, path);
        req.auth = AuthContext {
            authenticated: true,
            user_id: Some(1),
            role: Some(role.to_owned()),
            ..AuthContext::default()
        };
        req
    }

    #[test]
    fn api_prefix_matches_whole_segments() {
        let paths = AccessPaths::new("/api/", "/login");
        assert!(paths.is_api("/api"));
        assert!(paths.is_api("/api/dashboard"));
        assert!(!paths.is_api("/apiary"));
        assert!(!paths.is_api("/dashboard"));
        assert!(!AccessPaths::new("", "/login").is_api("/api/x"));
    }

    #[test]
    fn role_checks_distinguish_anonymous_from_wrong_role() {
        let admin = Middleware::Role("admin".into());
        let anon = Request::new(Method::Get, "/admin");
        assert!(matches!(admin.evaluate(&anon), Ok(Outcome::Reject(Rejection::Unauthorized))));
        assert!(matches!(
            admin.evaluate(&as_user("/admin", "user")),
            Ok(Outcome::Reject(Rejection::Forbidden { role })) if role == "admin"
        ));
        assert!(matches!(admin.evaluate(&as_user("/admin", "admin")), Ok(Outcome::Continue)));
    }

    #[test]
    fn forbidden_is_json_on_api_and_html_on_web() {
        let paths = AccessPaths::default();
        let rejection = Rejection::Forbidden { role: "admin".into() };

        let api = rejection.respond(&as_user("/api/users", "user"), &paths);
        assert_eq!(api.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(api.header("content-type"), Some("application/json"));

        let web = rejection.respond(&as_user("/admin", "user"), &paths);
        assert_eq!(web.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(web.header("content-type"), Some("text/html; charset=utf-8"));
    }

    #[test]
    fn registered_policy_shadows_role_interpretation() {
        let mut policies: HashMap<String, Arc<dyn Policy>> = HashMap::new();
        policies.insert("verified".into(), Arc::new(|_: &Request| -> Result<Outcome, Error> { Ok(Outcome::Continue) }));
        assert!(matches!(Middleware::resolve("verified", &policies), Middleware::Policy { .. }));
        assert!(matches!(Middleware::resolve("auth", &policies), Middleware::Auth));
        assert!(matches!(Middleware::resolve("admin", &policies), Middleware::Role(r) if r == "admin"));
    }

    #[test]
    fn single_string_is_one_element_list() {
        assert_eq!("auth".into_middleware(), ["auth"]);
        assert_eq!(["auth", "admin"].into_middleware(), ["auth", "admin"]);
    }
}
