use tracing::debug;

use crate::auth::{AUTH_COOKIE, AuthContext, TokenService, extract_bearer};
use crate::request::Request;

/// Derives the [`AuthContext`] of every request from its session token.
///
/// Token sources, first non-empty wins:
/// 1. the `auth_token` cookie,
/// 2. an `Authorization: Bearer <token>` header.
///
/// A missing, malformed, forged or expired token yields an anonymous
/// context. Nothing here fails the request.
#[derive(Debug, Clone, Default)]
pub struct AuthMiddleware {
    tokens: Option<TokenService>,
}

impl AuthMiddleware {
    pub fn new(tokens: TokenService) -> Self {
        Self { tokens: Some(tokens) }
    }

    /// Every request stays anonymous.
    pub fn disabled() -> Self {
        Self { tokens: None }
    }

    pub fn tokens(&self) -> Option<&TokenService> {
        self.tokens.as_ref()
    }

    /// The raw token carried by `req`, if any.
    pub fn token_from(req: &Request) -> Option<&str> {
        req.cookie(AUTH_COOKIE)
            .filter(|t| !t.is_empty())
            .or_else(|| extract_bearer(req.header("authorization")))
    }

    pub fn authenticate(&self, req: &Request) -> AuthContext {
        let (Some(tokens), Some(token)) = (&self.tokens, Self::token_from(req)) else {
            return AuthContext::anonymous();
        };
        match tokens.decode(token) {
            Some(claims) => {
                debug!(user_id = claims.user_id, role = %claims.role, "authenticated request");
                AuthContext::from(claims)
            }
            None => AuthContext::anonymous(),
        }
    }

    /// Replaces whatever context `req` carried.
    pub fn apply(&self, req: &mut Request) {
        req.auth = self.authenticate(req);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::Method;

    #[test]
    fn cookie_wins_over_header() {
        let req = Request::new(Method::Get, "/")
            .with_header("authorization", "Bearer from-header")
            .with_header("cookie", "auth_token=from-cookie");
        assert_eq!(AuthMiddleware::token_from(&req), Some("from-cookie"));
    }

    #[test]
    fn empty_cookie_falls_back_to_header() {
        let req = Request::new(Method::Get, "/")
            .with_header("cookie", "auth_token=")
            .with_header("Authorization", "Bearer from-header");
        assert_eq!(AuthMiddleware::token_from(&req), Some("from-header"));
    }

    #[test]
    fn valid_token_authenticates_with_role() {
        let tokens = TokenService::new(b"k");
        let token = tokens.issue(3, "ops@example.com", "admin").unwrap();
        let mw = AuthMiddleware::new(tokens);
        let mut req = Request::new(Method::Get, "/").with_header("authorization", &format!("Bearer {token}"));
        mw.apply(&mut req);
        assert!(req.auth().authenticated);
        assert_eq!(req.auth().role.as_deref(), Some("admin"));
        assert_eq!(req.auth().user_id, Some(3));
    }

    #[test]
    fn disabled_middleware_never_authenticates() {
        let token = TokenService::new(b"k").issue(3, "ops@example.com", "admin").unwrap();
        let req = Request::new(Method::Get, "/").with_header("cookie", &format!("auth_token={token}"));
        assert!(!AuthMiddleware::disabled().authenticate(&req).authenticated);
    }
}
