use super::token::Claims;

/// Per-request authentication state.
///
/// Attached to every [`Request`](crate::Request) by the auth middleware
/// before any route middleware runs. An absent, expired, or forged token all
/// produce the same anonymous context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    pub authenticated: bool,
    pub user_id: Option<u64>,
    pub email: Option<String>,
    pub role: Option<String>,
    /// UNIX seconds.
    pub issued_at: Option<u64>,
    /// UNIX seconds.
    pub expires_at: Option<u64>,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// True when authenticated and the token's role equals `role` exactly.
    pub fn has_role(&self, role: &str) -> bool {
        self.authenticated && self.role.as_deref() == Some(role)
    }
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            authenticated: true,
            user_id: Some(claims.user_id),
            email: Some(claims.email),
            role: Some(claims.role),
            issued_at: Some(claims.iat),
            expires_at: Some(claims.exp),
        }
    }
}
