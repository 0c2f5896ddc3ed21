//! Session tokens and per-request authentication state.
//!
//! The flow:
//!
//! ```text
//! login handler ── TokenService::issue ──▶ Set-Cookie: auth_token=<jwt>
//!
//! every request ── cookie `auth_token`, else `Authorization: Bearer` ──▶
//!     TokenService::decode ──▶ AuthContext on the Request
//!
//! route middleware "auth" / "<role>" ──▶ reads AuthContext
//! ```
//!
//! Tokens are HS256 JWTs carrying `user_id`, `email`, `role`, `iat` and
//! `exp`. There is no refresh or sliding expiry.

mod context;
mod cookie;
mod token;
mod user;

pub use context::AuthContext;
pub use cookie::{AUTH_COOKIE, AUTH_COOKIE_MAX_AGE, auth_cookie, auth_cookie_with_max_age, clear_auth_cookie};
pub use token::{Claims, DEFAULT_TOKEN_TTL, TokenService, extract_bearer};
pub use user::{UserProvider, current_user};
