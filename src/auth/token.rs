//! HS256 session tokens.

use std::fmt;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{AuthConfig, DEFAULT_SECRET_KEY};
use crate::error::Error;

/// Default validity window of an issued token.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Token payload. Every field is required; a token missing one is invalid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    pub email: String,
    pub role: String,
    /// Issued-at, UNIX seconds.
    pub iat: u64,
    /// Expiry, UNIX seconds.
    pub exp: u64,
}

/// Mints and validates session tokens with one symmetric key.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // `exp` is required by default; expiry is exact.
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl: DEFAULT_TOKEN_TTL,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        if config.secret_key == DEFAULT_SECRET_KEY {
            warn!("using the default secret key; set SECRET_KEY outside local development");
        }
        Self::new(config.secret_key.as_bytes())
            .with_ttl(Duration::from_secs(config.token_ttl_hours.saturating_mul(60 * 60)))
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mints a token valid for [`ttl`](Self::ttl) from now.
    pub fn issue(&self, user_id: u64, email: &str, role: &str) -> Result<String, Error> {
        let now = jsonwebtoken::get_current_timestamp();
        self.encode(&Claims {
            user_id,
            email: email.to_owned(),
            role: role.to_owned(),
            iat: now,
            exp: now.saturating_add(self.ttl.as_secs()),
        })
    }

    pub fn encode(&self, claims: &Claims) -> Result<String, Error> {
        Ok(jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)?)
    }

    /// Validates signature, shape and expiry. Every failure is `None`.
    pub fn decode(&self, token: &str) -> Option<Claims> {
        match jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                debug!(reason = %e, "rejected session token");
                None
            }
        }
    }

    pub fn verify(&self, token: &str) -> bool {
        self.decode(token).is_some()
    }

    /// `Set-Cookie` value carrying `token`, with max-age equal to the ttl.
    pub fn cookie(&self, token: &str) -> String {
        super::cookie::auth_cookie_with_max_age(token, self.ttl.as_secs())
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &Algorithm::HS256)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

/// Token part of an `Authorization: Bearer <token>` header value.
///
/// The scheme is case-insensitive; anything but exactly two
/// whitespace-separated parts is rejected.
pub fn extract_bearer(header: Option<&str>) -> Option<&str> {
    let mut parts = header?.split_whitespace();
    let (scheme, token) = (parts.next()?, parts.next()?);
    if parts.next().is_some() || !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token)
}
