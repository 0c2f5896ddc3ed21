/// Name of the session cookie.
pub const AUTH_COOKIE: &str = "auth_token";

/// Max-age of the session cookie, in seconds.
pub const AUTH_COOKIE_MAX_AGE: u64 = 86_400;

/// `Set-Cookie` value for a freshly issued token: http-only, same-site lax,
/// one day.
pub fn auth_cookie(token: &str) -> String {
    auth_cookie_with_max_age(token, AUTH_COOKIE_MAX_AGE)
}

pub fn auth_cookie_with_max_age(token: &str, max_age: u64) -> String {
    format!("{AUTH_COOKIE}={token}; Path=/; Max-Age={max_age}; HttpOnly; SameSite=Lax")
}

/// `Set-Cookie` value that drops the session cookie (logout).
pub fn clear_auth_cookie() -> String {
    auth_cookie_with_max_age("", 0)
}
