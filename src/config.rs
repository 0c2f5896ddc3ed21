//! Application configuration.
//!
//! Loaded once at start-up, either from a TOML document or from the
//! process environment. Every field has a default so partial configs work.

use std::env;
use std::path::Path;

use serde::Deserialize;

use crate::error::Error;

/// Placeholder secret used when none is configured. Never deploy with it.
pub const DEFAULT_SECRET_KEY: &str = "your-secret-key-change-this";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub app: AppConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub name: String,
    pub env: String,
    pub debug: bool,
    pub host: String,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "kiln".to_owned(),
            env: "local".to_owned(),
            debug: false,
            host: "127.0.0.1".to_owned(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Symmetric HS256 key.
    pub secret_key: String,
    pub token_ttl_hours: u64,
    /// Where unauthenticated web requests are redirected.
    pub login_path: String,
    /// Paths under this prefix get JSON errors instead of redirects.
    pub api_prefix: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: DEFAULT_SECRET_KEY.to_owned(),
            token_ttl_hours: 24,
            login_path: "/login".to_owned(),
            api_prefix: "/api".to_owned(),
        }
    }
}

impl Config {
    pub fn from_toml(source: &str) -> Result<Self, Error> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml(&source)
    }

    /// Reads `APP_*`, `SECRET_KEY`, `JWT_TTL_HOURS`, `LOGIN_PATH` and
    /// `API_PREFIX`. Unset or unparseable variables keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let app = &mut config.app;
        let auth = &mut config.auth;

        if let Some(v) = var("APP_NAME") { app.name = v; }
        if let Some(v) = var("APP_ENV") { app.env = v; }
        if let Some(v) = var("APP_DEBUG") { app.debug = v.eq_ignore_ascii_case("true"); }
        if let Some(v) = var("APP_HOST") { app.host = v; }
        if let Some(v) = var("APP_PORT").and_then(|v| v.parse().ok()) { app.port = v; }

        if let Some(v) = var("SECRET_KEY") { auth.secret_key = v; }
        if let Some(v) = var("JWT_TTL_HOURS").and_then(|v| v.parse().ok()) { auth.token_ttl_hours = v; }
        if let Some(v) = var("LOGIN_PATH") { auth.login_path = v; }
        if let Some(v) = var("API_PREFIX") { auth.api_prefix = v; }

        config
    }

    /// `host:port` for [`Server::from_config`](crate::Server::from_config).
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.app.host, self.app.port)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [app]
            port = 9000

            [auth]
            secret_key = "s3cret"
            "#,
        )
        .unwrap();
        assert_eq!(config.app.port, 9000);
        assert_eq!(config.app.host, "127.0.0.1");
        assert_eq!(config.auth.secret_key, "s3cret");
        assert_eq!(config.auth.token_ttl_hours, 24);
        assert_eq!(config.auth.login_path, "/login");
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        assert!(matches!(Config::from_toml("[app\nport = 1"), Err(Error::Config(_))));
    }

    #[test]
    fn environment_overrides() {
        let vars: HashMap<&str, &str> = [
            ("APP_PORT", "8080"),
            ("APP_DEBUG", "TRUE"),
            ("SECRET_KEY", "k"),
            ("JWT_TTL_HOURS", "not-a-number"),
        ]
        .into_iter()
        .collect();
        let config = Config::from_lookup(|k| vars.get(k).map(|v| (*v).to_owned()));
        assert_eq!(config.app.port, 8080);
        assert!(config.app.debug);
        assert_eq!(config.auth.secret_key, "k");
        assert_eq!(config.auth.token_ttl_hours, 24);
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }
}
