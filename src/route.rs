//! Fully resolved route declarations.

use std::fmt;

use crate::method::Method;

/// One route after group attributes have been applied.
///
/// Immutable once built: the router only ever sees complete definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDefinition {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) middleware: Vec<String>,
    pub(crate) name: Option<String>,
    pub(crate) namespace: Option<String>,
}

impl RouteDefinition {
    /// A bare definition, for registering directly on a [`Router`](crate::Router).
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: crate::group::full_path("", path),
            middleware: Vec::new(),
            name: None,
            namespace: None,
        }
    }

    pub fn with_middleware(mut self, middleware: impl crate::middleware::IntoMiddleware) -> Self {
        self.middleware = middleware.into_middleware();
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_owned());
        self
    }

    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(namespace.to_owned());
        self
    }

    pub fn method(&self) -> Method { self.method }
    /// Template with `{param}` placeholders, as declared.
    pub fn path(&self) -> &str { &self.path }
    pub fn middleware(&self) -> &[String] { &self.middleware }
    pub fn name(&self) -> Option<&str> { self.name.as_deref() }
    pub fn namespace(&self) -> Option<&str> { self.namespace.as_deref() }
}

/// One line of a route listing: `GET    /posts/{post_id}  posts.show  [auth]`.
impl fmt::Display for RouteDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<6} {}", self.method.as_str(), self.path)?;
        if let Some(name) = &self.name {
            write!(f, "  {name}")?;
        }
        if !self.middleware.is_empty() {
            write!(f, "  [{}]", self.middleware.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_line() {
        let def = RouteDefinition::new(Method::Get, "posts/{post_id}")
            .with_name("posts.show")
            .with_middleware(["auth", "admin"]);
        assert_eq!(def.path(), "/posts/{post_id}");
        assert_eq!(def.to_string(), "GET    /posts/{post_id}  posts.show  [auth, admin]");
    }
}
