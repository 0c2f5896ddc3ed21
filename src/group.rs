//! Route group attributes and how they combine.
//!
//! Nesting rules, parent first:
//!
//! | attribute | effective value |
//! |---|---|
//! | prefix | `parent/own`, slash-normalized |
//! | name | `parent + own` (plain concatenation, e.g. `"admin." + "posts."`) |
//! | middleware | `parent ++ own`, no reordering, no de-duplication |
//! | namespace | own, else parent |

use crate::method::Method;
use crate::middleware::IntoMiddleware;
use crate::route::RouteDefinition;

/// Attributes shared by every route declared inside a group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupAttributes {
    pub(crate) prefix: String,
    pub(crate) name: String,
    pub(crate) middleware: Vec<String>,
    pub(crate) namespace: Option<String>,
}

impl GroupAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the URL prefix, trimmed of surrounding `/`.
    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.trim_matches('/').to_owned();
        self
    }

    /// Sets the name prefix. Conventionally ends with a dot: `"posts."`.
    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_owned();
        self
    }

    /// Appends to the group's middleware chain.
    pub fn middleware(mut self, middleware: impl IntoMiddleware) -> Self {
        self.middleware.extend(middleware.into_middleware());
        self
    }

    pub fn namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(namespace.to_owned());
        self
    }

    pub fn prefix_str(&self) -> &str { &self.prefix }
    pub fn name_prefix(&self) -> &str { &self.name }
    pub fn middleware_list(&self) -> &[String] { &self.middleware }
    pub fn namespace_str(&self) -> Option<&str> { self.namespace.as_deref() }

    /// Effective attributes of `child` nested inside `self`.
    pub fn merge(&self, child: &GroupAttributes) -> GroupAttributes {
        GroupAttributes {
            prefix: join_segments(&self.prefix, &child.prefix),
            name: format!("{}{}", self.name, child.name),
            middleware: self.middleware.iter().chain(&child.middleware).cloned().collect(),
            namespace: child.namespace.clone().or_else(|| self.namespace.clone()),
        }
    }

    /// Resolves one declaration against these attributes.
    ///
    /// A route without its own name stays unnamed even inside a named group.
    pub(crate) fn resolve(
        &self,
        method: Method,
        path: &str,
        middleware: &[String],
        name: Option<&str>,
    ) -> RouteDefinition {
        RouteDefinition {
            method,
            path: full_path(&self.prefix, path),
            middleware: self.middleware.iter().chain(middleware).cloned().collect(),
            name: name.map(|n| format!("{}{n}", self.name)),
            namespace: self.namespace.clone(),
        }
    }
}

/// `a/b` without leading, trailing or doubled separators.
fn join_segments(parent: &str, child: &str) -> String {
    [parent.trim_matches('/'), child.trim_matches('/')]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Absolute route path from a group prefix and a declared path.
pub(crate) fn full_path(prefix: &str, path: &str) -> String {
    format!("/{}", join_segments(prefix, path))
}
