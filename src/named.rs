//! Named-route registry and reverse URL generation.

use std::collections::HashMap;
use std::fmt::Display;

use crate::error::Error;

/// Route name → path template.
///
/// Filled while the router is built and read-only afterwards. Names are
/// unique: registering one twice is an error rather than a silent overwrite.
#[derive(Debug, Clone, Default)]
pub struct NamedRoutes {
    routes: HashMap<String, String>,
}

impl NamedRoutes {
    pub(crate) fn insert(&mut self, name: &str, path: &str) -> Result<(), Error> {
        if self.routes.contains_key(name) {
            return Err(Error::DuplicateRouteName(name.to_owned()));
        }
        self.routes.insert(name.to_owned(), path.to_owned());
        Ok(())
    }

    /// Path template registered under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.routes.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.routes.contains_key(name)
    }

    pub fn len(&self) -> usize { self.routes.len() }
    pub fn is_empty(&self) -> bool { self.routes.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.routes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Builds the path for `name`, substituting `{key}` placeholders.
    ///
    /// Placeholders without a supplied value are left as written; extra
    /// values are ignored.
    ///
    /// ```rust
    /// # use kiln::{Method, RouteBuilder, Request, PathParams};
    /// # async fn show(_: Request, _: PathParams) -> &'static str { "" }
    /// let mut routes = RouteBuilder::new();
    /// routes.get("/posts/{post_id}", show).name("posts.show");
    /// let router = routes.build().unwrap();
    ///
    /// assert_eq!(router.url("posts.show", &[("post_id", &7)]).unwrap(), "/posts/7");
    /// assert!(router.url("nonexistent.route", &[]).is_err());
    /// ```
    pub fn resolve(&self, name: &str, params: &[(&str, &dyn Display)]) -> Result<String, Error> {
        let template = self.get(name).ok_or_else(|| Error::RouteNotFound(name.to_owned()))?;
        Ok(substitute(template, params))
    }
}

fn substitute(template: &str, params: &[(&str, &dyn Display)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else { break };
        let placeholder = &rest[start..=start + len];
        let inner = &placeholder[1..placeholder.len() - 1];
        // `{name:path}` style converters name the same parameter.
        let key = inner.split(':').next().unwrap_or(inner).trim_start_matches('*');

        out.push_str(&rest[..start]);
        match params.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => out.push_str(&value.to_string()),
            None => out.push_str(placeholder),
        }
        rest = &rest[start + len + 1..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> NamedRoutes {
        let mut named = NamedRoutes::default();
        named.insert("posts.show", "/posts/{post_id}").unwrap();
        named.insert("posts.comment", "/posts/{post_id}/comments/{comment_id}").unwrap();
        named.insert("storage.file", "/storage/{path:path}").unwrap();
        named
    }

    #[test]
    fn substitutes_parameters() {
        assert_eq!(table().resolve("posts.show", &[("post_id", &7)]).unwrap(), "/posts/7");
        assert_eq!(
            table().resolve("storage.file", &[("path", &"a/b.txt")]).unwrap(),
            "/storage/a/b.txt"
        );
    }

    #[test]
    fn missing_parameters_stay_verbatim() {
        assert_eq!(
            table().resolve("posts.comment", &[("post_id", &1)]).unwrap(),
            "/posts/1/comments/{comment_id}"
        );
    }

    #[test]
    fn unknown_name_is_route_not_found() {
        assert!(matches!(
            table().resolve("nonexistent.route", &[]),
            Err(Error::RouteNotFound(name)) if name == "nonexistent.route"
        ));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut named = table();
        assert!(matches!(
            named.insert("posts.show", "/other"),
            Err(Error::DuplicateRouteName(_))
        ));
        assert_eq!(named.get("posts.show"), Some("/posts/{post_id}"));
    }
}
