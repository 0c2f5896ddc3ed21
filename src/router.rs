//! Radix-tree request router.
//!
//! One tree per HTTP method, O(path-length) lookup. Every request runs the
//! same pipeline:
//!
//! ```text
//! method override → auth context → match → route middleware (in order) → handler
//!                                    │              │
//!                                    └─ 404         └─ 401 / 302 / 403 / 500
//! ```

use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;

use http::StatusCode;
use matchit::Router as MatchitRouter;
use percent_encoding::percent_decode_str;
use tracing::{debug, error};

use crate::error::Error;
use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::middleware::{AccessPaths, AuthMiddleware, Middleware, Outcome, Policy, method_override};
use crate::named::NamedRoutes;
use crate::params::PathParams;
use crate::request::Request;
use crate::response::Response;
use crate::route::RouteDefinition;

/// A registered route: its definition, resolved middleware, and handler.
struct Route {
    definition: RouteDefinition,
    middleware: Vec<Middleware>,
    handler: BoxedHandler,
}

/// The application router.
///
/// Built once by [`RouteBuilder::build`](crate::RouteBuilder::build) and
/// immutable afterwards; share it across connection tasks behind an `Arc`.
pub struct Router {
    trees: HashMap<Method, MatchitRouter<Arc<Route>>>,
    routes: Vec<Arc<Route>>,
    named: NamedRoutes,
    policies: HashMap<String, Arc<dyn Policy>>,
    auth: AuthMiddleware,
    paths: AccessPaths,
    method_override: bool,
}

impl Router {
    /// Starts declaring routes.
    pub fn builder() -> crate::RouteBuilder {
        crate::RouteBuilder::new()
    }

    pub(crate) fn new(
        auth: AuthMiddleware,
        paths: AccessPaths,
        method_override: bool,
        policies: HashMap<String, Arc<dyn Policy>>,
    ) -> Self {
        Self {
            trees: HashMap::new(),
            routes: Vec::new(),
            named: NamedRoutes::default(),
            policies,
            auth,
            paths,
            method_override,
        }
    }

    /// Binds a resolved definition to `handler`.
    ///
    /// Fails on a duplicate route name or a pattern that conflicts with one
    /// already registered for the same method.
    pub fn register(&mut self, definition: RouteDefinition, handler: impl Handler) -> Result<(), Error> {
        self.register_boxed(definition, handler.into_boxed_handler())
    }

    pub(crate) fn register_boxed(
        &mut self,
        definition: RouteDefinition,
        handler: BoxedHandler,
    ) -> Result<(), Error> {
        if let Some(name) = &definition.name {
            if self.named.contains(name) {
                return Err(Error::DuplicateRouteName(name.clone()));
            }
        }
        let middleware = definition.middleware.iter()
            .map(|id| Middleware::resolve(id, &self.policies))
            .collect();
        let route = Arc::new(Route { definition, middleware, handler });
        let pattern = to_matcher_syntax(&route.definition.path);

        self.trees
            .entry(route.definition.method)
            .or_default()
            .insert(pattern, Arc::clone(&route))
            .map_err(|source| Error::InvalidRoute { path: route.definition.path.clone(), source })?;

        // Named only once the pattern is bound.
        if let Some(name) = &route.definition.name {
            self.named.insert(name, &route.definition.path)?;
        }
        debug!(route = %route.definition, "registered route");
        self.routes.push(route);
        Ok(())
    }

    /// Reverse-resolves a named route. See [`NamedRoutes::resolve`].
    pub fn url(&self, name: &str, params: &[(&str, &dyn Display)]) -> Result<String, Error> {
        self.named.resolve(name, params)
    }

    pub fn named_routes(&self) -> &NamedRoutes {
        &self.named
    }

    /// Registered definitions, in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &RouteDefinition> {
        self.routes.iter().map(|r| &r.definition)
    }

    pub fn len(&self) -> usize { self.routes.len() }
    pub fn is_empty(&self) -> bool { self.routes.is_empty() }

    /// Whether any route declared at `path` carries middleware `id`.
    pub fn has_middleware(&self, path: &str, id: &str) -> bool {
        self.routes.iter()
            .filter(|r| r.definition.path == path)
            .any(|r| r.definition.middleware.iter().any(|m| m == id))
    }

    /// Matches `path` in the tree for `method`. `HEAD` falls back to `GET`
    /// routes. Parameter values are percent-decoded.
    fn lookup(&self, method: Method, path: &str) -> Option<(Arc<Route>, PathParams)> {
        let matched = self.trees.get(&method).and_then(|tree| tree.at(path).ok());
        let matched = match (matched, method) {
            (Some(m), _) => m,
            (None, Method::Head) => self.trees.get(&Method::Get)?.at(path).ok()?,
            (None, _) => return None,
        };
        let params = matched.params.iter()
            .map(|(name, value)| (name, percent_decode_str(value).decode_utf8_lossy()))
            .collect();
        Some((Arc::clone(matched.value), params))
    }

    /// Runs one request through the full pipeline.
    pub async fn dispatch(&self, mut req: Request) -> Response {
        if self.method_override {
            method_override::apply(&mut req);
        }
        self.auth.apply(&mut req);

        let Some((route, params)) = self.lookup(req.method(), req.path()) else {
            debug!(method = %req.method(), path = req.path(), "no route matched");
            return Response::status(StatusCode::NOT_FOUND);
        };
        debug!(method = %req.method(), path = req.path(), route = %route.definition.path, "dispatching");

        for middleware in &route.middleware {
            match middleware.evaluate(&req) {
                Ok(Outcome::Continue) => {}
                Ok(Outcome::Reject(rejection)) => return rejection.respond(&req, &self.paths),
                Ok(Outcome::Halt(response)) => return response,
                Err(e) => {
                    error!(middleware = middleware.name(), path = req.path(), "middleware failed: {e}");
                    return Response::error(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal Server Error",
                        "Request could not be authorized",
                    );
                }
            }
        }

        let head = req.method() == Method::Head;
        let response = route.handler.call(req, params).await;
        if head { response.without_body() } else { response }
    }
}

/// `{name:path}` becomes the catch-all `{*name}`; any other `{name:conv}`
/// converter is dropped to a plain `{name}`.
fn to_matcher_syntax(template: &str) -> String {
    template
        .split('/')
        .map(|segment| {
            let Some(inner) = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) else {
                return segment.to_owned();
            };
            match inner.split_once(':') {
                Some((name, "path")) => format!("{{*{name}}}"),
                Some((name, _)) => format!("{{{name}}}"),
                None => segment.to_owned(),
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn ok(_req: Request, _params: PathParams) -> &'static str { "ok" }

    fn router(defs: Vec<RouteDefinition>) -> Result<Router, Error> {
        let mut router = Router::new(AuthMiddleware::disabled(), AccessPaths::default(), true, HashMap::new());
        for def in defs {
            router.register(def, ok)?;
        }
        Ok(router)
    }

    #[test]
    fn converter_syntax() {
        assert_eq!(to_matcher_syntax("/posts/{post_id}/edit"), "/posts/{post_id}/edit");
        assert_eq!(to_matcher_syntax("/storage/{path:path}"), "/storage/{*path}");
        assert_eq!(to_matcher_syntax("/items/{id:int}"), "/items/{id}");
        assert_eq!(to_matcher_syntax("/"), "/");
    }

    #[test]
    fn lookup_extracts_params() {
        let router = router(vec![RouteDefinition::new(Method::Get, "/posts/{post_id}/edit")]).unwrap();
        let (route, params) = router.lookup(Method::Get, "/posts/42/edit").unwrap();
        assert_eq!(route.definition.path(), "/posts/{post_id}/edit");
        assert_eq!(params.get("post_id"), Some("42"));
        assert_eq!(params.parse::<u32>("post_id").unwrap(), 42);
        assert!(router.lookup(Method::Post, "/posts/42/edit").is_none());
    }

    #[test]
    fn catch_all_captures_rest_of_path() {
        let router = router(vec![RouteDefinition::new(Method::Delete, "/storage/delete/{path:path}")]).unwrap();
        let (_, params) = router.lookup(Method::Delete, "/storage/delete/img/a.png").unwrap();
        assert_eq!(params.get("path"), Some("img/a.png"));
    }

    #[test]
    fn same_pattern_twice_is_invalid() {
        let result = router(vec![
            RouteDefinition::new(Method::Get, "/posts"),
            RouteDefinition::new(Method::Get, "/posts"),
        ]);
        assert!(matches!(result, Err(Error::InvalidRoute { path, .. }) if path == "/posts"));
    }

    #[test]
    fn failed_registration_leaves_no_name_behind() {
        let mut router = router(vec![]).unwrap();
        let bad = RouteDefinition::new(Method::Get, "/files/{p:path}/meta").with_name("files.meta");
        assert!(matches!(router.register(bad, ok), Err(Error::InvalidRoute { .. })));
        assert!(router.is_empty());
        assert!(!router.named_routes().contains("files.meta"));
        assert!(matches!(router.url("files.meta", &[]), Err(Error::RouteNotFound(_))));

        let good = RouteDefinition::new(Method::Get, "/files/{p:path}").with_name("files.meta");
        router.register(good, ok).unwrap();
        assert_eq!(router.url("files.meta", &[("p", &"a/b")]).unwrap(), "/files/a/b");
    }

    #[test]
    fn duplicate_name_is_rejected_before_binding() {
        let mut router = router(vec![RouteDefinition::new(Method::Get, "/a").with_name("home")]).unwrap();
        let dup = RouteDefinition::new(Method::Get, "/b").with_name("home");
        assert!(matches!(router.register(dup, ok), Err(Error::DuplicateRouteName(name)) if name == "home"));
        assert_eq!(router.len(), 1);
        assert!(router.lookup(Method::Get, "/b").is_none());
    }

    #[test]
    fn params_are_percent_decoded() {
        let router = router(vec![
            RouteDefinition::new(Method::Get, "/files/{name}"),
            RouteDefinition::new(Method::Delete, "/storage/{path:path}"),
        ])
        .unwrap();
        let (_, params) = router.lookup(Method::Get, "/files/my%20file.txt").unwrap();
        assert_eq!(params.get("name"), Some("my file.txt"));
        let (_, params) = router.lookup(Method::Delete, "/storage/img/caf%C3%A9.png").unwrap();
        assert_eq!(params.get("path"), Some("img/café.png"));
    }

    #[test]
    fn head_falls_back_to_get_routes() {
        let router = router(vec![RouteDefinition::new(Method::Get, "/posts")]).unwrap();
        assert!(router.lookup(Method::Head, "/posts").is_some());
        assert!(router.lookup(Method::Post, "/posts").is_none());
    }

    #[tokio::test]
    async fn head_response_has_headers_but_no_body() {
        let router = router(vec![RouteDefinition::new(Method::Get, "/posts")]).unwrap();
        let res = router.dispatch(Request::new(Method::Head, "/posts")).await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.header("content-type"), Some("text/plain; charset=utf-8"));
        assert!(res.body().is_empty());
    }

    #[test]
    fn has_middleware_by_template() {
        let router = router(vec![
            RouteDefinition::new(Method::Get, "/dashboard").with_middleware("auth"),
            RouteDefinition::new(Method::Get, "/"),
        ])
        .unwrap();
        assert!(router.has_middleware("/dashboard", "auth"));
        assert!(!router.has_middleware("/", "auth"));
    }
}
