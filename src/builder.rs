//! Route declaration: groups, pending routes, and building the [`Router`].
//!
//! Declaration happens once, at start-up, on a [`RouteBuilder`]. Groups push
//! their merged attributes on the builder's own stack for the duration of
//! their callback; routes read the top of that stack when their declaring
//! statement ends.
//!
//! ```rust
//! use kiln::{PathParams, Request, Response, RouteBuilder};
//!
//! # async fn dashboard(_: Request, _: PathParams) -> Response { Response::text("") }
//! # async fn index(_: Request, _: PathParams) -> Response { Response::text("") }
//! # async fn edit(_: Request, _: PathParams) -> Response { Response::text("") }
//! let mut routes = RouteBuilder::new();
//!
//! routes.middleware("auth").group(|r| {
//!     r.get("/dashboard", dashboard).name("dashboard");
//!
//!     r.prefix("posts").name("posts.").group(|r| {
//!         r.get("/", index).name("index");
//!         r.get("/{post_id}/edit", edit).name("edit");
//!     });
//! });
//!
//! let router = routes.build().unwrap();
//! assert_eq!(router.url("posts.edit", &[("post_id", &3)]).unwrap(), "/posts/3/edit");
//! ```

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use tracing::info;

use crate::auth::TokenService;
use crate::config::Config;
use crate::error::Error;
use crate::group::GroupAttributes;
use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::middleware::{AccessPaths, AuthMiddleware, IntoMiddleware, Policy};
use crate::params::PathParams;
use crate::request::Request;
use crate::resource::{RESOURCE_ID, ResourceController};
use crate::response::IntoResponse;
use crate::route::RouteDefinition;
use crate::router::Router;

/// The route-declaration context.
///
/// Owns the group stack and the resolved definitions. Consumed by
/// [`build`](RouteBuilder::build), so no declaration can outlive start-up.
pub struct RouteBuilder {
    stack: Vec<GroupAttributes>,
    routes: Vec<(RouteDefinition, BoxedHandler)>,
    policies: HashMap<String, Arc<dyn Policy>>,
    auth: AuthMiddleware,
    paths: AccessPaths,
    method_override: bool,
}

impl RouteBuilder {
    pub fn new() -> Self {
        Self {
            stack: Vec::new(),
            routes: Vec::new(),
            policies: HashMap::new(),
            auth: AuthMiddleware::disabled(),
            paths: AccessPaths::default(),
            method_override: true,
        }
    }

    /// Token service, login path and API prefix from `config`.
    pub fn with_config(config: &Config) -> Self {
        let mut builder = Self::new();
        builder
            .auth(TokenService::from_config(&config.auth))
            .access_paths(&config.auth.api_prefix, &config.auth.login_path);
        builder
    }

    /// Enables the auth middleware with `tokens`. Without it every request
    /// is anonymous.
    pub fn auth(&mut self, tokens: TokenService) -> &mut Self {
        self.auth = AuthMiddleware::new(tokens);
        self
    }

    pub fn access_paths(&mut self, api_prefix: &str, login_path: &str) -> &mut Self {
        self.paths = AccessPaths::new(api_prefix, login_path);
        self
    }

    /// Toggles `_method` form overrides. On by default.
    pub fn method_override(&mut self, enabled: bool) -> &mut Self {
        self.method_override = enabled;
        self
    }

    /// Registers a named policy usable as a middleware identifier.
    pub fn policy(&mut self, name: &str, policy: impl Policy) -> &mut Self {
        self.policies.insert(name.to_owned(), Arc::new(policy));
        self
    }

    // ── Routes ────────────────────────────────────────────────────────────────

    pub fn route(&mut self, method: Method, path: &str, handler: impl Handler) -> PendingRoute<'_> {
        PendingRoute {
            builder: self,
            method,
            path: path.to_owned(),
            handler: Some(handler.into_boxed_handler()),
            middleware: Vec::new(),
            name: None,
        }
    }

    pub fn get(&mut self, path: &str, handler: impl Handler) -> PendingRoute<'_> {
        self.route(Method::Get, path, handler)
    }

    pub fn post(&mut self, path: &str, handler: impl Handler) -> PendingRoute<'_> {
        self.route(Method::Post, path, handler)
    }

    pub fn put(&mut self, path: &str, handler: impl Handler) -> PendingRoute<'_> {
        self.route(Method::Put, path, handler)
    }

    pub fn patch(&mut self, path: &str, handler: impl Handler) -> PendingRoute<'_> {
        self.route(Method::Patch, path, handler)
    }

    pub fn delete(&mut self, path: &str, handler: impl Handler) -> PendingRoute<'_> {
        self.route(Method::Delete, path, handler)
    }

    /// Registers the seven CRUD routes of `controller` under `name`.
    /// See [`ResourceController`].
    pub fn resource<C: ResourceController>(&mut self, name: &str, controller: C) -> &mut Self {
        macro_rules! action {
            ($controller:ident, $action:ident) => {{
                let controller = Arc::clone(&$controller);
                move |req: Request, params: PathParams| {
                    let controller = Arc::clone(&controller);
                    async move { controller.$action(req, params).await.into_response() }
                }
            }};
        }

        let controller = Arc::new(controller);
        let base = name.trim_matches('/');
        let member = format!("{base}/{{{RESOURCE_ID}}}");

        self.get(base, action!(controller, index)).name(&format!("{base}.index"));
        self.get(&format!("{base}/create"), action!(controller, create)).name(&format!("{base}.create"));
        self.post(base, action!(controller, store)).name(&format!("{base}.store"));
        self.get(&member, action!(controller, show)).name(&format!("{base}.show"));
        self.get(&format!("{member}/edit"), action!(controller, edit)).name(&format!("{base}.edit"));
        self.put(&member, action!(controller, update)).name(&format!("{base}.update"));
        self.delete(&member, action!(controller, destroy)).name(&format!("{base}.destroy"));
        self
    }

    // ── Groups ────────────────────────────────────────────────────────────────

    pub fn prefix(&mut self, prefix: &str) -> GroupBuilder<'_> {
        GroupBuilder { builder: self, attributes: GroupAttributes::new().prefix(prefix) }
    }

    pub fn middleware(&mut self, middleware: impl IntoMiddleware) -> GroupBuilder<'_> {
        GroupBuilder { builder: self, attributes: GroupAttributes::new().middleware(middleware) }
    }

    pub fn name(&mut self, name: &str) -> GroupBuilder<'_> {
        GroupBuilder { builder: self, attributes: GroupAttributes::new().name(name) }
    }

    pub fn namespace(&mut self, namespace: &str) -> GroupBuilder<'_> {
        GroupBuilder { builder: self, attributes: GroupAttributes::new().namespace(namespace) }
    }

    /// Opens a group from a complete set of attributes.
    pub fn group_with(&mut self, attributes: GroupAttributes, routes: impl FnOnce(&mut RouteBuilder)) {
        let mut scope = GroupScope::enter(self, &attributes);
        routes(&mut *scope);
    }

    /// Effective attributes of the innermost open group.
    pub fn current_group(&self) -> Option<&GroupAttributes> {
        self.stack.last()
    }

    /// Definitions declared so far, in declaration order.
    pub fn definitions(&self) -> impl Iterator<Item = &RouteDefinition> {
        self.routes.iter().map(|(def, _)| def)
    }

    /// Registers every declared route and freezes the table.
    pub fn build(self) -> Result<Router, Error> {
        let mut router = Router::new(self.auth, self.paths, self.method_override, self.policies);
        for (definition, handler) in self.routes {
            router.register_boxed(definition, handler)?;
        }
        info!(routes = router.len(), named = router.named_routes().len(), "route table built");
        Ok(router)
    }

    fn finalize(
        &mut self,
        method: Method,
        path: &str,
        middleware: &[String],
        name: Option<&str>,
        handler: BoxedHandler,
    ) {
        let definition = match self.stack.last() {
            Some(group) => group.resolve(method, path, middleware, name),
            None => GroupAttributes::default().resolve(method, path, middleware, name),
        };
        self.routes.push((definition, handler));
    }
}

impl Default for RouteBuilder {
    fn default() -> Self { Self::new() }
}

// ── Group scope ───────────────────────────────────────────────────────────────

/// Keeps a group's attributes on the stack while its callback runs and pops
/// them on drop, unwinding included.
struct GroupScope<'a> {
    builder: &'a mut RouteBuilder,
    depth: usize,
}

impl<'a> GroupScope<'a> {
    fn enter(builder: &'a mut RouteBuilder, attributes: &GroupAttributes) -> Self {
        let depth = builder.stack.len();
        let merged = match builder.stack.last() {
            Some(parent) => parent.merge(attributes),
            None => GroupAttributes::default().merge(attributes),
        };
        builder.stack.push(merged);
        Self { builder, depth }
    }
}

impl Deref for GroupScope<'_> {
    type Target = RouteBuilder;
    fn deref(&self) -> &RouteBuilder { self.builder }
}

impl DerefMut for GroupScope<'_> {
    fn deref_mut(&mut self) -> &mut RouteBuilder { self.builder }
}

impl Drop for GroupScope<'_> {
    fn drop(&mut self) {
        self.builder.stack.truncate(self.depth);
    }
}

// ── GroupBuilder ──────────────────────────────────────────────────────────────

/// Attributes of a group being declared. Finished by [`group`](Self::group).
pub struct GroupBuilder<'a> {
    builder: &'a mut RouteBuilder,
    attributes: GroupAttributes,
}

impl GroupBuilder<'_> {
    pub fn prefix(mut self, prefix: &str) -> Self {
        self.attributes = self.attributes.prefix(prefix);
        self
    }

    /// Appends to the group's middleware.
    pub fn middleware(mut self, middleware: impl IntoMiddleware) -> Self {
        self.attributes = self.attributes.middleware(middleware);
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.attributes = self.attributes.name(name);
        self
    }

    pub fn namespace(mut self, namespace: &str) -> Self {
        self.attributes = self.attributes.namespace(namespace);
        self
    }

    /// Runs `routes` with this group's attributes in effect.
    pub fn group(self, routes: impl FnOnce(&mut RouteBuilder)) {
        self.builder.group_with(self.attributes, routes);
    }
}

// ── PendingRoute ──────────────────────────────────────────────────────────────

/// A route declaration awaiting the end of its statement.
///
/// The definition is resolved against the current group and handed to the
/// builder when this value is dropped, so chained calls always land:
///
/// ```rust
/// # use kiln::{PathParams, Request, RouteBuilder};
/// # async fn profile(_: Request, _: PathParams) -> &'static str { "" }
/// let mut routes = RouteBuilder::new();
/// routes.get("/profile", profile).middleware("auth").name("profile");
/// let def = routes.definitions().next().unwrap();
/// assert_eq!(def.name(), Some("profile"));
/// assert_eq!(def.middleware(), ["auth"]);
/// ```
pub struct PendingRoute<'a> {
    builder: &'a mut RouteBuilder,
    method: Method,
    path: String,
    handler: Option<BoxedHandler>,
    middleware: Vec<String>,
    name: Option<String>,
}

impl PendingRoute<'_> {
    /// Sets this route's own middleware. A later call replaces an earlier one.
    pub fn middleware(mut self, middleware: impl IntoMiddleware) -> Self {
        self.middleware = middleware.into_middleware();
        self
    }

    /// Sets this route's own name, appended to the group's name prefix.
    /// A later call replaces an earlier one.
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_owned());
        self
    }
}

impl Drop for PendingRoute<'_> {
    fn drop(&mut self) {
        if let Some(handler) = self.handler.take() {
            let path = std::mem::take(&mut self.path);
            let middleware = std::mem::take(&mut self.middleware);
            let name = self.name.take();
            self.builder.finalize(self.method, &path, &middleware, name.as_deref(), handler);
        }
    }
}
