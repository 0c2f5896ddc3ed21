//! # kiln
//!
//! Laravel-style routing for Rust HTTP services: route groups, named
//! routes, per-route middleware and JWT session auth, served over hyper.
//!
//! What kiln does:
//!
//! - Route groups with prefix, name-prefix and middleware inheritance
//! - Named routes and reverse URL generation
//! - `auth` and role middleware, with JSON errors for API paths and login
//!   redirects for pages
//! - HS256 session tokens from an `auth_token` cookie or a bearer header
//! - HTML-form method override (`_method`)
//! - Radix-tree matching via [`matchit`], graceful shutdown on SIGTERM
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use kiln::auth::{TokenService, auth_cookie};
//! use kiln::{Config, PathParams, Request, Response, RouteBuilder, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), kiln::Error> {
//!     let config = Config::from_env();
//!     let mut routes = RouteBuilder::with_config(&config);
//!
//!     routes.get("/", home).name("home");
//!     routes.get("/login", login).name("login");
//!
//!     routes.middleware("auth").group(|r| {
//!         r.get("/dashboard", dashboard).name("dashboard");
//!         r.prefix("posts").name("posts.").group(|r| {
//!             r.get("/{post_id}", show_post).name("show");
//!         });
//!     });
//!
//!     Server::from_config(&config)?.serve(routes.build()?).await
//! }
//!
//! async fn home(_req: Request, _params: PathParams) -> Response {
//!     Response::html("<h1>Welcome</h1>")
//! }
//!
//! async fn login(_req: Request, _params: PathParams) -> Response {
//!     # let tokens = TokenService::new(b"secret");
//!     let token = tokens.issue(1, "ada@example.com", "user").unwrap();
//!     Response::builder()
//!         .cookie(&auth_cookie(&token))
//!         .status(kiln::StatusCode::FOUND)
//!         .header("location", "/dashboard")
//!         .no_body()
//! }
//!
//! async fn dashboard(req: Request, _params: PathParams) -> String {
//!     format!("hello, {}", req.auth().email.as_deref().unwrap_or("?"))
//! }
//!
//! async fn show_post(_req: Request, params: PathParams) -> Response {
//!     match params.parse::<u64>("post_id") {
//!         Ok(id) => Response::text(format!("post {id}")),
//!         Err(_) => Response::status(kiln::StatusCode::NOT_FOUND),
//!     }
//! }
//! ```

mod builder;
mod error;
mod group;
mod handler;
mod method;
mod named;
mod params;
mod request;
mod resource;
mod response;
mod route;
mod router;
mod server;

pub mod auth;
pub mod config;
pub mod middleware;

pub use builder::{GroupBuilder, PendingRoute, RouteBuilder};
pub use config::Config;
pub use error::Error;
pub use group::GroupAttributes;
pub use handler::Handler;
pub use http::StatusCode;
pub use method::{Method, UnsupportedMethod};
pub use named::NamedRoutes;
pub use params::PathParams;
pub use request::Request;
pub use resource::{RESOURCE_ID, ResourceController};
pub use response::{ContentType, ErrorBody, IntoResponse, Json, Response, ResponseBuilder};
pub use route::RouteDefinition;
pub use router::Router;
pub use server::Server;
