//! Small blog: public pages, a login flow, an authenticated post resource,
//! an admin area and a JSON API.
//!
//! Run with:
//!   RUST_LOG=kiln=debug,blog=info cargo run --example blog
//!
//! Try:
//!   curl -i http://localhost:8000/dashboard              # 302 to /login
//!   curl -i http://localhost:8000/api/user               # 401 JSON
//!   curl -i -c jar -d 'email=ada@example.com&password=secret' http://localhost:8000/login
//!   curl -i -b jar http://localhost:8000/dashboard       # 200
//!   curl -i -b jar -d '_method=DELETE' http://localhost:8000/posts/3
//!   curl -i -b jar http://localhost:8000/admin           # 403, ada is not an admin
//!
//! Its tests run with `cargo test --example blog`.

use kiln::auth::{TokenService, clear_auth_cookie};
use kiln::{
    Config, Json, PathParams, Request, ResourceController, Response, RouteBuilder, Server, StatusCode,
};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), kiln::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();
    let tokens = TokenService::from_config(&config.auth);
    let mut routes = RouteBuilder::new();
    routes
        .auth(tokens.clone())
        .access_paths(&config.auth.api_prefix, &config.auth.login_path);

    routes.get("/", home).name("home");
    routes.get("/login", login_form).name("login");
    routes.post("/login", {
        let tokens = tokens.clone();
        move |req: Request, _params: PathParams| {
            let tokens = tokens.clone();
            async move { login(&tokens, &req) }
        }
    });
    routes.post("/logout", logout).name("logout");

    routes.middleware("auth").group(|r| {
        r.get("/dashboard", dashboard).name("dashboard");
        r.resource("posts", Posts);
    });

    routes.prefix("admin").name("admin.").middleware("admin").group(|r| {
        r.get("/", admin_home).name("index");
    });

    routes.prefix("api").name("api.").middleware("auth").group(|r| {
        r.get("/user", api_user).name("user");
    });

    let router = routes.build()?;
    for route in router.routes() {
        info!("{route}");
    }

    Server::from_config(&config)?.serve(router).await
}

async fn home(_req: Request, _params: PathParams) -> Response {
    Response::html(r#"<h1>Blog</h1><a href="/login">Sign in</a>"#)
}

/// Post-login target from `?redirect=`. Only same-site absolute paths are
/// honoured; anything else falls back to the dashboard.
fn redirect_target(req: &Request) -> String {
    req.query("redirect")
        .filter(|target| {
            target.starts_with('/')
                && !target.starts_with("//")
                && !target.contains(|c: char| c == '\\' || c.is_control())
        })
        .unwrap_or_else(|| "/dashboard".to_owned())
}

async fn login_form(req: Request, _params: PathParams) -> Response {
    let target = redirect_target(&req);
    let redirect = utf8_percent_encode(&target, NON_ALPHANUMERIC);
    Response::html(format!(
        r#"<form method="post" action="/login?redirect={redirect}">
<input name="email"><input name="password" type="password"><button>Sign in</button>
</form>"#
    ))
}

/// Accepts any password for `ada@example.com`; a real app checks a store.
fn login(tokens: &TokenService, req: &Request) -> Response {
    let email = req.form_value("email").unwrap_or_default();
    if email != "ada@example.com" || req.form_value("password").is_none() {
        return Response::redirect("/login");
    }

    let target = redirect_target(req);
    match tokens.issue(1, &email, "user") {
        Ok(token) => Response::builder()
            .status(StatusCode::FOUND)
            .header("location", &target)
            .cookie(&tokens.cookie(&token))
            .no_body(),
        Err(e) => {
            tracing::error!("could not issue token: {e}");
            Response::status(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn logout(_req: Request, _params: PathParams) -> Response {
    Response::builder()
        .status(StatusCode::FOUND)
        .header("location", "/")
        .cookie(&clear_auth_cookie())
        .no_body()
}

async fn dashboard(req: Request, _params: PathParams) -> Response {
    let email = req.auth().email.as_deref().unwrap_or("?");
    Response::html(format!("<h1>Welcome back, {email}</h1>"))
}

async fn admin_home(_req: Request, _params: PathParams) -> &'static str {
    "admin area"
}

#[derive(Serialize)]
struct ApiUser {
    id: Option<u64>,
    email: Option<String>,
    role: Option<String>,
}

async fn api_user(req: Request, _params: PathParams) -> Json<ApiUser> {
    let auth = req.auth();
    Json(ApiUser { id: auth.user_id, email: auth.email.clone(), role: auth.role.clone() })
}

struct Posts;

impl ResourceController for Posts {
    async fn index(&self, _req: Request, _params: PathParams) -> Response {
        Response::html("<ul><li>First post</li></ul>")
    }

    async fn show(&self, _req: Request, params: PathParams) -> Response {
        match params.parse::<u64>("id") {
            Ok(id) => Response::html(format!("<h1>Post {id}</h1>")),
            Err(_) => Response::status(StatusCode::NOT_FOUND),
        }
    }

    async fn destroy(&self, _req: Request, params: PathParams) -> Response {
        info!(post = params.get("id"), "deleting post");
        Response::redirect("/posts")
    }
}
