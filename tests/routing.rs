use std::panic::{AssertUnwindSafe, catch_unwind};

use kiln::middleware::Outcome;
use kiln::{
    Error, GroupAttributes, Method, PathParams, Request, ResourceController, Response, RouteBuilder,
    StatusCode,
};

async fn ok(_req: Request, _params: PathParams) -> &'static str {
    "ok"
}

async fn echo_post_id(_req: Request, params: PathParams) -> Response {
    match params.parse::<u64>("post_id") {
        Ok(id) => Response::text(id.to_string()),
        Err(_) => Response::status(StatusCode::BAD_REQUEST),
    }
}

async fn echo_method(req: Request, _params: PathParams) -> String {
    req.method().to_string()
}

fn body(res: &Response) -> &str {
    std::str::from_utf8(res.body()).unwrap()
}

#[test]
fn named_prefix_group_resolves_index_route() {
    let mut routes = RouteBuilder::new();
    routes.prefix("posts").name("posts.").group(|r| {
        r.get("/", ok).name("index");
    });

    let def = routes.definitions().next().unwrap();
    assert_eq!(def.path(), "/posts");
    assert_eq!(def.name(), Some("posts.index"));

    let router = routes.build().unwrap();
    assert_eq!(router.url("posts.index", &[]).unwrap(), "/posts");
}

#[test]
fn nested_groups_concatenate_outermost_first() {
    let mut routes = RouteBuilder::new();
    routes.middleware(["auth"]).name("admin.").prefix("admin").group(|r| {
        r.middleware("admin").name("users.").prefix("users").group(|r| {
            r.get("/{user_id}", ok).middleware(["auth", "audit"]).name("show");
        });
    });

    let def = routes.definitions().next().unwrap();
    assert_eq!(def.path(), "/admin/users/{user_id}");
    assert_eq!(def.name(), Some("admin.users.show"));
    assert_eq!(def.middleware(), ["auth", "admin", "auth", "audit"]);
}

#[test]
fn siblings_do_not_inherit_each_other() {
    let mut routes = RouteBuilder::new();
    routes.prefix("a").middleware("auth").group(|r| {
        r.get("/x", ok);
    });
    routes.prefix("b").group(|r| {
        r.get("/y", ok);
    });
    routes.get("/z", ok);

    let defs: Vec<_> = routes.definitions().cloned().collect();
    assert_eq!(defs[0].path(), "/a/x");
    assert_eq!(defs[0].middleware(), ["auth"]);
    assert_eq!(defs[1].path(), "/b/y");
    assert!(defs[1].middleware().is_empty());
    assert_eq!(defs[2].path(), "/z");
    assert!(routes.current_group().is_none());
}

#[test]
fn group_stack_is_restored_after_panicking_callback() {
    let mut routes = RouteBuilder::new();
    let result = catch_unwind(AssertUnwindSafe(|| {
        routes.prefix("broken").middleware("auth").group(|r| {
            r.prefix("deeper").group(|_| panic!("declaration failed"));
        });
    }));
    assert!(result.is_err());
    assert!(routes.current_group().is_none());

    routes.get("/after", ok);
    let def = routes.definitions().last().unwrap();
    assert_eq!(def.path(), "/after");
    assert!(def.middleware().is_empty());
}

#[test]
fn group_with_attribute_set() {
    let mut routes = RouteBuilder::new();
    let attrs = GroupAttributes::new().prefix("api/v1").name("api.").middleware("auth").namespace("Api");
    routes.group_with(attrs, |r| {
        r.get("/users", ok).name("users");
    });

    let def = routes.definitions().next().unwrap();
    assert_eq!(def.path(), "/api/v1/users");
    assert_eq!(def.name(), Some("api.users"));
    assert_eq!(def.namespace(), Some("Api"));
}

#[test]
fn later_chained_calls_replace_earlier_ones() {
    let mut routes = RouteBuilder::new();
    routes.get("/x", ok).middleware("a").middleware(["b"]).name("first").name("second");

    let def = routes.definitions().next().unwrap();
    assert_eq!(def.middleware(), ["b"]);
    assert_eq!(def.name(), Some("second"));
}

#[test]
fn duplicate_route_names_fail_the_build() {
    let mut routes = RouteBuilder::new();
    routes.get("/a", ok).name("home");
    routes.get("/b", ok).name("home");
    assert!(matches!(routes.build(), Err(Error::DuplicateRouteName(name)) if name == "home"));
}

#[test]
fn reverse_resolution() {
    let mut routes = RouteBuilder::new();
    routes.get("/posts/{post_id}", ok).name("posts.show");
    let router = routes.build().unwrap();

    assert_eq!(router.url("posts.show", &[("post_id", &7)]).unwrap(), "/posts/7");
    assert!(matches!(router.url("nonexistent.route", &[]), Err(Error::RouteNotFound(_))));
}

#[tokio::test]
async fn dispatch_extracts_path_parameters() {
    let mut routes = RouteBuilder::new();
    routes.prefix("posts").group(|r| {
        r.get("/{post_id}/edit", echo_post_id);
    });
    let router = routes.build().unwrap();

    let res = router.dispatch(Request::new(Method::Get, "/posts/42/edit")).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(body(&res), "42");

    let res = router.dispatch(Request::new(Method::Get, "/posts/nope/edit")).await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unmatched_requests_are_not_found() {
    let mut routes = RouteBuilder::new();
    routes.get("/posts", ok);
    let router = routes.build().unwrap();

    assert_eq!(router.dispatch(Request::new(Method::Get, "/missing")).await.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(router.dispatch(Request::new(Method::Delete, "/posts")).await.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn form_method_override_reaches_delete_route() {
    let mut routes = RouteBuilder::new();
    routes.post("/posts/{post_id}", echo_method);
    routes.delete("/posts/{post_id}", echo_method);
    let router = routes.build().unwrap();

    let spoofed = Request::new(Method::Post, "/posts/1").with_form([("_method", "DELETE")]);
    assert_eq!(body(&router.dispatch(spoofed).await), "DELETE");

    let json = Request::new(Method::Post, "/posts/1")
        .with_header("content-type", "application/json")
        .with_body(r#"{"_method":"DELETE"}"#);
    assert_eq!(body(&router.dispatch(json).await), "POST");
}

#[tokio::test]
async fn method_override_can_be_disabled() {
    let mut routes = RouteBuilder::new();
    routes.method_override(false);
    routes.post("/posts/{post_id}", echo_method);
    let router = routes.build().unwrap();

    let spoofed = Request::new(Method::Post, "/posts/1").with_form([("_method", "DELETE")]);
    assert_eq!(body(&router.dispatch(spoofed).await), "POST");
}

#[tokio::test]
async fn policies_halt_or_fail_the_request() {
    let mut routes = RouteBuilder::new();
    routes
        .policy("closed", |_: &Request| -> Result<Outcome, Error> {
            Ok(Outcome::Halt(Response::status(StatusCode::SERVICE_UNAVAILABLE)))
        })
        .policy("broken", |_: &Request| -> Result<Outcome, Error> {
            Err(Error::middleware("broken", "lookup failed"))
        })
        .policy("open", |_: &Request| -> Result<Outcome, Error> { Ok(Outcome::Continue) });
    routes.get("/closed", ok).middleware(["open", "closed", "broken"]);
    routes.get("/broken", ok).middleware("broken");
    routes.get("/open", ok).middleware("open");
    let router = routes.build().unwrap();

    let res = router.dispatch(Request::new(Method::Get, "/closed")).await;
    assert_eq!(res.status_code(), StatusCode::SERVICE_UNAVAILABLE);

    let res = router.dispatch(Request::new(Method::Get, "/broken")).await;
    assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

    let res = router.dispatch(Request::new(Method::Get, "/open")).await;
    assert_eq!(body(&res), "ok");
}

struct Todos;

impl ResourceController for Todos {
    async fn index(&self, _req: Request, _params: PathParams) -> Response {
        Response::text("index")
    }

    async fn show(&self, _req: Request, params: PathParams) -> Response {
        Response::text(format!("show {}", params.get("id").unwrap_or("?")))
    }

    async fn destroy(&self, _req: Request, params: PathParams) -> Response {
        Response::text(format!("destroy {}", params.get("id").unwrap_or("?")))
    }
}

#[tokio::test]
async fn resource_registers_seven_named_routes() {
    let mut routes = RouteBuilder::new();
    routes.middleware("auth").name("app.").group(|r| {
        r.resource("todos", Todos);
    });

    let listed: Vec<(Method, String, Option<String>)> = routes
        .definitions()
        .map(|d| (d.method(), d.path().to_owned(), d.name().map(str::to_owned)))
        .collect();
    let expected = [
        (Method::Get, "/todos", "app.todos.index"),
        (Method::Get, "/todos/create", "app.todos.create"),
        (Method::Post, "/todos", "app.todos.store"),
        (Method::Get, "/todos/{id}", "app.todos.show"),
        (Method::Get, "/todos/{id}/edit", "app.todos.edit"),
        (Method::Put, "/todos/{id}", "app.todos.update"),
        (Method::Delete, "/todos/{id}", "app.todos.destroy"),
    ];
    assert_eq!(listed.len(), expected.len());
    for ((method, path, name), (m, p, n)) in listed.iter().zip(expected) {
        assert_eq!((*method, path.as_str(), name.as_deref()), (m, p, Some(n)));
    }
    assert!(routes.definitions().all(|d| d.middleware() == ["auth"]));
}

#[tokio::test]
async fn resource_actions_dispatch() {
    let mut routes = RouteBuilder::new();
    routes.resource("todos", Todos);
    let router = routes.build().unwrap();

    assert_eq!(body(&router.dispatch(Request::new(Method::Get, "/todos")).await), "index");
    assert_eq!(body(&router.dispatch(Request::new(Method::Get, "/todos/5")).await), "show 5");
    assert_eq!(body(&router.dispatch(Request::new(Method::Delete, "/todos/5")).await), "destroy 5");
    assert_eq!(
        body(&router.dispatch(Request::new(Method::Get, "/todos/create")).await),
        "",
        "create is not overridden and answers an empty 404"
    );
    assert_eq!(
        router.dispatch(Request::new(Method::Get, "/todos/create")).await.status_code(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(router.url("todos.edit", &[("id", &5)]).unwrap(), "/todos/5/edit");
}
