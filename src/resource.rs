//! Resource controllers: the seven conventional CRUD routes in one call.
//!
//! `routes.resource("todos", TodoController)` registers, relative to the
//! enclosing group:
//!
//! | method | path | action | name |
//! |---|---|---|---|
//! | GET | `/todos` | `index` | `todos.index` |
//! | GET | `/todos/create` | `create` | `todos.create` |
//! | POST | `/todos` | `store` | `todos.store` |
//! | GET | `/todos/{id}` | `show` | `todos.show` |
//! | GET | `/todos/{id}/edit` | `edit` | `todos.edit` |
//! | PUT | `/todos/{id}` | `update` | `todos.update` |
//! | DELETE | `/todos/{id}` | `destroy` | `todos.destroy` |
//!
//! Names get the group's name prefix; middleware is inherited from the
//! group. Actions a controller does not override answer `404`.

use std::future::Future;

use http::StatusCode;

use crate::params::PathParams;
use crate::request::Request;
use crate::response::Response;

/// Path parameter naming the resource in member routes.
pub const RESOURCE_ID: &str = "id";

pub trait ResourceController: Send + Sync + 'static {
    fn index(&self, _req: Request, _params: PathParams) -> impl Future<Output = Response> + Send {
        async { Response::status(StatusCode::NOT_FOUND) }
    }

    fn create(&self, _req: Request, _params: PathParams) -> impl Future<Output = Response> + Send {
        async { Response::status(StatusCode::NOT_FOUND) }
    }

    fn store(&self, _req: Request, _params: PathParams) -> impl Future<Output = Response> + Send {
        async { Response::status(StatusCode::NOT_FOUND) }
    }

    fn show(&self, _req: Request, _params: PathParams) -> impl Future<Output = Response> + Send {
        async { Response::status(StatusCode::NOT_FOUND) }
    }

    fn edit(&self, _req: Request, _params: PathParams) -> impl Future<Output = Response> + Send {
        async { Response::status(StatusCode::NOT_FOUND) }
    }

    fn update(&self, _req: Request, _params: PathParams) -> impl Future<Output = Response> + Send {
        async { Response::status(StatusCode::NOT_FOUND) }
    }

    fn destroy(&self, _req: Request, _params: PathParams) -> impl Future<Output = Response> + Send {
        async { Response::status(StatusCode::NOT_FOUND) }
    }
}
