//! # wend
//!
//! An in-process HTTP request router. Give it `(method, pattern, handler)`
//! triples; for every request it picks the single most specific route,
//! extracts path parameters and runs the handler through its middleware.
//!
//! ## Patterns
//!
//! - `users`: literal segment
//! - `{id}`: named parameter, one segment, read with [`Request::param`]
//! - `*`: trailing wildcard, one or more segments
//!
//! Precedence is literal, then parameter, then wildcard, at every level, with
//! backtracking: a parameter route only wins if it leads to a full match.
//! Repeated slashes are ignored and `.`/`..` segments are resolved before
//! lookup.
//!
//! ## Middleware
//!
//! Middleware is a handler-to-handler transformation, composed as an onion
//! (first registered runs first on the way in, last on the way out). It can be
//! installed on the root router, on (nested, optionally prefixed) groups, or
//! for a single route via `with`. Each route captures its chain at
//! registration time. Root middleware also wraps the router's own 404, 405,
//! auto-OPTIONS and redirect answers.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use wend::{Request, Response, Router, Server, StatusCode, middleware};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut app = Router::new();
//!     app.use_middleware(middleware::trace())
//!         .redirect_trailing_slash(true);
//!
//!     app.get("/users/{id}", get_user)
//!         .post("/users", create_user);
//!
//!     app.group_with_prefix("/admin", |admin| {
//!         admin.use_middleware(middleware::from_fn(|req: Request, next: middleware::Next| async move {
//!             if req.header("authorization").is_none() {
//!                 return Response::status(StatusCode::UNAUTHORIZED);
//!             }
//!             next.run(req).await
//!         }));
//!         admin.delete("/users/{id}", delete_user);
//!     });
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#))
//! }
//!
//! async fn create_user(req: Request) -> Response {
//!     if req.body().is_empty() {
//!         return Response::status(StatusCode::BAD_REQUEST);
//!     }
//!     Response::builder()
//!         .status(StatusCode::CREATED)
//!         .header("location", "/users/99")
//!         .json(r#"{"id":"99"}"#)
//! }
//!
//! async fn delete_user(_req: Request) -> StatusCode {
//!     StatusCode::NO_CONTENT
//! }
//! ```

mod error;
mod handler;
mod method;
mod path;
mod request;
mod response;
mod router;
mod server;
mod trie;

pub mod middleware;

pub use error::{Error, RouteError};
pub use handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler};
pub use http::StatusCode;
pub use method::Method;
pub use middleware::Middleware;
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use router::{Group, Router};
pub use server::Server;
