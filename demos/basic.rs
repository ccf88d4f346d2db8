//! Small wend app: JSON user endpoints, an authenticated admin group and
//! request tracing.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/users/42
//!   curl -i http://localhost:3000/users/42/          # 301 to /users/42
//!   curl -i -X POST http://localhost:3000/users -d '{"name":"alice"}'
//!   curl -i -X PATCH http://localhost:3000/users/42  # 405, Allow: GET, HEAD, OPTIONS
//!   curl -i -X OPTIONS http://localhost:3000/users/42
//!   curl -i -X DELETE http://localhost:3000/admin/users/42 -H 'authorization: Bearer x'
//!   curl -i http://localhost:3000/assets/css/site.css

use wend::middleware::{self, Next};
use wend::{Request, Response, Router, Server, StatusCode};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let mut app = Router::new();
    app.use_middleware(middleware::trace())
        .redirect_trailing_slash(true)
        .not_found(|req: Request| async move {
            Response::builder()
                .status(StatusCode::NOT_FOUND)
                .json(format!(r#"{{"error":"no route for {}"}}"#, req.path()))
        });

    app.get("/users/{id}", get_user)
        .post("/users", create_user)
        .get("/assets/*", asset);

    app.group_with_prefix("/admin", |admin| {
        admin.use_middleware(middleware::from_fn(require_auth));
        admin.delete("/users/{id}", delete_user);
    });

    if let Err(e) = Server::bind("0.0.0.0:3000").serve(app).await {
        tracing::error!("server error: {e}");
    }
}

async fn require_auth(req: Request, next: Next) -> Response {
    if req.header("authorization").is_none() {
        return Response::status(StatusCode::UNAUTHORIZED);
    }
    next.run(req).await
}

// GET /users/{id}
async fn get_user(req: Request) -> Response {
    let id = req.param("id").unwrap_or("unknown");
    Response::json(format!(r#"{{"id":"{id}","name":"alice"}}"#))
}

// POST /users
async fn create_user(req: Request) -> Response {
    if req.body().is_empty() {
        return Response::status(StatusCode::BAD_REQUEST);
    }
    Response::builder()
        .status(StatusCode::CREATED)
        .header("location", "/users/99")
        .json(r#"{"id":"99","name":"alice"}"#)
}

// DELETE /admin/users/{id}
async fn delete_user(_req: Request) -> StatusCode {
    StatusCode::NO_CONTENT
}

// GET /assets/*
async fn asset(req: Request) -> String {
    format!("asset {}", req.param("*").unwrap_or_default())
}
