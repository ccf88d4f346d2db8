//! Middleware layer.
//!
//! A [`Middleware`] is a transformation from one [`BoxedHandler`] to another.
//! The wrapping handler can run code before delegating, after delegating, or
//! answer on its own without delegating at all.
//!
//! Chains compose as an onion: the first middleware registered is the
//! outermost layer. With `M1` then `M2`:
//!
//! ```text
//! M1 pre → M2 pre → handler → M2 post → M1 post
//! ```
//!
//! Most middleware is easiest to write with [`from_fn`]:
//!
//! ```rust
//! use wend::{Request, Response, StatusCode, middleware::{self, Next}};
//!
//! let auth = middleware::from_fn(|req: Request, next: Next| async move {
//!     if req.header("authorization").is_none() {
//!         return Response::status(StatusCode::UNAUTHORIZED);
//!     }
//!     next.run(req).await
//! });
//! ```
//!
//! Built-in middleware:
//! - [`trace()`]: per-request span with method, path, status, latency

mod trace;

pub use trace::trace;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler};
use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A handler-to-handler transformation.
///
/// Cheap to clone: the same middleware can be installed on many routers and
/// groups.
#[derive(Clone)]
pub struct Middleware(Arc<dyn Fn(BoxedHandler) -> BoxedHandler + Send + Sync>);

impl Middleware {
    /// Wraps a raw transformation.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(BoxedHandler) -> BoxedHandler + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Applies this middleware around `inner`.
    pub fn wrap(&self, inner: BoxedHandler) -> BoxedHandler {
        (self.0)(inner)
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Middleware")
    }
}

/// Wraps `handler` in `chain`, first element outermost.
pub(crate) fn compose(chain: &[Middleware], handler: BoxedHandler) -> BoxedHandler {
    chain.iter().rev().fold(handler, |inner, mw| mw.wrap(inner))
}

/// The rest of the chain, handed to a [`from_fn`] middleware.
pub struct Next {
    inner: BoxedHandler,
}

impl Next {
    /// Runs the inner handler (and every layer beneath it).
    pub async fn run(self, req: Request) -> Response {
        self.inner.call(req).await
    }
}

/// Builds a middleware from an async function of the request and the rest of
/// the chain.
pub fn from_fn<F, Fut, R>(f: F) -> Middleware
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    let f = Arc::new(f);
    Middleware::new(move |inner: BoxedHandler| -> BoxedHandler {
        Arc::new(FromFn { f: Arc::clone(&f), inner })
    })
}

struct FromFn<F> {
    f: Arc<F>,
    inner: BoxedHandler,
}

impl<F, Fut, R> ErasedHandler for FromFn<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let next = Next { inner: Arc::clone(&self.inner) };
        let fut = (self.f)(req, next);
        Box::pin(async move { fut.await.into_response() })
    }
}
