//! Route handlers and their erased form.
//!
//! A route handler is any `async fn(Request) -> impl IntoResponse`. Routes
//! with different handler types share one method table per trie node, and
//! a middleware must be able to wrap any of them, so each handler is erased
//! exactly once, when it is registered:
//!
//! ```text
//! router.get("/", hello)
//!   hello.into_boxed_handler()     Arc<Erased<hello>>
//!   compose(chain, handler)        Arc<FromFn<..>> around Arc<FromFn<..>> around ..
//!   trie node method table         [Option<BoxedHandler>; 9]
//! ```
//!
//! At request time that costs one virtual call and one boxed future per
//! layer.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// The future every erased handler returns.
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Object-safe handler interface.
///
/// Route handlers never implement this themselves; it is the seam raw
/// [`Middleware`](crate::Middleware) transformations work against.
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// What the trie stores and what a middleware receives and returns.
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// A value that can be registered as a route handler.
///
/// Implemented for every `Fn(Request) -> impl Future<Output = impl IntoResponse>`
/// that can be shared across threads: `async fn` items and closures returning
/// an `async` block alike.
pub trait Handler: sealed::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod sealed {
    use std::future::Future;

    use crate::request::Request;

    pub trait Sealed {}

    impl<F, Fut> Sealed for F
    where
        F: Fn(Request) -> Fut,
        Fut: Future,
    {
    }
}

impl<F, Fut> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: IntoResponse,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(Erased(self))
    }
}

struct Erased<F>(F);

impl<F, Fut> ErasedHandler for Erased<F>
where
    F: Fn(Request) -> Fut,
    Fut: Future + Send + 'static,
    Fut::Output: IntoResponse,
{
    fn call(&self, req: Request) -> BoxFuture {
        let pending = (self.0)(req);
        Box::pin(async move { pending.await.into_response() })
    }
}
