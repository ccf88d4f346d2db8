//! Router facade: registration, grouping, dispatch.
//!
//! One [`Router`] owns one segment trie. [`Group`]s are short-lived views onto
//! that same trie, each carrying its own path prefix and its own snapshot of
//! the middleware chain. A group never outlives the closure it was handed to;
//! all it leaves behind is what it wrote into the trie.
//!
//! ```rust
//! use wend::{Request, Response, Router, middleware};
//!
//! let mut router = Router::new();
//! router.use_middleware(middleware::trace());
//!
//! router.get("/healthz", |_req: Request| async { "ok" });
//! router.group_with_prefix("/api/v1", |api| {
//!     api.get("/users/{id}", get_user);
//!     api.post("/users", create_user);
//! });
//!
//! async fn get_user(req: Request) -> Response {
//!     Response::text(format!("user {}", req.param("id").unwrap_or("?")))
//! }
//! async fn create_user(_req: Request) -> Response {
//!     Response::text("created")
//! }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use http::StatusCode;
use tracing::{debug, trace};

use crate::error::RouteError;
use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler};
use crate::method::{self, Method};
use crate::middleware::{Middleware, compose};
use crate::path::normalize;
use crate::request::Request;
use crate::response::Response;
use crate::trie::{Node, Trie};

/// The application router.
///
/// Build it once at startup through `&mut self`, then share it (`Arc<Router>`)
/// and call [`Router::dispatch`] from as many tasks as you like.
pub struct Router {
    routes: Trie,
    chain: Vec<Middleware>,
    not_found: BoxedHandler,
    method_not_allowed: BoxedHandler,
    options: BoxedHandler,
    redirect_trailing_slash: bool,
    fallbacks: OnceLock<Fallbacks>,
    dispatched: AtomicBool,
}

/// The router's own handlers, wrapped in the root middleware chain.
struct Fallbacks {
    not_found: BoxedHandler,
    method_not_allowed: BoxedHandler,
    options: BoxedHandler,
    redirect: BoxedHandler,
}

enum Outcome<'r> {
    NotFound,
    Redirect,
    MethodNotAllowed(&'r Node),
    Matched(&'r Node, &'r BoxedHandler, Vec<(String, String)>),
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: Trie::new(),
            chain: Vec::new(),
            not_found: not_found.into_boxed_handler(),
            method_not_allowed: method_not_allowed.into_boxed_handler(),
            options: auto_options.into_boxed_handler(),
            redirect_trailing_slash: false,
            fallbacks: OnceLock::new(),
            dispatched: AtomicBool::new(false),
        }
    }

    // ── Configuration ────────────────────────────────────────────────────────

    /// Redirect `/path/` to `/path` when `/path` is registered.
    ///
    /// `GET` gets `301 Moved Permanently`, every other method `308 Permanent
    /// Redirect` so the method and body survive. Off by default, in which case
    /// `/path/` is simply served by `/path`.
    pub fn redirect_trailing_slash(&mut self, enabled: bool) -> &mut Self {
        self.redirect_trailing_slash = enabled;
        self
    }

    /// Handler for paths no route matches. Default: `404` with a short text body.
    pub fn not_found(&mut self, handler: impl Handler) -> &mut Self {
        self.not_found = handler.into_boxed_handler();
        self.fallbacks = OnceLock::new();
        self
    }

    /// Handler for a matched path without a handler for the request method.
    /// Default: `405` with a short text body. The `Allow` header is set by the
    /// router unless the handler sets one itself.
    pub fn method_not_allowed(&mut self, handler: impl Handler) -> &mut Self {
        self.method_not_allowed = handler.into_boxed_handler();
        self.fallbacks = OnceLock::new();
        self
    }

    /// Handler for `OPTIONS` on a matched path that has no explicit `OPTIONS`
    /// route. Default: empty `204`. `Allow` is handled as for
    /// [`method_not_allowed`](Router::method_not_allowed).
    pub fn options_handler(&mut self, handler: impl Handler) -> &mut Self {
        self.options = handler.into_boxed_handler();
        self.fallbacks = OnceLock::new();
        self
    }

    // ── Middleware ───────────────────────────────────────────────────────────

    /// Appends `mw` to the root chain.
    ///
    /// Applies to every route registered afterwards and to the router's own
    /// 404 / 405 / OPTIONS / redirect answers.
    ///
    /// # Panics
    ///
    /// Panics once the router has dispatched a request; see
    /// [`try_use_middleware`](Router::try_use_middleware).
    pub fn use_middleware(&mut self, mw: Middleware) -> &mut Self {
        self.try_use_middleware(mw).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Appends `mw` to the root chain, or fails with
    /// [`RouteError::MiddlewareAfterDispatch`] once the router has dispatched
    /// a request. Replacing a fallback handler does not lift that.
    pub fn try_use_middleware(&mut self, mw: Middleware) -> Result<&mut Self, RouteError> {
        if *self.dispatched.get_mut() {
            return Err(RouteError::MiddlewareAfterDispatch);
        }
        self.chain.push(mw);
        Ok(self)
    }

    /// A one-off view with `mws` appended, in order, to a copy of the root
    /// chain. The router itself is unchanged.
    ///
    /// ```rust
    /// # use wend::{Request, Router, middleware};
    /// # let mut router = Router::new();
    /// router.with([middleware::trace()]).get("/traced", |_req: Request| async { "ok" });
    /// ```
    pub fn with(&mut self, mws: impl IntoIterator<Item = Middleware>) -> Group<'_> {
        let mut chain = self.chain.clone();
        chain.extend(mws);
        Group { routes: &mut self.routes, prefix: String::new(), chain }
    }

    // ── Grouping ─────────────────────────────────────────────────────────────

    /// Runs `f` with a group that starts from a snapshot of the root chain.
    pub fn group(&mut self, f: impl FnOnce(&mut Group<'_>)) -> &mut Self {
        f(&mut self.scope());
        self
    }

    /// Like [`group`](Router::group), with `prefix` prepended to every pattern.
    pub fn group_with_prefix(&mut self, prefix: &str, f: impl FnOnce(&mut Group<'_>)) -> &mut Self {
        self.scope().group_with_prefix(prefix, f);
        self
    }

    // ── Registration ─────────────────────────────────────────────────────────

    /// See [`Group::handle`].
    pub fn handle(&mut self, pattern: &str, methods: &[&str], handler: impl Handler) -> &mut Self {
        self.scope().handle(pattern, methods, handler);
        self
    }

    /// See [`Group::try_handle`].
    pub fn try_handle(
        &mut self,
        pattern: &str,
        methods: &[&str],
        handler: impl Handler,
    ) -> Result<&mut Self, RouteError> {
        self.scope().try_handle(pattern, methods, handler)?;
        Ok(self)
    }

    /// See [`Group::on`].
    pub fn on(&mut self, method: Method, pattern: &str, handler: impl Handler) -> &mut Self {
        self.scope().on(method, pattern, handler);
        self
    }

    /// See [`Group::any`].
    pub fn any(&mut self, pattern: &str, handler: impl Handler) -> &mut Self {
        self.scope().any(pattern, handler);
        self
    }

    pub fn get(&mut self, pattern: &str, handler: impl Handler) -> &mut Self {
        self.on(Method::Get, pattern, handler)
    }

    pub fn head(&mut self, pattern: &str, handler: impl Handler) -> &mut Self {
        self.on(Method::Head, pattern, handler)
    }

    pub fn post(&mut self, pattern: &str, handler: impl Handler) -> &mut Self {
        self.on(Method::Post, pattern, handler)
    }

    pub fn put(&mut self, pattern: &str, handler: impl Handler) -> &mut Self {
        self.on(Method::Put, pattern, handler)
    }

    pub fn patch(&mut self, pattern: &str, handler: impl Handler) -> &mut Self {
        self.on(Method::Patch, pattern, handler)
    }

    pub fn delete(&mut self, pattern: &str, handler: impl Handler) -> &mut Self {
        self.on(Method::Delete, pattern, handler)
    }

    pub fn options(&mut self, pattern: &str, handler: impl Handler) -> &mut Self {
        self.on(Method::Options, pattern, handler)
    }

    fn scope(&mut self) -> Group<'_> {
        Group { routes: &mut self.routes, prefix: String::new(), chain: self.chain.clone() }
    }

    // ── Dispatch ─────────────────────────────────────────────────────────────

    /// Routes one request and runs whichever handler it resolves to.
    ///
    /// Exactly one of these answers: the matched route, the not-found handler,
    /// a trailing-slash redirect, the auto-OPTIONS handler, or the
    /// method-not-allowed handler.
    pub async fn dispatch(&self, mut req: Request) -> Response {
        let fallbacks = self.fallbacks();

        match self.route(&req) {
            Outcome::Matched(node, handler, params) => {
                req.matched(node.pattern(), params);
                handler.call(req).await
            }
            Outcome::NotFound => fallbacks.not_found.call(req).await,
            Outcome::Redirect => fallbacks.redirect.call(req).await,
            Outcome::MethodNotAllowed(node) => {
                req.matched(node.pattern(), Vec::new());
                req.set_allow(node.allow());
                if req.method() == Method::Options.as_str() {
                    fallbacks.options.call(req).await
                } else {
                    fallbacks.method_not_allowed.call(req).await
                }
            }
        }
    }

    fn route(&self, req: &Request) -> Outcome<'_> {
        let raw = req.path();
        let path = normalize(raw);

        let Some(found) = self.routes.lookup(&path) else {
            trace!(path = raw, "no route matched");
            return Outcome::NotFound;
        };

        if self.redirect_trailing_slash && path != "/" && raw.ends_with('/') {
            trace!(path = raw, location = %path, "redirecting trailing slash");
            return Outcome::Redirect;
        }

        let handler = req
            .method()
            .parse::<Method>()
            .ok()
            .and_then(|m| found.node.handler(m));
        match handler {
            Some(handler) => {
                let params = found
                    .params
                    .iter()
                    .map(|&(k, v)| (k.to_owned(), v.to_owned()))
                    .collect();
                Outcome::Matched(found.node, handler, params)
            }
            None => {
                trace!(path = raw, method = req.method(), "method not allowed");
                Outcome::MethodNotAllowed(found.node)
            }
        }
    }

    fn fallbacks(&self) -> &Fallbacks {
        self.dispatched.store(true, Ordering::Relaxed);
        self.fallbacks.get_or_init(|| Fallbacks {
            not_found: compose(&self.chain, self.not_found.clone()),
            method_not_allowed: compose(&self.chain, with_allow(self.method_not_allowed.clone())),
            options: compose(&self.chain, with_allow(self.options.clone())),
            redirect: compose(&self.chain, redirect.into_boxed_handler()),
        })
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

/// A registration view onto a [`Router`]'s trie.
///
/// Obtained from [`Router::group`], [`Router::group_with_prefix`],
/// [`Router::with`] and their `Group` counterparts. Every route registered
/// through a group is wrapped in the group's chain *as it is at that moment*:
/// middleware added later does not reach routes registered earlier, and
/// nothing added inside a group leaks out of it.
pub struct Group<'r> {
    routes: &'r mut Trie,
    prefix: String,
    chain: Vec<Middleware>,
}

impl Group<'_> {
    /// Appends `mw` to this group's chain.
    pub fn use_middleware(&mut self, mw: Middleware) -> &mut Self {
        self.chain.push(mw);
        self
    }

    /// A one-off view with `mws` appended, in order, to a copy of this
    /// group's chain.
    pub fn with(&mut self, mws: impl IntoIterator<Item = Middleware>) -> Group<'_> {
        let mut chain = self.chain.clone();
        chain.extend(mws);
        Group { routes: &mut *self.routes, prefix: self.prefix.clone(), chain }
    }

    /// Runs `f` with a nested group starting from a snapshot of this group's
    /// chain and prefix.
    pub fn group(&mut self, f: impl FnOnce(&mut Group<'_>)) -> &mut Self {
        let mut sub = Group {
            routes: &mut *self.routes,
            prefix: self.prefix.clone(),
            chain: self.chain.clone(),
        };
        f(&mut sub);
        self
    }

    /// Like [`group`](Group::group), with `prefix` appended to this group's prefix.
    pub fn group_with_prefix(&mut self, prefix: &str, f: impl FnOnce(&mut Group<'_>)) -> &mut Self {
        let mut sub = Group {
            routes: &mut *self.routes,
            prefix: format!("{}{prefix}", self.prefix),
            chain: self.chain.clone(),
        };
        f(&mut sub);
        self
    }

    /// Registers `handler` at `pattern` for the given method tokens.
    ///
    /// Tokens are case-insensitive. `GET` also registers `HEAD`; an empty
    /// list registers every method in [`Method::ALL`].
    ///
    /// # Panics
    ///
    /// Panics on a configuration error; see [`try_handle`](Group::try_handle).
    pub fn handle(&mut self, pattern: &str, methods: &[&str], handler: impl Handler) -> &mut Self {
        self.try_handle(pattern, methods, handler)
            .unwrap_or_else(|e| panic!("{e}"))
    }

    /// Registers `handler`, returning configuration errors: an unknown method
    /// token, an empty `{}` parameter, two parameter names at the same level,
    /// or a `*` that is not the last segment.
    pub fn try_handle(
        &mut self,
        pattern: &str,
        methods: &[&str],
        handler: impl Handler,
    ) -> Result<&mut Self, RouteError> {
        let methods = methods
            .iter()
            .map(|token| {
                Method::from_token(token).ok_or_else(|| RouteError::UnknownMethod((*token).to_owned()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.insert(pattern, methods, handler.into_boxed_handler())?;
        Ok(self)
    }

    /// Registers `handler` for one method (`GET` also registers `HEAD`).
    ///
    /// # Panics
    ///
    /// Panics on a malformed pattern.
    pub fn on(&mut self, method: Method, pattern: &str, handler: impl Handler) -> &mut Self {
        self.insert(pattern, vec![method], handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("{e}"));
        self
    }

    /// Registers `handler` for every method in [`Method::ALL`].
    pub fn any(&mut self, pattern: &str, handler: impl Handler) -> &mut Self {
        self.insert(pattern, Vec::new(), handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("{e}"));
        self
    }

    pub fn get(&mut self, pattern: &str, handler: impl Handler) -> &mut Self {
        self.on(Method::Get, pattern, handler)
    }

    pub fn head(&mut self, pattern: &str, handler: impl Handler) -> &mut Self {
        self.on(Method::Head, pattern, handler)
    }

    pub fn post(&mut self, pattern: &str, handler: impl Handler) -> &mut Self {
        self.on(Method::Post, pattern, handler)
    }

    pub fn put(&mut self, pattern: &str, handler: impl Handler) -> &mut Self {
        self.on(Method::Put, pattern, handler)
    }

    pub fn patch(&mut self, pattern: &str, handler: impl Handler) -> &mut Self {
        self.on(Method::Patch, pattern, handler)
    }

    pub fn delete(&mut self, pattern: &str, handler: impl Handler) -> &mut Self {
        self.on(Method::Delete, pattern, handler)
    }

    pub fn options(&mut self, pattern: &str, handler: impl Handler) -> &mut Self {
        self.on(Method::Options, pattern, handler)
    }

    fn insert(
        &mut self,
        pattern: &str,
        methods: Vec<Method>,
        handler: BoxedHandler,
    ) -> Result<(), RouteError> {
        let pattern = format!("{}{pattern}", self.prefix);
        let methods = method::expand(methods);
        self.routes.insert(&pattern, &methods, compose(&self.chain, handler))?;
        debug!(
            pattern = %pattern,
            methods = ?methods,
            middleware = self.chain.len(),
            "route registered"
        );
        Ok(())
    }
}

// ── Built-in handlers ────────────────────────────────────────────────────────

/// Innermost layer of the 405 and OPTIONS fallbacks: fills in `Allow` from
/// the request unless the handler set one, so root middleware sees it.
fn with_allow(handler: BoxedHandler) -> BoxedHandler {
    Arc::new(AllowHeader(handler))
}

struct AllowHeader(BoxedHandler);

impl ErasedHandler for AllowHeader {
    fn call(&self, req: Request) -> BoxFuture {
        let allow = req.allow().map(str::to_owned);
        let pending = self.0.call(req);
        Box::pin(async move {
            let mut res = pending.await;
            if let Some(allow) = allow {
                res.set_header_if_absent("allow", &allow);
            }
            res
        })
    }
}

async fn not_found(_req: Request) -> Response {
    Response::builder().status(StatusCode::NOT_FOUND).text("404 page not found")
}

async fn method_not_allowed(_req: Request) -> Response {
    Response::builder().status(StatusCode::METHOD_NOT_ALLOWED).text("405 method not allowed")
}

async fn auto_options(_req: Request) -> Response {
    Response::status(StatusCode::NO_CONTENT)
}

async fn redirect(req: Request) -> Response {
    let code = if req.method() == Method::Get.as_str() {
        StatusCode::MOVED_PERMANENTLY
    } else {
        StatusCode::PERMANENT_REDIRECT
    };
    let path = normalize(req.path());
    let location = match req.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.into_owned(),
    };
    Response::redirect(code, &location)
}
