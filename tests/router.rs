use std::sync::{Arc, Mutex};

use wend::middleware::{self, Middleware, Next};
use wend::{Method, Request, Response, RouteError, Router, StatusCode};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

async fn ok(_req: Request) -> StatusCode {
    StatusCode::OK
}

fn body(res: &Response) -> &str {
    std::str::from_utf8(res.body()).unwrap()
}

async fn call(router: &Router, method: &str, path: &str) -> Response {
    router.dispatch(Request::new(method, path)).await
}

#[tokio::test]
async fn matching() {
    init_tracing();

    struct Case {
        methods: &'static [&'static str],
        pattern: &'static str,
        method: &'static str,
        path: &'static str,
        status: StatusCode,
        params: &'static [(&'static str, &'static str)],
    }

    let cases = [
        // exact
        Case { methods: &["GET"], pattern: "/ok", method: "GET", path: "/ok", status: StatusCode::OK, params: &[] },
        Case { methods: &["GET"], pattern: "/ok", method: "GET", path: "/not", status: StatusCode::NOT_FOUND, params: &[] },
        Case { methods: &["GET"], pattern: "/api/v1/status/ping", method: "GET", path: "/api/v1/status", status: StatusCode::NOT_FOUND, params: &[] },
        Case { methods: &["GET"], pattern: "/api/v1/status", method: "GET", path: "/api/v1/status/ping", status: StatusCode::NOT_FOUND, params: &[] },
        // empty segments
        Case { methods: &["GET"], pattern: "/api/v1/status", method: "GET", path: "/api///v1///status", status: StatusCode::OK, params: &[] },
        // dot segments
        Case { methods: &["GET"], pattern: "/api/v1/status", method: "GET", path: "/api/v2/../v1/./status", status: StatusCode::OK, params: &[] },
        // path params
        Case { methods: &["GET"], pattern: "/user/{id}", method: "GET", path: "/user/12", status: StatusCode::OK, params: &[("id", "12")] },
        Case { methods: &["GET"], pattern: "/user/{id}", method: "GET", path: "/user/12/profile", status: StatusCode::NOT_FOUND, params: &[] },
        Case { methods: &["GET"], pattern: "/user/{name}/{age}", method: "GET", path: "/user/name1/age1", status: StatusCode::OK, params: &[("name", "name1"), ("age", "age1")] },
        Case { methods: &["GET"], pattern: "/user/{name}/{age}", method: "GET", path: "/user/12", status: StatusCode::NOT_FOUND, params: &[] },
        // all methods
        Case { methods: &[], pattern: "/ok", method: "GET", path: "/ok", status: StatusCode::OK, params: &[] },
        Case { methods: &[], pattern: "/ok", method: "DELETE", path: "/ok", status: StatusCode::OK, params: &[] },
        Case { methods: &[], pattern: "/ok", method: "TRACE", path: "/ok", status: StatusCode::OK, params: &[] },
        // lowercase registration tokens
        Case { methods: &["get", "Post"], pattern: "/ok", method: "POST", path: "/ok", status: StatusCode::OK, params: &[] },
        // head
        Case { methods: &["GET"], pattern: "/ok", method: "HEAD", path: "/ok", status: StatusCode::OK, params: &[] },
        Case { methods: &["HEAD"], pattern: "/ok", method: "HEAD", path: "/ok", status: StatusCode::OK, params: &[] },
        Case { methods: &["HEAD"], pattern: "/ok", method: "GET", path: "/ok", status: StatusCode::METHOD_NOT_ALLOWED, params: &[] },
        // request methods are case-sensitive
        Case { methods: &["GET"], pattern: "/ok", method: "get", path: "/ok", status: StatusCode::METHOD_NOT_ALLOWED, params: &[] },
    ];

    for case in cases {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let record = Arc::clone(&seen);

        let mut router = Router::new();
        router.handle(case.pattern, case.methods, move |req: Request| {
            let record = Arc::clone(&record);
            async move {
                *record.lock().unwrap() = req
                    .params()
                    .map(|(k, v)| (k.to_owned(), v.to_owned()))
                    .collect::<Vec<_>>();
                StatusCode::OK
            }
        });

        let res = call(&router, case.method, case.path).await;
        assert_eq!(
            res.status_code(),
            case.status,
            "[{} {}] pattern={:?} methods={:?}",
            case.method, case.path, case.pattern, case.methods
        );

        let want: Vec<(String, String)> = case
            .params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        if case.status == StatusCode::OK {
            assert_eq!(*seen.lock().unwrap(), want, "[{} {}] params", case.method, case.path);
        }
    }
}

#[tokio::test]
async fn overlapping_routes() {
    init_tracing();
    let mut router = Router::new();
    router
        .get("/users/*", |_req: Request| async { "wildcard" })
        .get("/users/delete/{id}", |req: Request| async move {
            format!("param {}", req.param("id").unwrap_or_default())
        })
        .get("/users/new", |_req: Request| async { "static" });

    let cases = [
        ("/users/new", "static"),
        ("/users/new/", "static"),
        ("/users/delete/23", "param 23"),
        ("/users/delete", "wildcard"),
        ("/users/delete/23/foo", "wildcard"),
        ("/users/other", "wildcard"),
        ("/users/new/other", "wildcard"),
    ];
    for (path, want) in cases {
        let res = call(&router, "GET", path).await;
        assert_eq!(body(&res), want, "path {path:?}");
    }

    let res = call(&router, "GET", "/users").await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn wildcard_remainder_is_a_param() {
    let mut router = Router::new();
    router.get("/static/*", |req: Request| async move {
        req.param("*").unwrap_or_default().to_owned()
    });

    let res = call(&router, "GET", "/static/css//site.css").await;
    assert_eq!(body(&res), "css/site.css");
}

#[tokio::test]
async fn matched_route_is_exposed() {
    let mut router = Router::new();
    router.group_with_prefix("/api", |api| {
        api.get("/users/{id}", |req: Request| async move {
            req.route().unwrap_or_default().to_owned()
        });
    });

    let res = call(&router, "GET", "/api/users/7").await;
    assert_eq!(body(&res), "/api/users/{id}");
}

#[tokio::test]
async fn method_not_allowed() {
    init_tracing();
    let mut router = Router::new();
    router.handle("/ok", &["GET", "DELETE", "PUT"], ok);
    let allow = "DELETE, GET, HEAD, OPTIONS, PUT";

    let cases = [
        ("GET", StatusCode::OK),
        ("DELETE", StatusCode::OK),
        ("PUT", StatusCode::OK),
        ("POST", StatusCode::METHOD_NOT_ALLOWED),
        ("PATCH", StatusCode::METHOD_NOT_ALLOWED),
        ("PURGE", StatusCode::METHOD_NOT_ALLOWED),
        ("HEAD", StatusCode::OK),
        ("OPTIONS", StatusCode::NO_CONTENT),
    ];
    for (method, want) in cases {
        let res = call(&router, method, "/ok").await;
        assert_eq!(res.status_code(), want, "method {method}");
        if want == StatusCode::METHOD_NOT_ALLOWED || want == StatusCode::NO_CONTENT {
            assert_eq!(res.header("allow"), Some(allow), "method {method}");
        } else {
            assert_eq!(res.header("allow"), None, "method {method}");
        }
    }
}

#[tokio::test]
async fn allow_for_get_only_route() {
    let mut router = Router::new();
    router.get("/ok", ok);

    for method in ["POST", "OPTIONS"] {
        let res = call(&router, method, "/ok").await;
        assert_eq!(res.header("allow"), Some("GET, HEAD, OPTIONS"), "method {method}");
    }
}

#[tokio::test]
async fn options() {
    let mut router = Router::new();
    router.handle("/ok", &["GET", "PUT"], ok);

    let res = call(&router, "OPTIONS", "/ok").await;
    assert_eq!(res.status_code(), StatusCode::NO_CONTENT);
    assert_eq!(res.header("allow"), Some("GET, HEAD, OPTIONS, PUT"));
    assert!(res.body().is_empty());

    let res = call(&router, "OPTIONS", "/not").await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(res.header("allow"), None);
}

#[tokio::test]
async fn explicit_options_route_wins() {
    let mut router = Router::new();
    router
        .get("/ok", ok)
        .options("/ok", |_req: Request| async { "custom options" });

    let res = call(&router, "OPTIONS", "/ok").await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(body(&res), "custom options");
    assert_eq!(res.header("allow"), None);

    let res = call(&router, "POST", "/ok").await;
    assert_eq!(res.header("allow"), Some("GET, HEAD, OPTIONS"));
}

#[tokio::test]
async fn custom_fallback_handlers() {
    let mut router = Router::new();
    router
        .not_found(|req: Request| async move {
            (StatusCode::NOT_FOUND, format!("nothing at {}", req.path()))
        })
        .method_not_allowed(|_req: Request| async {
            (StatusCode::METHOD_NOT_ALLOWED, "nope")
        })
        .options_handler(|_req: Request| async {
            Response::builder()
                .status(StatusCode::OK)
                .header("access-control-allow-origin", "*")
                .no_body()
        });
    router.put("/items/{id}", ok);

    let res = call(&router, "GET", "/missing").await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(body(&res), "nothing at /missing");

    let res = call(&router, "GET", "/items/1").await;
    assert_eq!(res.status_code(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body(&res), "nope");
    assert_eq!(res.header("allow"), Some("OPTIONS, PUT"));

    let res = call(&router, "OPTIONS", "/items/1").await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(res.header("access-control-allow-origin"), Some("*"));
    assert_eq!(res.header("allow"), Some("OPTIONS, PUT"));
}

#[tokio::test]
async fn handler_set_allow_is_kept() {
    let mut router = Router::new();
    router.method_not_allowed(|_req: Request| async {
        let mut res = Response::status(StatusCode::METHOD_NOT_ALLOWED);
        res.set_header("Allow", "GET");
        res
    });
    router.get("/ok", ok);

    let res = call(&router, "POST", "/ok").await;
    assert_eq!(res.header("allow"), Some("GET"));
    assert_eq!(res.headers().len(), 1);
}

#[tokio::test]
async fn root_middleware_sees_allow() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let record = Arc::clone(&seen);

    let mut router = Router::new();
    router.use_middleware(middleware::from_fn(move |req: Request, next: Next| {
        let record = Arc::clone(&record);
        async move {
            let mut res = next.run(req).await;
            record
                .lock()
                .unwrap()
                .push(res.header("allow").map(str::to_owned));
            if res.status_code() == StatusCode::METHOD_NOT_ALLOWED {
                res.set_header("allow", "GET");
            }
            res
        }
    }));
    router.get("/ok", ok);

    let res = call(&router, "POST", "/ok").await;
    assert_eq!(res.header("allow"), Some("GET"));

    let res = call(&router, "OPTIONS", "/ok").await;
    assert_eq!(res.header("allow"), Some("GET, HEAD, OPTIONS"));

    call(&router, "GET", "/ok").await;

    let allow = Some("GET, HEAD, OPTIONS".to_owned());
    assert_eq!(*seen.lock().unwrap(), [allow.clone(), allow, None]);
}

#[tokio::test]
async fn fallback_handler_reads_allow_from_request() {
    let mut router = Router::new();
    router.method_not_allowed(|req: Request| async move {
        let allowed = req.allow().unwrap_or_default().to_owned();
        (StatusCode::METHOD_NOT_ALLOWED, format!("try one of: {allowed}"))
    });
    router.put("/items/{id}", ok);

    let res = call(&router, "GET", "/items/3").await;
    assert_eq!(body(&res), "try one of: OPTIONS, PUT");
    assert_eq!(res.header("allow"), Some("OPTIONS, PUT"));
}

#[tokio::test]
async fn redirect_trailing_slash() {
    init_tracing();
    let mut router = Router::new();
    router
        .redirect_trailing_slash(true)
        .get("/ok", ok)
        .post("/ok", ok)
        .get("/", ok);

    let res = call(&router, "GET", "/ok/").await;
    assert_eq!(res.status_code(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(res.header("location"), Some("/ok"));

    let res = call(&router, "POST", "/ok/").await;
    assert_eq!(res.status_code(), StatusCode::PERMANENT_REDIRECT);
    assert_eq!(res.header("location"), Some("/ok"));

    let res = call(&router, "GET", "//ok//").await;
    assert_eq!(res.status_code(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(res.header("location"), Some("/ok"));

    let res = router
        .dispatch(Request::new("GET", "/ok/").with_query("page=2"))
        .await;
    assert_eq!(res.header("location"), Some("/ok?page=2"));

    let res = call(&router, "GET", "/ok").await;
    assert_eq!(res.status_code(), StatusCode::OK);

    let res = call(&router, "GET", "/").await;
    assert_eq!(res.status_code(), StatusCode::OK);

    // Unregistered paths are not redirected.
    let res = call(&router, "GET", "/missing/").await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn trailing_slash_served_when_redirect_disabled() {
    let mut router = Router::new();
    router.get("/ok", ok);

    let res = call(&router, "GET", "/ok/").await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(res.header("location"), None);
}

#[tokio::test]
async fn normalized_and_raw_paths_agree() {
    let mut router = Router::new();
    router.get("/a/{x}/c", |req: Request| async move {
        req.param("x").unwrap_or_default().to_owned()
    });

    for path in ["/a/b/c", "/a//b//c", "/a/./b/c", "/a/z/../b/c", "a/b/c"] {
        let res = call(&router, "GET", path).await;
        assert_eq!(res.status_code(), StatusCode::OK, "path {path:?}");
        assert_eq!(body(&res), "b", "path {path:?}");
    }
}

// ── Middleware ──────────────────────────────────────────────────────────────

fn mark(log: &Arc<Mutex<String>>, tag: &'static str) -> Middleware {
    let log = Arc::clone(log);
    middleware::from_fn(move |req: Request, next: Next| {
        let log = Arc::clone(&log);
        async move {
            log.lock().unwrap().push_str(tag);
            next.run(req).await
        }
    })
}

#[tokio::test]
async fn middleware_groups() {
    init_tracing();
    let used = Arc::new(Mutex::new(String::new()));
    let m = |tag| mark(&used, tag);

    let mut router = Router::new();
    router.use_middleware(m("1")).use_middleware(m("2"));
    router.use_middleware(m("3"));

    router.get("/1", ok);

    router.group(|g| {
        g.use_middleware(m("4"));
        g.get("/2", ok);

        g.group(|g| {
            g.use_middleware(m("5"));
            g.get("/3", ok);
        });
    });

    router.group(|g| {
        g.use_middleware(m("6"));
        g.get("/4", ok);
    });

    router.get("/5", ok);

    let cases = [
        ("GET", "/1", "123", StatusCode::OK),
        ("GET", "/2", "1234", StatusCode::OK),
        ("GET", "/3", "12345", StatusCode::OK),
        ("GET", "/4", "1236", StatusCode::OK),
        ("GET", "/5", "123", StatusCode::OK),
        // root middleware wraps the built-in answers too
        ("GET", "/notfound", "123", StatusCode::NOT_FOUND),
        ("POST", "/1", "123", StatusCode::METHOD_NOT_ALLOWED),
        ("OPTIONS", "/1", "123", StatusCode::NO_CONTENT),
    ];
    for (method, path, want, status) in cases {
        used.lock().unwrap().clear();
        let res = call(&router, method, path).await;
        assert_eq!(res.status_code(), status, "{method} {path}");
        assert_eq!(*used.lock().unwrap(), want, "{method} {path}");
    }
}

#[tokio::test]
async fn middleware_runs_as_onion() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let layer = |tag: &'static str| {
        let log = Arc::clone(&log);
        middleware::from_fn(move |req: Request, next: Next| {
            let log = Arc::clone(&log);
            async move {
                log.lock().unwrap().push(format!("{tag}>"));
                let res = next.run(req).await;
                log.lock().unwrap().push(format!("<{tag}"));
                res
            }
        })
    };

    let mut router = Router::new();
    router.use_middleware(layer("m1")).use_middleware(layer("m2"));
    let handler_log = Arc::clone(&log);
    router.get("/", move |_req: Request| {
        let log = Arc::clone(&handler_log);
        async move {
            log.lock().unwrap().push("handler".to_owned());
            "ok"
        }
    });

    call(&router, "GET", "/").await;
    assert_eq!(*log.lock().unwrap(), ["m1>", "m2>", "handler", "<m2", "<m1"]);
}

#[tokio::test]
async fn middleware_is_captured_at_registration() {
    let used = Arc::new(Mutex::new(String::new()));

    let mut router = Router::new();
    router.group(|g| {
        g.use_middleware(mark(&used, "a"));
        g.get("/before", ok);
        g.use_middleware(mark(&used, "b"));
        g.get("/after", ok);
    });

    for (path, want) in [("/before", "a"), ("/after", "ab")] {
        used.lock().unwrap().clear();
        call(&router, "GET", path).await;
        assert_eq!(*used.lock().unwrap(), want, "{path}");
    }
}

#[tokio::test]
async fn with_applies_to_one_registration() {
    let used = Arc::new(Mutex::new(String::new()));

    let mut router = Router::new();
    router.use_middleware(mark(&used, "r"));
    router.with([mark(&used, "w")]).get("/with", ok);
    router
        .with([mark(&used, "x"), mark(&used, "y")])
        .get("/with-two", ok);
    router
        .with([mark(&used, "x")])
        .use_middleware(mark(&used, "z"))
        .get("/with-chained", ok);
    router.get("/without", ok);
    router.group_with_prefix("/g", |g| {
        g.use_middleware(mark(&used, "g"));
        g.with([mark(&used, "w"), mark(&used, "v")]).get("/with", ok);
        g.get("/without", ok);
    });

    let cases = [
        ("/with", "rw"),
        ("/with-two", "rxy"),
        ("/with-chained", "rxz"),
        ("/without", "r"),
        ("/g/with", "rgwv"),
        ("/g/without", "rg"),
    ];
    for (path, want) in cases {
        used.lock().unwrap().clear();
        let res = call(&router, "GET", path).await;
        assert_eq!(res.status_code(), StatusCode::OK, "{path}");
        assert_eq!(*used.lock().unwrap(), want, "{path}");
    }
}

#[tokio::test]
async fn nested_prefixes_concatenate() {
    let mut router = Router::new();
    router.group_with_prefix("/api", |api| {
        api.group_with_prefix("/v1", |v1| {
            v1.get("/status", |_req: Request| async { "v1" });
        });
        api.group(|g| {
            g.get("/status", |_req: Request| async { "api" });
        });
    });

    assert_eq!(body(&call(&router, "GET", "/api/v1/status").await), "v1");
    assert_eq!(body(&call(&router, "GET", "/api/status").await), "api");
    assert_eq!(call(&router, "GET", "/v1/status").await.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn middleware_can_short_circuit() {
    let mut router = Router::new();
    router.group_with_prefix("/admin", |admin| {
        admin.use_middleware(middleware::from_fn(|req: Request, next: Next| async move {
            if req.header("authorization").is_none() {
                return Response::status(StatusCode::UNAUTHORIZED);
            }
            next.run(req).await
        }));
        admin.get("/panel", |_req: Request| async { "panel" });
    });

    let res = call(&router, "GET", "/admin/panel").await;
    assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);

    let res = router
        .dispatch(Request::new("GET", "/admin/panel").with_header("Authorization", "Bearer t"))
        .await;
    assert_eq!(body(&res), "panel");
}

#[tokio::test]
async fn raw_middleware_transformation() {
    struct Tag(wend::BoxedHandler);

    impl wend::ErasedHandler for Tag {
        fn call(&self, req: Request) -> wend::BoxFuture {
            let inner = Arc::clone(&self.0);
            Box::pin(async move {
                let mut res = inner.call(req).await;
                res.set_header("x-tag", "raw");
                res
            })
        }
    }

    let mut router = Router::new();
    router.use_middleware(Middleware::new(|inner| -> wend::BoxedHandler { Arc::new(Tag(inner)) }));
    router.get("/", ok);

    let res = call(&router, "GET", "/").await;
    assert_eq!(res.header("x-tag"), Some("raw"));
    let res = call(&router, "GET", "/missing").await;
    assert_eq!(res.header("x-tag"), Some("raw"));
}

#[tokio::test]
async fn trace_middleware_passes_responses_through() {
    init_tracing();
    let mut router = Router::new();
    router.use_middleware(middleware::trace());
    router.get("/hello/{name}", |req: Request| async move {
        format!("hello {}", req.param("name").unwrap_or_default())
    });

    let res = call(&router, "GET", "/hello/ada").await;
    assert_eq!(body(&res), "hello ada");
    let res = call(&router, "GET", "/nowhere").await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
}

// ── Configuration errors ────────────────────────────────────────────────────

#[tokio::test]
async fn use_after_dispatch_fails() {
    let mut router = Router::new();
    router.use_middleware(middleware::trace());
    router.get("/", ok);

    // Still open before the first request.
    router.try_use_middleware(middleware::trace()).unwrap();

    call(&router, "GET", "/").await;
    let err = router.try_use_middleware(middleware::trace()).err().unwrap();
    assert_eq!(err, RouteError::MiddlewareAfterDispatch);

    // Groups carry their own chain and are unaffected.
    router.group(|g| {
        g.use_middleware(middleware::trace());
        g.get("/late", ok);
    });
    assert_eq!(call(&router, "GET", "/late").await.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn replacing_fallbacks_keeps_root_chain_closed() {
    let mut router = Router::new();
    router.get("/", ok);
    call(&router, "GET", "/").await;

    router.not_found(|_req: Request| async { (StatusCode::NOT_FOUND, "gone") });
    let err = router.try_use_middleware(middleware::trace()).err().unwrap();
    assert_eq!(err, RouteError::MiddlewareAfterDispatch);

    router
        .method_not_allowed(|_req: Request| async { StatusCode::METHOD_NOT_ALLOWED })
        .options_handler(|_req: Request| async { StatusCode::NO_CONTENT });
    let err = router.try_use_middleware(middleware::trace()).err().unwrap();
    assert_eq!(err, RouteError::MiddlewareAfterDispatch);

    // The replaced handler is still picked up.
    let res = call(&router, "GET", "/missing").await;
    assert_eq!(body(&res), "gone");
}

#[test]
#[should_panic(expected = "root router once dispatch has started")]
fn use_after_dispatch_panics() {
    let mut router = Router::new();
    router.get("/", ok);
    tokio::runtime::Runtime::new()
        .unwrap()
        .block_on(call(&router, "GET", "/"));
    router.use_middleware(middleware::trace());
}

#[test]
fn try_handle_reports_configuration_errors() {
    let mut router = Router::new();

    let err = router.try_handle("/a/{}", &["GET"], ok).err().unwrap();
    assert!(matches!(err, RouteError::EmptyParam { .. }));

    let err = router.try_handle("/files/*/x", &["GET"], ok).err().unwrap();
    assert!(matches!(err, RouteError::WildcardNotLast { .. }));

    let err = router.try_handle("/a", &["FETCH"], ok).err().unwrap();
    assert_eq!(err, RouteError::UnknownMethod("FETCH".to_owned()));

    router.try_handle("/u/{id}", &["GET"], ok).unwrap();
    let err = router.try_handle("/u/{name}", &["PUT"], ok).err().unwrap();
    assert!(matches!(err, RouteError::ParamConflict { .. }));
}

#[test]
#[should_panic(expected = "conflicts with `{id}`")]
fn conflicting_params_across_groups_panic() {
    let mut router = Router::new();
    router.get("/users/{id}", ok);
    router.group_with_prefix("/users", |g| {
        g.get("/{user}/posts", ok);
    });
}

#[test]
#[should_panic(expected = "wildcard `*` must be the last segment")]
fn wildcard_in_the_middle_panics() {
    let mut router = Router::new();
    router.on(Method::Get, "/a/*/b", ok);
}

// ── Concurrency ─────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_dispatch() {
    let mut router = Router::new();
    router.use_middleware(middleware::trace());
    router.get("/items/{id}", |req: Request| async move {
        req.param("id").unwrap_or_default().to_owned()
    });
    router.put("/items/{id}", ok);
    let router = Arc::new(router);

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..64 {
        let router = Arc::clone(&router);
        tasks.spawn(async move {
            let res = router.dispatch(Request::new("GET", format!("/items/{i}"))).await;
            assert_eq!(body(&res), i.to_string());

            let res = router.dispatch(Request::new("POST", format!("/items/{i}"))).await;
            assert_eq!(res.header("allow"), Some("GET, HEAD, OPTIONS, PUT"));
        });
    }
    while let Some(joined) = tasks.join_next().await {
        joined.unwrap();
    }
}
