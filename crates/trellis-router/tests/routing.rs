//! End-to-end routing behaviour through a sealed dispatch table.

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use http::{Method, StatusCode};
use http_body_util::BodyExt;
use trellis_core::{Handler, HandlerError, Request, RequestContext, Response, ResponseExt};
use trellis_middleware::FnMiddleware;
use trellis_router::{DispatchTable, RouteError, Router};

type Log = Arc<Mutex<Vec<String>>>;

fn request(method: Method, path: &str) -> Request {
    http::Request::builder()
        .method(method)
        .uri(path)
        .body(Bytes::new())
        .unwrap()
}

fn recording(
    name: &'static str,
    log: &Log,
) -> FnMiddleware<impl Fn(Handler) -> Handler + Send + Sync + 'static> {
    let log = Arc::clone(log);
    FnMiddleware::new(name, move |next: Handler| {
        let log = Arc::clone(&log);
        Handler::new(move |ctx: RequestContext| {
            let next = next.clone();
            let log = Arc::clone(&log);
            async move {
                log.lock().unwrap().push(format!("{name}-before"));
                let result = next.call(ctx).await;
                log.lock().unwrap().push(format!("{name}-after"));
                result
            }
        })
    })
}

fn logging_handler(label: &'static str, log: &Log) -> Handler {
    let log = Arc::clone(log);
    Handler::new(move |_ctx| {
        let log = Arc::clone(&log);
        async move {
            log.lock().unwrap().push(label.to_string());
            Ok(Response::text(StatusCode::OK, label))
        }
    })
}

async fn body(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn global_then_route_middleware_onion_order() {
    let log: Log = Arc::default();

    let mut router = Router::new();
    router
        .use_middleware(recording("A", &log))
        .use_middleware(recording("B", &log));
    router
        .get("orders", "/orders", logging_handler("handler", &log))
        .unwrap()
        .with(recording("C", &log))
        .with(recording("D", &log));
    let table = router.seal();

    let response = table.dispatch(request(Method::GET, "/orders")).await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(
        *log.lock().unwrap(),
        [
            "A-before", "B-before", "C-before", "D-before", "handler", "D-after", "C-after",
            "B-after", "A-after",
        ]
    );
}

#[tokio::test]
async fn not_found_never_invokes_route_handlers() {
    let log: Log = Arc::default();

    let mut router = Router::new();
    router.get("a", "/a", logging_handler("a", &log)).unwrap();
    router.post("b", "/b", logging_handler("b", &log)).unwrap();
    router.not_found(logging_handler("not-found", &log));
    let table = router.seal();

    for (method, path) in [
        (Method::GET, "/b"),
        (Method::POST, "/a"),
        (Method::GET, "/a/"),
        (Method::DELETE, "/"),
    ] {
        table.dispatch(request(method, path)).await;
    }

    assert_eq!(*log.lock().unwrap(), vec!["not-found"; 4]);
}

#[tokio::test]
async fn not_found_is_wrapped_by_global_middleware_only() {
    let log: Log = Arc::default();

    let mut router = Router::new();
    router.use_middleware(recording("G", &log));
    router
        .get("a", "/a", logging_handler("a", &log))
        .unwrap()
        .with(recording("L", &log));
    let table = router.seal();

    let response = table.dispatch(request(Method::GET, "/missing")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(*log.lock().unwrap(), ["G-before", "G-after"]);
}

#[tokio::test]
async fn put_registers_under_put() {
    let mut router = Router::new();
    router
        .put("replace", "/items/{id:int}", Handler::new(|_ctx| async {
            Ok(Response::empty(StatusCode::NO_CONTENT))
        }))
        .unwrap();
    let table = router.seal();

    let put = table.dispatch(request(Method::PUT, "/items/1")).await;
    assert_eq!(put.status(), StatusCode::NO_CONTENT);

    let post = table.dispatch(request(Method::POST, "/items/1")).await;
    assert_eq!(post.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn typed_segment_mismatch_falls_through() {
    let mut router = Router::new();
    router
        .get(
            "by-id",
            "/users/{id:int}",
            Handler::new(|ctx: RequestContext| async move {
                let id = ctx.int_param("id").unwrap_or_default();
                Ok(Response::text(StatusCode::OK, format!("id {id}")))
            }),
        )
        .unwrap();
    router
        .get(
            "by-login",
            "/users/{login:string}",
            Handler::new(|ctx: RequestContext| async move {
                let login = ctx.param("login").unwrap_or_default().to_string();
                Ok(Response::text(StatusCode::OK, format!("login {login}")))
            }),
        )
        .unwrap();
    let table = router.seal();

    assert_eq!(body(table.dispatch(request(Method::GET, "/users/12")).await).await, "id 12");
    assert_eq!(body(table.dispatch(request(Method::GET, "/users/ada")).await).await, "login ada");
}

#[tokio::test]
async fn percent_encoded_paths_match_decoded_routes() {
    let mut router = Router::new();
    router
        .get(
            "cafe",
            "/caf\u{e9}",
            Handler::new(|_ctx| async { Ok(Response::text(StatusCode::OK, "menu")) }),
        )
        .unwrap();
    router
        .get(
            "by-name",
            "/users/{name:string}",
            Handler::new(|ctx: RequestContext| async move {
                let name = ctx.param("name").unwrap_or_default().to_string();
                Ok(Response::text(StatusCode::OK, name))
            }),
        )
        .unwrap();
    let table = router.seal();

    let response = table.dispatch(request(Method::GET, "/caf%C3%A9")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body(response).await, "menu");

    let matched = table.match_route(&Method::GET, "/users/ada%20lovelace").unwrap();
    assert_eq!(matched.params().get("name"), Some("ada lovelace"));

    let response = table.dispatch(request(Method::GET, "/users/a%2Fb")).await;
    assert_eq!(body(response).await, "a/b");
}

#[tokio::test]
async fn error_envelope_carries_request_id() {
    let mut router = Router::new();
    router
        .get(
            "forbidden",
            "/secret",
            Handler::new(|_ctx| async { Err(HandlerError::forbidden("nope")) }),
        )
        .unwrap();
    let table = router.seal();

    let response = table.dispatch(request(Method::GET, "/secret")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let header = response
        .headers()
        .get(trellis_router::REQUEST_ID_HEADER)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    let json: serde_json::Value = serde_json::from_str(&body(response).await).unwrap();
    assert_eq!(json["error"]["code"], "FORBIDDEN");
    assert_eq!(json["request_id"], header.as_str());
}

#[tokio::test]
async fn concurrent_dispatch_shares_table() {
    let mut router = Router::new();
    router
        .get("echo", "/echo/{n:int}", Handler::new(|ctx: RequestContext| async move {
            tokio::task::yield_now().await;
            Ok(Response::text(StatusCode::OK, ctx.param("n").unwrap_or_default().to_string()))
        }))
        .unwrap();
    let table: Arc<DispatchTable> = Arc::new(router.seal());

    let tasks: Vec<_> = (0..32)
        .map(|n| {
            let table = Arc::clone(&table);
            tokio::spawn(async move {
                let response = table.dispatch(request(Method::GET, &format!("/echo/{n}"))).await;
                (n, body(response).await)
            })
        })
        .collect();

    for task in tasks {
        let (n, text) = task.await.unwrap();
        assert_eq!(text, n.to_string());
    }
}

#[test]
fn registration_errors_abort_setup() {
    fn build() -> Result<DispatchTable, RouteError> {
        let mut router = Router::new();
        let ok = || Handler::new(|_ctx| async { Ok(Response::empty(StatusCode::OK)) });
        router.get("ok", "/ok", ok())?;
        router.get("bad", "/bad/{id:int", ok())?;
        Ok(router.seal())
    }

    let err = build().unwrap_err();
    assert_eq!(err.template(), "/bad/{id:int");
    assert!(err.is_format_error());
}
