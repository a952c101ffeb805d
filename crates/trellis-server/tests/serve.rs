//! End-to-end tests over a real TCP socket.

use std::net::SocketAddr;
use std::time::Duration;

use http::StatusCode;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use trellis_core::{Handler, HandlerError, RequestContext, Response, ResponseExt};
use trellis_server::{bind, App, ServerConfig, ShutdownSignal};

async fn start(app: App) -> (SocketAddr, ShutdownSignal, tokio::task::JoinHandle<()>) {
    let listener = bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = ShutdownSignal::new();

    let signal = shutdown.clone();
    let handle = tokio::spawn(async move {
        app.serve(listener, signal).await.unwrap();
    });

    (addr, shutdown, handle)
}

async fn send(addr: SocketAddr, raw: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw.as_bytes()).await.unwrap();

    let mut buf = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut buf))
        .await
        .expect("response in time")
        .unwrap();
    String::from_utf8(buf).unwrap()
}

fn app() -> App {
    let mut app = App::new();

    app.get(
        "get-user",
        "/users/{id:int}",
        Handler::new(|ctx: RequestContext| async move {
            let id = ctx.int_param("id").ok_or_else(|| HandlerError::bad_request("id"))?;
            Ok(Response::text(StatusCode::OK, format!("user {id}")))
        }),
    )
    .unwrap();

    app.post(
        "echo",
        "/echo",
        Handler::new(|ctx: RequestContext| async move {
            let body = String::from_utf8_lossy(ctx.body()).into_owned();
            Ok(Response::text(StatusCode::CREATED, body))
        }),
    )
    .unwrap();

    app
}

#[tokio::test]
async fn serves_matched_route() {
    let (addr, shutdown, handle) = start(app()).await;

    let response = send(
        addr,
        "GET /users/42 HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await;

    assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");
    assert!(response.contains("x-request-id: "));
    assert!(response.ends_with("user 42"));

    shutdown.trigger();
    handle.await.unwrap();
}

#[tokio::test]
async fn collects_request_body() {
    let (addr, shutdown, handle) = start(app()).await;

    let response = send(
        addr,
        "POST /echo HTTP/1.1\r\nHost: localhost\r\nContent-Length: 5\r\nConnection: close\r\n\r\nhello",
    )
    .await;

    assert!(response.starts_with("HTTP/1.1 201 Created"), "{response}");
    assert!(response.ends_with("hello"));

    shutdown.trigger();
    handle.await.unwrap();
}

#[tokio::test]
async fn unmatched_request_gets_not_found() {
    let (addr, shutdown, handle) = start(app()).await;

    let response = send(
        addr,
        "GET /users/abc HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await;

    assert!(response.starts_with("HTTP/1.1 404 Not Found"), "{response}");
    assert!(response.contains("application/json"));

    shutdown.trigger();
    handle.await.unwrap();
}

#[tokio::test]
async fn slow_upload_is_bounded_by_request_deadline() {
    let config = ServerConfig::builder()
        .request_timeout(Duration::from_millis(200))
        .build();
    let mut app = App::with_config(config);
    app.post(
        "echo",
        "/echo",
        Handler::new(|_ctx: RequestContext| async { Ok(Response::empty(StatusCode::OK)) }),
    )
    .unwrap();
    let (addr, shutdown, handle) = start(app).await;

    let response = send(
        addr,
        "POST /echo HTTP/1.1\r\nHost: localhost\r\nContent-Length: 5\r\nConnection: close\r\n\r\nhe",
    )
    .await;

    assert!(response.starts_with("HTTP/1.1 504 Gateway Timeout"), "{response}");
    assert!(response.contains("TIMEOUT"));

    shutdown.trigger();
    handle.await.unwrap();
}
