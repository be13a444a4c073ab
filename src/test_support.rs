//! Shared fixtures for unit tests: app state over a temp root and a mock upstream.

use crate::config::{AppState, Config};
use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Default configuration rooted at `root`, adjusted by `tweak`
pub fn test_config(root: &Path, tweak: impl FnOnce(&mut Config)) -> Config {
    let mut cfg = Config::load_from("does-not-exist/config").unwrap();
    cfg.server.root = root.to_string_lossy().into_owned();
    cfg.logging.access_log = false;
    tweak(&mut cfg);
    cfg
}

pub fn test_state(root: &Path, tweak: impl FnOnce(&mut Config)) -> Arc<AppState> {
    Arc::new(AppState::new(&test_config(root, tweak)).unwrap())
}

/// Start an HTTP/1 server on an ephemeral port that answers every request
/// with `status` and `body` after `delay`
pub async fn spawn_upstream(status: u16, body: &'static [u8], delay: Duration) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let service = service_fn(move |_req: Request<Incoming>| async move {
                    tokio::time::sleep(delay).await;
                    let resp = Response::builder()
                        .status(status)
                        .header("Content-Type", "application/json")
                        .body(Full::new(Bytes::from_static(body)))
                        .unwrap();
                    Ok::<_, Infallible>(resp)
                });
                let _ = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await;
            });
        }
    });
    addr
}

/// Start an upstream whose body reports the request headers it received:
/// `<user-agent>|<x-api-key>`, with `-` for a missing header
pub async fn spawn_header_echo() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let service = service_fn(|req: Request<Incoming>| async move {
                    let header = |name: &str| {
                        req.headers()
                            .get(name)
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or("-")
                            .to_string()
                    };
                    let body = format!("{}|{}", header("user-agent"), header("x-api-key"));
                    Ok::<_, Infallible>(Response::new(Full::new(Bytes::from(body))))
                });
                let _ = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await;
            });
        }
    });
    addr
}

/// A loopback port with nothing listening on it
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}
