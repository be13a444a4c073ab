//! Request dispatch module
//!
//! Entry point for HTTP request processing: classifies each request by method
//! and path, dispatches to the preflight responder, the proxy forwarder or the
//! static file server, and applies the CORS header policy.

use crate::config::AppState;
use crate::handler::{proxy, static_files};
use crate::http::{self, cors};
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, SERVER};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context for the static file server
pub struct RequestContext<'a> {
    /// Raw path including the query string
    pub path: &'a str,
    pub if_modified_since: Option<String>,
    pub has_if_none_match: bool,
}

impl<'a> RequestContext<'a> {
    fn from_request<B>(req: &'a Request<B>) -> Self {
        Self {
            path: raw_path(req),
            if_modified_since: req
                .headers()
                .get("if-modified-since")
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string),
            has_if_none_match: req.headers().contains_key("if-none-match"),
        }
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let mut entry = state
        .config
        .logging
        .access_log
        .then(|| AccessLogEntry::from_request(peer, &req));

    let mut response = dispatch(&req, &state).await;

    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server);
    }

    if let Some(entry) = entry.as_mut() {
        let body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.finish(response.status().as_u16(), body_bytes, started.elapsed());
        logger::log_access(entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Route a request to its responder
async fn dispatch<B>(req: &Request<B>, state: &AppState) -> Response<Full<Bytes>> {
    let path = raw_path(req);
    let is_proxy_route = path.starts_with(&state.proxy_prefix);

    match *req.method() {
        Method::OPTIONS => http::build_preflight_response(&state.config.cors),
        // The forwarder owns its CORS headers, so blanket injection is skipped
        Method::GET if is_proxy_route => match proxy::forward(state, path).await {
            Ok(resp) => resp,
            Err(err) => {
                logger::log_error_reply(err.status().as_u16(), &err.to_string());
                proxy::error_response(&err, state)
            }
        },
        Method::GET => {
            let ctx = RequestContext::from_request(req);
            let mut resp =
                static_files::serve(&ctx, &state.root, &state.config.http.index_files).await;
            cors::apply(resp.headers_mut(), &state.config.cors);
            resp
        }
        _ => {
            logger::log_error_reply(501, &format!("Unsupported method ({})", req.method()));
            let mut resp = http::build_501_response(req.method().as_str());
            if !is_proxy_route {
                cors::apply(resp.headers_mut(), &state.config.cors);
            }
            resp
        }
    }
}

/// Path and query exactly as the client sent them
fn raw_path<B>(req: &Request<B>) -> &str {
    req.uri()
        .path_and_query()
        .map_or_else(|| req.uri().path(), |pq| pq.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{closed_port, spawn_header_echo, spawn_upstream, test_state};
    use http_body_util::BodyExt;
    use std::time::Duration;

    fn peer() -> SocketAddr {
        "127.0.0.1:50000".parse().unwrap()
    }

    fn request(method: &str, uri: &str) -> Request<()> {
        Request::builder().method(method).uri(uri).body(()).unwrap()
    }

    async fn send(state: &Arc<AppState>, req: Request<()>) -> Response<Full<Bytes>> {
        handle_request(req, Arc::clone(state), peer()).await.unwrap()
    }

    async fn body_bytes(resp: Response<Full<Bytes>>) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    fn assert_cors(resp: &Response<Full<Bytes>>) {
        assert_eq!(resp.headers()["access-control-allow-origin"], "*");
        assert_eq!(resp.headers()["access-control-allow-methods"], "GET, OPTIONS");
        assert_eq!(resp.headers()["access-control-allow-headers"], "Content-Type");
    }

    #[tokio::test]
    async fn test_options_any_path_is_preflight() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), |_| {});

        for uri in ["/", "/proxy?url=http://example.com", "/no/such/file.xml", "*"] {
            let resp = send(&state, request("OPTIONS", uri)).await;
            assert_eq!(resp.status(), 200, "uri {uri}");
            assert_cors(&resp);
            assert_eq!(
                resp.headers()
                    .get_all("access-control-allow-origin")
                    .iter()
                    .count(),
                1
            );
            assert!(body_bytes(resp).await.is_empty());
        }
    }

    #[tokio::test]
    async fn test_proxy_without_url_is_400() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), |_| {});

        let resp = send(&state, request("GET", "/proxy?url=")).await;
        assert_eq!(resp.status(), 400);
        assert_eq!(&body_bytes(resp).await[..], b"Missing url parameter");

        let resp = send(&state, request("GET", "/proxy?url=&x=1")).await;
        assert_eq!(resp.status(), 400);
    }

    #[tokio::test]
    async fn test_proxy_success_relays_bytes() {
        let body: &'static [u8] = b"<?xml version=\"1.0\"?><invoice id=\"7\"/>";
        let upstream = spawn_upstream(200, body, Duration::ZERO).await;
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), |_| {});

        let uri = format!("/proxy?url=http%3A%2F%2F{upstream}%2Fapi%3Fa%3D1");
        let resp = send(&state, request("GET", &uri)).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["content-type"], "text/xml; charset=utf-8");
        assert_cors(&resp);
        assert!(resp.headers().contains_key("server"));
        assert_eq!(&body_bytes(resp).await[..], body);
    }

    #[tokio::test]
    async fn test_proxy_upstream_404_is_propagated_without_cors() {
        let upstream = spawn_upstream(404, b"missing", Duration::ZERO).await;
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), |_| {});

        let resp = send(&state, request("GET", &format!("/proxy?url=http://{upstream}/x"))).await;
        assert_eq!(resp.status(), 404);
        assert!(resp.headers().get("access-control-allow-origin").is_none());
        assert_eq!(&body_bytes(resp).await[..], b"HTTP Error 404: Not Found");
    }

    #[tokio::test]
    async fn test_proxy_upstream_error_cors_can_be_enabled() {
        let upstream = spawn_upstream(500, b"boom", Duration::ZERO).await;
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), |cfg| cfg.proxy.cors_on_upstream_error = true);

        let resp = send(&state, request("GET", &format!("/proxy?url=http://{upstream}/"))).await;
        assert_eq!(resp.status(), 500);
        assert_cors(&resp);
    }

    #[tokio::test]
    async fn test_proxy_refused_is_502() {
        let port = closed_port().await;
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), |_| {});

        let resp = send(
            &state,
            request("GET", &format!("/proxy?url=http://127.0.0.1:{port}/")),
        )
        .await;
        assert_eq!(resp.status(), 502);
        let body = body_bytes(resp).await;
        assert!(String::from_utf8_lossy(&body).contains("Failed to fetch"));
    }

    #[tokio::test]
    async fn test_proxy_unresolvable_host_is_502() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), |_| {});

        // .invalid never resolves
        let resp = send(
            &state,
            request("GET", "/proxy?url=http://upstream.invalid/feed.xml"),
        )
        .await;
        assert_eq!(resp.status(), 502);
        assert_cors(&resp);
        let body = body_bytes(resp).await;
        assert!(String::from_utf8_lossy(&body).contains("Failed to fetch"));
    }

    #[tokio::test]
    async fn test_proxy_sends_fixed_user_agent_only() {
        let upstream = spawn_header_echo().await;
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), |_| {});

        let req = Request::builder()
            .uri(format!("/proxy?url=http://{upstream}/"))
            .header("user-agent", "curl/8.0")
            .header("x-api-key", "secret")
            .body(())
            .unwrap();
        let resp = send(&state, req).await;
        assert_eq!(resp.status(), 200);
        // Upstream saw the configured UA and none of the client's headers
        assert_eq!(body_bytes(resp).await, "Mozilla/5.0|-");
    }

    #[tokio::test]
    async fn test_static_file_has_cors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), b"<h1>dev</h1>").unwrap();
        let state = test_state(dir.path(), |_| {});

        let resp = send(&state, request("GET", "/index.html")).await;
        assert_eq!(resp.status(), 200);
        assert_cors(&resp);
        assert_eq!(&body_bytes(resp).await[..], b"<h1>dev</h1>");
    }

    #[tokio::test]
    async fn test_static_missing_is_404_with_cors() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), |_| {});

        let resp = send(&state, request("GET", "/missing.js")).await;
        assert_eq!(resp.status(), 404);
        assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    }

    #[tokio::test]
    async fn test_proxy_prefix_must_match_literally() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), |_| {});

        // Not the `/proxy?url=` prefix, so it falls through to static files
        let resp = send(&state, request("GET", "/proxy?other=1&url=http://x/")).await;
        assert_eq!(resp.status(), 404);
        assert_eq!(&body_bytes(resp).await[..], b"File not found");
    }

    #[tokio::test]
    async fn test_other_methods_are_501() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), |_| {});

        for method in ["POST", "PUT", "DELETE", "HEAD"] {
            let resp = send(&state, request(method, "/index.html")).await;
            assert_eq!(resp.status(), 501, "method {method}");
        }
    }
}
