//! Proxy forwarder
//!
//! Fetches the URL named by the proxy route's query parameter and relays the
//! body with CORS headers and a fixed content type. The body is buffered in
//! full before anything is written back.

use crate::config::{AppState, ProxyConfig};
use crate::http::{self, cors};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use thiserror::Error;

/// Failure modes of a single proxy request
#[derive(Debug, Error)]
pub enum ProxyError {
    /// No usable target in the query string
    #[error("Missing url parameter")]
    BadRequest,
    /// Remote answered with a non-2xx status, relayed as-is
    #[error(
        "HTTP Error {}: {}",
        .0.as_u16(),
        .0.canonical_reason().unwrap_or("Unknown")
    )]
    Upstream(StatusCode),
    /// DNS, connect, timeout or transfer failure
    #[error("Failed to fetch: {0}")]
    Fetch(String),
    /// Anything else, e.g. a target that cannot form a request
    #[error("Server error: {0}")]
    Internal(String),
}

impl ProxyError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Upstream(status) => *status,
            Self::Fetch(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the error reply gets CORS headers.
    ///
    /// Upstream status relays go out bare unless explicitly enabled.
    pub const fn carries_cors(&self, cors_on_upstream_error: bool) -> bool {
        match self {
            Self::Upstream(_) => cors_on_upstream_error,
            _ => true,
        }
    }

    fn from_send(err: &reqwest::Error) -> Self {
        if err.is_builder() {
            Self::Internal(describe(err))
        } else {
            Self::Fetch(describe(err))
        }
    }
}

/// Build the outbound client shared by all proxy requests
pub fn build_client(config: &ProxyConfig) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.request_timeout())
        .pool_max_idle_per_host(0)
        .build()
}

/// Extract the target URL from a raw `/proxy?url=...` path.
///
/// The query is form-decoded and the first non-empty `param` value wins.
pub fn extract_target(path_and_query: &str, param: &str) -> Result<String, ProxyError> {
    let query = path_and_query
        .split_once('?')
        .map_or("", |(_, query)| query);
    let query = query.split_once('#').map_or(query, |(query, _)| query);

    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, value)| key == param && !value.is_empty())
        .map(|(_, value)| value.into_owned())
        .ok_or(ProxyError::BadRequest)
}

/// Handle a proxy-route request end to end
pub async fn forward(
    state: &AppState,
    path_and_query: &str,
) -> Result<Response<Full<Bytes>>, ProxyError> {
    let target = extract_target(path_and_query, &state.config.proxy.param)?;
    let body = fetch(&state.client, &target).await?;
    Ok(http::build_proxied_response(
        body,
        &state.config.proxy.content_type,
        &state.config.cors,
    ))
}

/// GET `target` and read the whole body
pub async fn fetch(client: &reqwest::Client, target: &str) -> Result<Bytes, ProxyError> {
    let response = client
        .get(target)
        .send()
        .await
        .map_err(|e| ProxyError::from_send(&e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ProxyError::Upstream(status));
    }

    response
        .bytes()
        .await
        .map_err(|e| ProxyError::Fetch(describe(&e)))
}

/// Turn a proxy failure into the plain-text reply sent to the client
pub fn error_response(err: &ProxyError, state: &AppState) -> Response<Full<Bytes>> {
    let mut resp = http::build_error_response(err.status(), &err.to_string());
    if err.carries_cors(state.config.proxy.cors_on_upstream_error) {
        cors::apply(resp.headers_mut(), &state.config.cors);
    }
    resp
}

/// Error text followed by its source chain
fn describe(err: &(dyn std::error::Error + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.contains(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}
