// Connection handling module
// Serves a single TCP connection with hyper's HTTP/1 implementation

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Hand an accepted connection to the request handler.
///
/// Sequential mode awaits the connection before returning, so the accept
/// loop takes the next client only once this one is finished. Concurrent
/// mode serves it on a local task (requires a `LocalSet`).
pub async fn accept_connection(stream: TcpStream, peer_addr: SocketAddr, state: &Arc<AppState>) {
    if state.config.server.concurrent {
        tokio::task::spawn_local(serve_connection(stream, peer_addr, Arc::clone(state)));
    } else {
        serve_connection(stream, peer_addr, Arc::clone(state)).await;
    }
}

/// Serve one connection to completion.
///
/// Keep-alive is disabled: each connection carries one request, so an idle
/// browser socket cannot hold the sequential loop. The whole exchange is
/// bounded by the configured connection timeout.
async fn serve_connection(stream: TcpStream, peer_addr: SocketAddr, state: Arc<AppState>) {
    let io = TokioIo::new(stream);
    let timeout_duration = state.config.connection_timeout();

    let mut builder = http1::Builder::new();
    builder.keep_alive(false);

    let conn = builder.serve_connection(
        io,
        service_fn(move |req| handler::handle_request(req, Arc::clone(&state), peer_addr)),
    );

    match tokio::time::timeout(timeout_duration, conn).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => logger::log_connection_error(&err),
        Err(_) => {
            logger::log_warning(&format!(
                "Connection from {peer_addr} timed out after {} seconds",
                timeout_duration.as_secs()
            ));
        }
    }
}
