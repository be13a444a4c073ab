// Server loop module
// Accepts connections forever and hands each one to the connection handler

use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Accept loop. Runs until the process is terminated.
pub async fn start_server_loop(listener: TcpListener, state: Arc<AppState>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => accept_connection(stream, peer_addr, &state).await,
            Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
        }
    }
}
