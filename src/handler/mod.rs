//! Request handler module
//!
//! Responsible for request dispatch: the preflight responder, the proxy
//! forwarder and the static file server.

pub mod proxy;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
