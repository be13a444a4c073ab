//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality shared by the static
//! file server, the proxy route and the preflight responder.

pub mod cache;
pub mod cors;
pub mod mime;
pub mod response;

// Re-export commonly used builders
pub use response::{
    build_304_response, build_404_response, build_501_response, build_error_response,
    build_file_response, build_html_response, build_preflight_response, build_proxied_response,
    build_redirect_response,
};
