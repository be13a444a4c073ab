//! Local development server: static files plus a CORS-enabling GET proxy.
//!
//! `GET /proxy?url=<target>` fetches `<target>` and relays the body with
//! `Access-Control-Allow-*` headers; every other GET is served from the
//! static root, and any OPTIONS request gets a preflight reply.

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

#[cfg(test)]
mod test_support;
