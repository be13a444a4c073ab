//! CORS header injection

use crate::config::CorsConfig;
use hyper::header::{
    HeaderMap, HeaderName, HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};

/// Set the three `Access-Control-Allow-*` headers.
///
/// Existing values are replaced, never appended, so applying twice is harmless.
pub fn apply(headers: &mut HeaderMap, cors: &CorsConfig) {
    set(headers, ACCESS_CONTROL_ALLOW_ORIGIN, &cors.allow_origin);
    set(headers, ACCESS_CONTROL_ALLOW_METHODS, &cors.allow_methods);
    set(headers, ACCESS_CONTROL_ALLOW_HEADERS, &cors.allow_headers);
}

fn set(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(v) => {
            headers.insert(name, v);
        }
        Err(e) => {
            crate::logger::log_warning(&format!("Invalid CORS value for {name}: {e}"));
        }
    }
}
