// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub proxy: ProxyConfig,
    pub cors: CorsConfig,
    pub http: HttpConfig,
    pub performance: PerformanceConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Host name shown in the startup banner
    pub public_host: String,
    /// Directory static files are served from
    pub root: String,
    /// Serve each connection on its own local task instead of one at a time
    pub concurrent: bool,
}

/// Proxy route configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ProxyConfig {
    /// Path reserved for proxy requests (e.g. `/proxy`)
    pub route: String,
    /// Query parameter holding the target URL
    pub param: String,
    /// Outbound request timeout in seconds
    pub timeout: u64,
    pub user_agent: String,
    /// Content-Type sent with every relayed body
    pub content_type: String,
    /// Attach CORS headers when relaying an upstream error status
    pub cors_on_upstream_error: bool,
}

impl ProxyConfig {
    /// Literal prefix that routes a request to the proxy (`/proxy?url=`)
    pub fn route_prefix(&self) -> String {
        format!("{}?{}=", self.route, self.param)
    }

    /// Whole-request budget for one outbound fetch
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// CORS header values
#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origin: String,
    pub allow_methods: String,
    pub allow_headers: String,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub index_files: Vec<String>,
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    /// Upper bound for serving a single connection, in seconds
    pub connection_timeout: u64,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "common".to_string()
}
