// Configuration module entry point
// Loads the startup configuration and holds per-process state

mod state;
mod types;

use std::net::SocketAddr;
use std::time::Duration;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, CorsConfig, HttpConfig, LoggingConfig, PerformanceConfig, ProxyConfig, ServerConfig,
};

/// Default config file name (without extension), looked up in the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from specified file path (without extension)
    /// The file is optional; built-in defaults reproduce the stock dev server
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("CORSPROXY")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("server.public_host", "localhost")?
            .set_default("server.root", ".")?
            .set_default("server.concurrent", false)?
            .set_default("proxy.route", "/proxy")?
            .set_default("proxy.param", "url")?
            .set_default("proxy.timeout", 30)?
            .set_default("proxy.user_agent", "Mozilla/5.0")?
            .set_default("proxy.content_type", "text/xml; charset=utf-8")?
            .set_default("proxy.cors_on_upstream_error", false)?
            .set_default("cors.allow_origin", "*")?
            .set_default("cors.allow_methods", "GET, OPTIONS")?
            .set_default("cors.allow_headers", "Content-Type")?
            .set_default(
                "http.server_name",
                concat!("cors-devserver/", env!("CARGO_PKG_VERSION")),
            )?
            .set_default("http.index_files", vec!["index.html", "index.htm"])?
            .set_default("performance.connection_timeout", 60)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "common")?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Base URL announced at startup
    pub fn public_url(&self) -> String {
        format!("http://{}:{}", self.server.public_host, self.server.port)
    }

    pub const fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.performance.connection_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("does-not-exist/config").unwrap();
        assert_eq!(cfg.server.port, 8000);
        assert_eq!(cfg.server.root, ".");
        assert!(!cfg.server.concurrent);
        assert_eq!(cfg.proxy.route_prefix(), "/proxy?url=");
        assert_eq!(cfg.proxy.timeout, 30);
        assert_eq!(cfg.proxy.user_agent, "Mozilla/5.0");
        assert_eq!(cfg.proxy.content_type, "text/xml; charset=utf-8");
        assert_eq!(cfg.cors.allow_methods, "GET, OPTIONS");
        assert_eq!(cfg.http.index_files, vec!["index.html", "index.htm"]);
        assert_eq!(cfg.logging.access_log_format, "common");
    }

    #[test]
    fn test_socket_addr_is_loopback() {
        let cfg = Config::load_from("does-not-exist/config").unwrap();
        let addr = cfg.get_socket_addr().unwrap();
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), 8000);
        assert_eq!(cfg.public_url(), "http://localhost:8000");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[server]\nport = 9100\nroot = \"public\"\n\n[proxy]\nroute = \"/fetch\"\ntimeout = 5\n",
        )
        .unwrap();

        let stem = dir.path().join("custom");
        let cfg = Config::load_from(stem.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 9100);
        assert_eq!(cfg.server.root, "public");
        assert_eq!(cfg.proxy.route_prefix(), "/fetch?url=");
        assert_eq!(cfg.proxy.request_timeout(), Duration::from_secs(5));
        // Untouched sections keep their defaults
        assert_eq!(cfg.server.host, "127.0.0.1");
    }

    #[test]
    fn test_invalid_host_is_reported() {
        let mut cfg = Config::load_from("does-not-exist/config").unwrap();
        cfg.server.host = "not a host".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }
}
