// Application state module
// Holds the startup configuration and the resources derived from it

use std::path::PathBuf;

use super::types::Config;
use crate::handler::proxy;

/// Application state, shared read-only by every request
pub struct AppState {
    pub config: Config,
    /// Static file root, resolved once at startup
    pub root: PathBuf,
    /// Outbound client used by the proxy route
    pub client: reqwest::Client,
    /// `/proxy?url=` style prefix, precomputed for routing
    pub proxy_prefix: String,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = proxy::build_client(&config.proxy)?;
        Ok(Self {
            config: config.clone(),
            root: PathBuf::from(&config.server.root),
            client,
            proxy_prefix: config.proxy.route_prefix(),
        })
    }
}
