// Configuration module entry point
// Loads layered configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{AssetsConfig, Config, NotifierConfig};

/// Environment variable prefix, e.g. `PORTFOLIO_SITE__ENVIRONMENT=staging`
const ENV_PREFIX: &str = "PORTFOLIO";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.shutdown_grace", 10)?
            .set_default("site.environment", "production")?
            .set_default("site.api_name", "Portfolio API")?
            .set_default(
                "site.contact_confirmation",
                "Thank you for your message! I will get back to you soon.",
            )?
            .set_default("assets.root", "static")?
            .set_default("assets.index_file", "index.html")?
            .set_default("assets.browser_ttl", 86_400)? // 24 hours
            .set_default("assets.edge_ttl", 604_800)? // 7 days
            .set_default("http.server_name", "portfolio-edge")?
            .set_default("http.max_body_size", 65_536)? // 64KB
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
