// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub site: SiteConfig,
    pub assets: AssetsConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    /// Seconds to wait for in-flight connections after a shutdown signal
    pub shutdown_grace: u64,
}

/// Site identity reported by the API
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SiteConfig {
    /// Deployment environment name (production, staging, ...)
    pub environment: String,
    /// `message` field of the health endpoint
    pub api_name: String,
    /// Text returned to the visitor after a successful contact submission
    pub contact_confirmation: String,
}

/// Static asset bundle configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AssetsConfig {
    /// Directory holding the built frontend bundle
    pub root: String,
    /// Single-page-app entry document, relative to `root`
    pub index_file: String,
    /// Browser cache lifetime in seconds
    pub browser_ttl: u32,
    /// Shared (CDN/edge) cache lifetime in seconds
    pub edge_ttl: u32,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub max_body_size: u64,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
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
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// Transactional email delivery for contact submissions.
///
/// Delivery is disabled unless `api_key` is set.
#[derive(Debug, Deserialize, Clone)]
pub struct NotifierConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_notifier_endpoint")]
    pub endpoint: String,
    /// Recipient mailbox
    #[serde(default)]
    pub to: Option<String>,
    /// Sender address on a verified domain
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default = "default_subject_prefix")]
    pub subject_prefix: String,
    /// Request timeout in seconds
    #[serde(default = "default_notifier_timeout")]
    pub timeout: u64,
}

#[allow(clippy::missing_const_for_fn)]
fn default_notifier_endpoint() -> String {
    "https://api.resend.com/emails".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_subject_prefix() -> String {
    "Portfolio Contact: ".to_string()
}

const fn default_notifier_timeout() -> u64 {
    10
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_notifier_endpoint(),
            to: None,
            from: None,
            subject_prefix: default_subject_prefix(),
            timeout: default_notifier_timeout(),
        }
    }
}
