use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::Path;
use url::Url;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Cross-origin policy applied to every response
    #[serde(default)]
    pub cors: CorsConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// HTTP listener configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind, 0 picks a free port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path of the alignment endpoint
    #[serde(default = "default_route")]
    pub route: String,

    /// Maximum request body size in bytes, 0 disables the cap
    #[serde(default = "default_max_request_bytes")]
    pub max_request_bytes: usize,

    /// Time allowed for a client to send its request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// Address string suitable for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Body size cap, `None` when unlimited
    pub fn body_limit(&self) -> Option<usize> {
        (self.max_request_bytes > 0).then_some(self.max_request_bytes)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            route: default_route(),
            max_request_bytes: default_max_request_bytes(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Cross-origin resource sharing configuration
///
/// The `allow_all_*` switches take precedence over the explicit lists,
/// which are only consulted when the matching switch is off.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CorsConfig {
    /// Accept requests from any origin
    #[serde(default = "default_true")]
    pub allow_all_origins: bool,

    /// Origins accepted when `allow_all_origins` is off
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    /// Accept any standard method in preflights
    #[serde(default = "default_true")]
    pub allow_all_methods: bool,

    /// Methods accepted when `allow_all_methods` is off
    #[serde(default = "default_allowed_methods")]
    pub allowed_methods: Vec<String>,

    /// Accept any request header in preflights
    #[serde(default = "default_true")]
    pub allow_all_headers: bool,

    /// Headers accepted when `allow_all_headers` is off
    #[serde(default)]
    pub allowed_headers: Vec<String>,

    /// Send `Access-Control-Allow-Credentials: true`
    #[serde(default = "default_true")]
    pub allow_credentials: bool,

    /// Preflight cache lifetime in seconds
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_all_origins: true,
            allowed_origins: Vec::new(),
            allow_all_methods: true,
            allowed_methods: default_allowed_methods(),
            allow_all_headers: true,
            allowed_headers: Vec::new(),
            allow_credentials: true,
            max_age_secs: default_max_age_secs(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Equivalent filter for the log facade
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_route() -> String {
    "/api/align".to_string()
}

fn default_max_request_bytes() -> usize {
    1024 * 1024 // 1 MiB of text on both sides together
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_allowed_methods() -> Vec<String> {
    vec!["POST".to_string(), "OPTIONS".to_string()]
}

fn default_max_age_secs() -> u64 {
    600
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Write configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(anyhow!("Server host must not be empty"));
        }

        if !self.server.route.starts_with('/') {
            return Err(anyhow!("Endpoint route must start with '/': {}", self.server.route));
        }

        if self.server.request_timeout_secs == 0 {
            return Err(anyhow!("Request timeout must be at least one second"));
        }

        if !self.cors.allow_all_origins {
            if self.cors.allowed_origins.is_empty() {
                return Err(anyhow!("CORS allows no origin: enable allow_all_origins or list allowed_origins"));
            }

            for origin in &self.cors.allowed_origins {
                let url = Url::parse(origin)
                    .with_context(|| format!("Invalid CORS origin: {}", origin))?;
                if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
                    return Err(anyhow!("CORS origin must be an http(s) URL: {}", origin));
                }
            }
        }

        if !self.cors.allow_all_methods && self.cors.allowed_methods.is_empty() {
            return Err(anyhow!("CORS allows no method: enable allow_all_methods or list allowed_methods"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig::default(),
            cors: CorsConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
