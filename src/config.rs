//! Configuration module for the vision server.
//!
//! Configuration is read from TOML. Every section and field has a default,
//! so an empty file (or no file at all) yields a working server that
//! accepts any upload up to 50 MiB with auth and rate limiting disabled.
//!
//! # Configuration Sources (in order of priority)
//! 1. `config.local.toml` - Local overrides (gitignored)
//! 2. `config.toml` - Main configuration file
//! 3. Default values
//!
//! # Example
//! ```rust,ignore
//! let config = Config::load("config.toml")?;
//! println!("Listening on {}", config.server.bind_address());
//! ```

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub upload: UploadConfig,
    pub rate_limit: RateLimitConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Request timeout in seconds
    pub request_timeout: u64,
    /// Maximum requests handled at once, across all routes
    pub max_concurrent_requests: usize,
    /// How often idle rate-limiter buckets are dropped, in seconds
    pub cleanup_interval_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            request_timeout: 30,
            max_concurrent_requests: 512,
            cleanup_interval_seconds: 60,
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for binding a listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Upload configuration shared by `/analyze` and `/blur`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Maximum size of the uploaded file (bytes)
    pub max_upload_size: u64,
    /// Name of the multipart field carrying the file
    pub field_name: String,
    /// Accepted MIME types. Empty accepts anything.
    pub allowed_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_upload_size: 50 * 1024 * 1024,
            field_name: "file".to_string(),
            allowed_types: Vec::new(),
        }
    }
}

impl UploadConfig {
    /// Check if a MIME type passes the allow-list
    pub fn is_allowed_type(&self, mime_type: &str) -> bool {
        self.allowed_types.is_empty() || self.allowed_types.iter().any(|t| t == mime_type)
    }

    /// Request body ceiling: the file limit plus room for multipart framing
    pub fn body_limit(&self) -> usize {
        (self.max_upload_size as usize).saturating_add(64 * 1024)
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    pub enabled: bool,
    /// Maximum requests per window, per client IP
    pub requests_per_window: u32,
    /// Window duration in seconds
    pub window_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            requests_per_window: 60,
            window_seconds: 60,
        }
    }
}

/// API key authentication configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Whether authentication is enabled
    pub enabled: bool,

    /// List of valid API keys
    pub api_keys: Vec<String>,

    /// Paths that require authentication (empty = all paths except public)
    pub protected_paths: Vec<String>,

    /// Paths that are always public (bypass auth)
    pub public_paths: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_keys: Vec::new(),
            protected_paths: Vec::new(),
            public_paths: vec!["/health".to_string()],
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a file path
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read, parsed or validated
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations
    ///
    /// Tries `config.local.toml`, then `config.toml`, then falls back to
    /// the built-in defaults.
    pub fn load_default() -> Result<Self, ConfigError> {
        for candidate in ["config.local.toml", "config.toml"] {
            if Path::new(candidate).exists() {
                return Self::load(candidate);
            }
        }

        let config = Self::default();
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be non-zero".to_string(),
            ));
        }

        if self.server.request_timeout == 0 {
            return Err(ConfigError::ValidationError(
                "server.request_timeout must be at least 1 second".to_string(),
            ));
        }

        if self.server.max_concurrent_requests == 0 {
            return Err(ConfigError::ValidationError(
                "server.max_concurrent_requests must be greater than 0".to_string(),
            ));
        }

        if self.upload.max_upload_size == 0 {
            return Err(ConfigError::ValidationError(
                "upload.max_upload_size must be greater than 0".to_string(),
            ));
        }

        if self.upload.field_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "upload.field_name must not be empty".to_string(),
            ));
        }

        if self.rate_limit.enabled
            && (self.rate_limit.requests_per_window == 0 || self.rate_limit.window_seconds == 0)
        {
            return Err(ConfigError::ValidationError(
                "rate_limit.requests_per_window and window_seconds must be non-zero".to_string(),
            ));
        }

        if self.auth.enabled && self.auth.api_keys.is_empty() {
            return Err(ConfigError::ValidationError(
                "auth is enabled but no api_keys are configured".to_string(),
            ));
        }

        let valid_formats = ["pretty", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.format must be one of: {:?}",
                valid_formats
            )));
        }

        Ok(())
    }
}
