//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides; command
//! line flags are applied on top in `main`.

use clap::ValueEnum;
use serde::Deserialize;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::render::{PayloadKind, TimeFormat};
use crate::session::SessionConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub session: SessionSettings,

    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Listen address; `:8080` binds all interfaces
    #[serde(default = "default_addr")]
    pub addr: String,

    /// Largest inbound WebSocket message accepted (bytes)
    #[serde(default = "default_read_limit")]
    pub read_limit: usize,
}

fn default_addr() -> String {
    ":8080".to_string()
}

fn default_read_limit() -> usize {
    512
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            read_limit: default_read_limit(),
        }
    }
}

/// Session timer configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    #[serde(default = "default_push_interval")]
    pub push_interval_ms: u64,

    #[serde(default = "default_write_wait")]
    pub write_wait_ms: u64,

    #[serde(default = "default_pong_wait")]
    pub pong_wait_ms: u64,

    /// Defaults to nine tenths of `pong_wait_ms`
    pub ping_period_ms: Option<u64>,
}

fn default_push_interval() -> u64 {
    1000 // 1 second
}

fn default_write_wait() -> u64 {
    10_000 // 10 seconds
}

fn default_pong_wait() -> u64 {
    60_000 // 60 seconds
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            push_interval_ms: default_push_interval(),
            write_wait_ms: default_write_wait(),
            pong_wait_ms: default_pong_wait(),
            ping_period_ms: None,
        }
    }
}

/// Payload rendering configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    #[serde(default)]
    pub payload: PayloadKind,

    #[serde(default = "default_canvas_side")]
    pub width: u32,

    #[serde(default = "default_canvas_side")]
    pub height: u32,

    #[serde(default)]
    pub time_format: TimeFormat,
}

fn default_canvas_side() -> u32 {
    400
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            payload: PayloadKind::default(),
            width: default_canvas_side(),
            height: default_canvas_side(),
            time_format: TimeFormat::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// First config file found in the default locations
    pub fn discover() -> Option<PathBuf> {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("livepush").join("config.toml")),
            Some(PathBuf::from("/etc/livepush/config.toml")),
            Some(PathBuf::from("./livepush.toml")),
        ];

        config_paths.into_iter().flatten().find(|p| p.exists())
    }

    /// Apply `LIVEPUSH_*` environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup
    ///
    /// Values that fail to parse are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(addr) = lookup("LIVEPUSH_ADDR") {
            self.server.addr = addr;
        }
        if let Some(limit) = lookup("LIVEPUSH_READ_LIMIT").and_then(|s| s.parse().ok()) {
            self.server.read_limit = limit;
        }

        // Session overrides
        if let Some(ms) = lookup("LIVEPUSH_PUSH_INTERVAL_MS").and_then(|s| s.parse().ok()) {
            self.session.push_interval_ms = ms;
        }
        if let Some(ms) = lookup("LIVEPUSH_WRITE_WAIT_MS").and_then(|s| s.parse().ok()) {
            self.session.write_wait_ms = ms;
        }
        if let Some(ms) = lookup("LIVEPUSH_PONG_WAIT_MS").and_then(|s| s.parse().ok()) {
            self.session.pong_wait_ms = ms;
        }
        if let Some(ms) = lookup("LIVEPUSH_PING_PERIOD_MS").and_then(|s| s.parse().ok()) {
            self.session.ping_period_ms = Some(ms);
        }

        // Render overrides
        if let Some(kind) = lookup("LIVEPUSH_PAYLOAD").and_then(|s| PayloadKind::from_str(&s, true).ok()) {
            self.render.payload = kind;
        }
        if let Some(format) =
            lookup("LIVEPUSH_TIME_FORMAT").and_then(|s| TimeFormat::from_str(&s, true).ok())
        {
            self.render.time_format = format;
        }

        // Logging overrides
        if let Some(level) = lookup("LIVEPUSH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("LIVEPUSH_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Session timers, validated
    pub fn session_config(&self) -> Result<SessionConfig, ConfigError> {
        let settings = &self.session;
        let mut config = SessionConfig::new(
            Duration::from_millis(settings.push_interval_ms),
            Duration::from_millis(settings.write_wait_ms),
            Duration::from_millis(settings.pong_wait_ms),
        );
        if let Some(ms) = settings.ping_period_ms {
            config = config.with_ping_period(Duration::from_millis(ms));
        }

        config
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(config)
    }

    /// Resolve the listen address
    ///
    /// Accepts `host:port`, `ip:port`, or `:port` for all interfaces.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = self.server.addr.trim();
        let full = if addr.starts_with(':') {
            format!("0.0.0.0{}", addr)
        } else {
            addr.to_string()
        };

        if let Ok(parsed) = full.parse::<SocketAddr>() {
            return Ok(parsed);
        }

        full.to_socket_addrs()
            .ok()
            .and_then(|mut addrs| addrs.next())
            .ok_or_else(|| ConfigError::Invalid(format!("invalid listen address: {}", addr)))
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Livepush Configuration
#
# Environment variables override these settings:
# - LIVEPUSH_ADDR
# - LIVEPUSH_READ_LIMIT
# - LIVEPUSH_PUSH_INTERVAL_MS
# - LIVEPUSH_WRITE_WAIT_MS
# - LIVEPUSH_PONG_WAIT_MS
# - LIVEPUSH_PING_PERIOD_MS
# - LIVEPUSH_PAYLOAD
# - LIVEPUSH_TIME_FORMAT
# - LIVEPUSH_LOG_LEVEL
# - LIVEPUSH_LOG_FORMAT

[server]
# Listen address (":8080" binds all interfaces)
addr = ":8080"

# Largest inbound WebSocket message accepted (bytes)
read_limit = 512

[session]
# How often a fresh payload is pushed (ms)
push_interval_ms = 1000

# Deadline for a single outbound frame (ms)
write_wait_ms = 10000

# Liveness window: peer silence tolerated before the session is dropped (ms)
pong_wait_ms = 60000

# Ping period (ms); defaults to nine tenths of pong_wait_ms
# ping_period_ms = 54000

[render]
# Payload: svg or timestamp
payload = "svg"

# SVG canvas size
width = 400
height = 400

# Time format: rfc3339 or datetime
time_format = "rfc3339"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
