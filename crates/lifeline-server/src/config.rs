//! Server configuration loading from file and environment variables.

use lifeline_lookup::LookupConfig;
use serde::Deserialize;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Telephony provider account and call transfer settings.
    #[serde(default)]
    pub telephony: TelephonyConfig,

    /// Resource inference service settings.
    #[serde(default)]
    pub lookup: LookupConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Telephony provider settings.
#[derive(Clone, Default, Deserialize)]
pub struct TelephonyConfig {
    /// Provider account identifier.
    #[serde(default)]
    pub account_sid: String,

    /// Provider auth token. Never logged.
    #[serde(default)]
    pub auth_token: String,

    /// Number callers are transferred to from the reroute stage.
    #[serde(default)]
    pub reroute_number: String,
}

impl fmt::Debug for TelephonyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelephonyConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"[REDACTED]")
            .field("reroute_number", &self.reroute_number)
            .finish()
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "lifeline_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults, then
/// applies overrides from the process environment.
///
/// Environment variable overrides:
/// - `LIFELINE_HOST` overrides `server.host`
/// - `LIFELINE_PORT` (or `PORT`) overrides `server.port`
/// - `TWILIO_ACC_ID` overrides `telephony.account_sid`
/// - `AUTH_TOKEN` overrides `telephony.auth_token`
/// - `TEAM_PHONE` overrides `telephony.reroute_number`
/// - `LIFELINE_LOOKUP_URL` overrides `lookup.base_url`
/// - `LIFELINE_LOOKUP_TIMEOUT_SECS` overrides `lookup.timeout_secs`
/// - `LIFELINE_LOG_LEVEL` overrides `logging.level`
/// - `LIFELINE_LOG_JSON` overrides `logging.json` (set to "true" to enable)
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Like [`load_config`], reading overrides through `env` instead of the
/// process environment.
pub fn load_config_with_env<F>(path: Option<&str>, env: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    if let Some(host) = env("LIFELINE_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Some(port) = env("LIFELINE_PORT").or_else(|| env("PORT")) {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Some(account_sid) = env("TWILIO_ACC_ID") {
        config.telephony.account_sid = account_sid;
    }
    if let Some(auth_token) = env("AUTH_TOKEN") {
        config.telephony.auth_token = auth_token;
    }
    if let Some(number) = env("TEAM_PHONE") {
        config.telephony.reroute_number = number;
    }
    if let Some(url) = env("LIFELINE_LOOKUP_URL") {
        config.lookup.base_url = url;
    }
    if let Some(timeout) = env("LIFELINE_LOOKUP_TIMEOUT_SECS") {
        if let Ok(parsed) = timeout.parse() {
            config.lookup.timeout_secs = parsed;
        }
    }
    if let Some(level) = env("LIFELINE_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = env("LIFELINE_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }

    Ok(config)
}
