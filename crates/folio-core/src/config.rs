use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable pointing at an explicit config file.
pub const CONFIG_PATH_ENV: &str = "FOLIO_CONFIG";

/// Environment variable overriding `server.port`.
pub const PORT_ENV: &str = "PORT";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a single-line message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    /// Open-Meteo and Nominatim endpoints
    #[serde(default)]
    pub upstream: UpstreamConfig,

    #[serde(default)]
    pub cache: CacheSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins. A single `"*"` allows any origin.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Open-Meteo geocoding API base (forward search)
    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: String,

    /// Open-Meteo forecast API base
    #[serde(default = "default_forecast_url")]
    pub forecast_url: String,

    /// Nominatim base used for reverse lookups
    #[serde(default = "default_reverse_geocoding_url")]
    pub reverse_geocoding_url: String,

    /// Nominatim rejects requests without an identifying user agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_geocoding_url() -> String {
    "https://geocoding-api.open-meteo.com/v1".to_string()
}

fn default_forecast_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_reverse_geocoding_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_user_agent() -> String {
    concat!("Folio/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            geocoding_url: default_geocoding_url(),
            forecast_url: default_forecast_url(),
            reverse_geocoding_url: default_reverse_geocoding_url(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Entry lifetime in seconds
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,

    /// Maximum number of entries per cache (0 = unbounded)
    #[serde(default)]
    pub max_entries: usize,

    /// Background sweep interval in seconds (0 = expire lazily on read only)
    #[serde(default)]
    pub sweep_interval_secs: u64,
}

fn default_ttl() -> u64 {
    600
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl(),
            max_entries: 0,
            sweep_interval_secs: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive; `RUST_LOG` wins when set
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl Config {
    /// Load configuration from `FOLIO_CONFIG` or the user config directory.
    ///
    /// A missing file is not an error; defaults are used instead. Problems
    /// with environment overrides are returned as warnings, since logging
    /// is not initialised yet.
    pub fn load() -> Result<(Self, ValidationResult)> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => Self::default(),
        };

        let mut notes = ValidationResult::default();
        config.apply_port_override(std::env::var(PORT_ENV).ok().as_deref(), &mut notes);
        Ok((config, notes))
    }

    /// Parse configuration from a specific TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        toml::from_str(&contents).context("Failed to parse config file")
    }

    /// Load configuration and validate it
    ///
    /// Returns an error if validation fails with critical errors.
    /// Warnings are returned alongside the config so the caller can log
    /// them once logging is up.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let (config, notes) = Self::load()?;
        let mut validation = config.validate();
        validation.warnings.extend(notes.warnings);

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        Ok((config, validation))
    }

    fn apply_port_override(&mut self, value: Option<&str>, notes: &mut ValidationResult) {
        let Some(port) = value else {
            return;
        };
        match port.parse() {
            Ok(p) => self.server.port = p,
            Err(_) => notes.add_warning(PORT_ENV, format!("Ignoring invalid value: {}", port)),
        }
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        validate_url(&self.upstream.geocoding_url, "upstream.geocoding_url", &mut result);
        validate_url(&self.upstream.forecast_url, "upstream.forecast_url", &mut result);
        validate_url(
            &self.upstream.reverse_geocoding_url,
            "upstream.reverse_geocoding_url",
            &mut result,
        );

        if self.upstream.request_timeout_secs == 0 {
            result.add_error(
                "upstream.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        }

        if self.cache.ttl_secs == 0 {
            result.add_error("cache.ttl_secs", "Cache TTL must be greater than 0");
        } else if self.cache.ttl_secs > 86_400 {
            result.add_warning("cache.ttl_secs", "Cache TTL is more than 24 hours");
        }

        let origins = &self.server.cors_origins;
        if origins.is_empty() {
            result.add_warning("server.cors_origins", "No CORS origins; browsers will be rejected");
        } else if origins.iter().any(|o| o.trim() == "*") {
            if origins.len() > 1 {
                result.add_error(
                    "server.cors_origins",
                    "\"*\" cannot be combined with explicit origins",
                );
            } else {
                result.add_warning("server.cors_origins", "CORS allows any origin");
            }
        }

        result
    }

    fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|d| d.join("folio").join("config.toml"))
    }
}

fn validate_url(url_str: &str, field_name: &str, result: &mut ValidationResult) {
    match Url::parse(url_str) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                result.add_error(
                    field_name,
                    format!("URL must use http or https scheme, got: {}", url.scheme()),
                );
            }
            if url.host().is_none() {
                result.add_error(field_name, "URL must have a host");
            }
        }
        Err(e) => result.add_error(field_name, format!("Invalid URL: {}", e)),
    }
}
