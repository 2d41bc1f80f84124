//! Configuration management for the Ecofy weather service
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::WeatherError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable the platform historically used for the provider key
pub const LEGACY_API_KEY_VAR: &str = "WEATHER_API_KEY";

/// Root configuration structure for the weather service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EcofyConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Forecast provider configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Upstream response cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Upper bound for handling a single request, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u32,
}

/// Forecast provider (WeatherAPI.com) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Provider API key
    pub api_key: Option<String>,
    /// Base URL for the provider API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u32,
    /// Retries for transient failures. 0 disables retrying.
    #[serde(default)]
    pub max_retries: u32,
    /// Local guard on outbound calls per minute. 0 disables the guard.
    #[serde(default = "default_max_requests_per_minute")]
    pub max_requests_per_minute: u32,
}

/// Cache configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    /// Cache TTL in minutes
    #[serde(default = "default_cache_ttl")]
    pub ttl_minutes: u32,
    /// Cache directory location
    #[serde(default = "default_cache_location")]
    pub location: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// OTLP/HTTP collector endpoint; spans are only exported when set
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

// Default value functions
fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8000
}

fn default_request_timeout() -> u32 {
    30
}

fn default_weather_base_url() -> String {
    "https://api.weatherapi.com/v1".to_string()
}

fn default_weather_timeout() -> u32 {
    10
}

fn default_max_requests_per_minute() -> u32 {
    600
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_ttl() -> u32 {
    30
}

fn default_cache_location() -> String {
    dirs::cache_dir()
        .map(|dir| dir.join("ecofy-weather"))
        .unwrap_or_else(|| PathBuf::from(".cache/ecofy-weather"))
        .to_string_lossy()
        .into_owned()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            timeout_seconds: default_weather_timeout(),
            max_retries: 0,
            max_requests_per_minute: default_max_requests_per_minute(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            ttl_minutes: default_cache_ttl(),
            location: default_cache_location(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            otlp_endpoint: None,
        }
    }
}

impl EcofyConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("weather.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // ECOFY_WEATHER__API_KEY, ECOFY_SERVER__PORT, ...
        builder = builder.add_source(
            Environment::with_prefix("ECOFY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: EcofyConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        if config.weather.api_key.is_none() {
            config.weather.api_key = std::env::var(LEGACY_API_KEY_VAR)
                .ok()
                .filter(|key| !key.trim().is_empty());
        }

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ecofy").join("weather.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_server_host();
        }
        if self.server.request_timeout_seconds == 0 {
            self.server.request_timeout_seconds = default_request_timeout();
        }
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_weather_timeout();
        }
        if self.cache.ttl_minutes == 0 {
            self.cache.ttl_minutes = default_cache_ttl();
        }
        if self.cache.location.is_empty() {
            self.cache.location = default_cache_location();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self
            .logging
            .otlp_endpoint
            .as_deref()
            .is_some_and(|endpoint| endpoint.trim().is_empty())
        {
            self.logging.otlp_endpoint = None;
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        let Some(api_key) = &self.weather.api_key else {
            return Err(WeatherError::config(format!(
                "Weather API key is required but not configured. Set ECOFY_WEATHER__API_KEY or {LEGACY_API_KEY_VAR}."
            ))
            .into());
        };

        if api_key.trim().is_empty() {
            return Err(WeatherError::config("Weather API key cannot be empty").into());
        }

        if api_key.len() < 8 {
            return Err(WeatherError::config(
                "Weather API key appears to be invalid (too short). Please check your API key.",
            )
            .into());
        }

        if api_key.len() > 100 {
            return Err(WeatherError::config(
                "Weather API key appears to be invalid (too long). Please check your API key.",
            )
            .into());
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(WeatherError::config("Server port cannot be 0").into());
        }

        if self.server.request_timeout_seconds > 300 {
            return Err(
                WeatherError::config("Server request timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.weather.timeout_seconds > 300 {
            return Err(
                WeatherError::config("Weather API timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.weather.max_retries > 10 {
            return Err(WeatherError::config("Weather API max retries cannot exceed 10").into());
        }

        if self.server.request_timeout_seconds <= self.weather.timeout_seconds {
            return Err(WeatherError::config(format!(
                "Server request timeout ({}s) must exceed the weather API timeout ({}s)",
                self.server.request_timeout_seconds, self.weather.timeout_seconds
            ))
            .into());
        }

        if self.weather.max_requests_per_minute > 10_000 {
            return Err(WeatherError::config(
                "Weather API request budget cannot exceed 10000 requests per minute",
            )
            .into());
        }

        if self.cache.ttl_minutes > 1440 {
            return Err(WeatherError::config("Cache TTL cannot exceed 1440 minutes (1 day)").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WeatherError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(WeatherError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !is_http_url(&self.weather.base_url) {
            return Err(WeatherError::config(
                "Weather API base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        if let Some(endpoint) = &self.logging.otlp_endpoint {
            if !is_http_url(endpoint) {
                return Err(WeatherError::config(
                    "OTLP endpoint must be a valid HTTP or HTTPS URL",
                )
                .into());
            }
        }

        Ok(())
    }
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}
