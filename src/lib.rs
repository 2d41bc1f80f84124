//! Ecofy weather service
//!
//! Retrieves forecasts from WeatherAPI.com and serves them over HTTP in a
//! stable, simplified shape for the Ecofy agricultural platform.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod telemetry;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use cache::PersistentCache;
pub use config::EcofyConfig;
pub use error::WeatherError;
pub use models::{
    CurrentConditions, DetailedForecast, ForecastDay, ForecastQuery, LocationQuery,
    RainfallSummary, SimpleForecast,
};
pub use service::WeatherService;
pub use weather::{WeatherApiClient, WeatherProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeatherError>;
