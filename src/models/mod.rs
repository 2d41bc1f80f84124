//! Data models for the weather service
//!
//! This module contains the public request/response models organized by concern:
//! - Location: free-form location queries
//! - Forecast: forecast queries, daily/hourly records, rainfall aggregates
//! - Current: real-time conditions

pub mod current;
pub mod forecast;
pub mod location;

// Re-export all public types for convenient access
pub use current::CurrentConditions;
pub use forecast::{
    AirQuality, DetailedForecast, DetailedForecastDay, ForecastDay, ForecastQuery,
    HourlyForecast, RainfallSummary, SimpleForecast, WeatherAlert, HOURS_PER_DAY,
    MAX_FORECAST_DAYS, MIN_FORECAST_DAYS,
};
pub use location::LocationQuery;
