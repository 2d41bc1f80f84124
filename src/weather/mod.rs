//! Forecast provider integration
//!
//! - `client`: HTTP client for WeatherAPI.com
//! - `weatherapi`: provider payload structures
//! - `normalize`: provider payload to public response models
//! - `rate_limit`: local guard on outbound call volume

use crate::Result;
use crate::models::{ForecastQuery, LocationQuery};
use async_trait::async_trait;

pub mod client;
pub mod normalize;
pub mod rate_limit;
pub mod weatherapi;

pub use client::WeatherApiClient;
pub use rate_limit::RateLimiter;

/// Source of raw forecast data
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Multi-day forecast including hourly records
    async fn forecast(&self, query: &ForecastQuery) -> Result<weatherapi::ForecastResponse>;

    /// Real-time conditions
    async fn current(
        &self,
        location: &LocationQuery,
        include_aqi: bool,
    ) -> Result<weatherapi::CurrentResponse>;
}
