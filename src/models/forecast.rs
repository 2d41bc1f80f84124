//! Forecast request and response models
//!
//! These are the public, provider-independent shapes returned by the API.
//! They are built per request and dropped once the response is written.

use super::LocationQuery;
use crate::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fewest forecast days a query may ask for
pub const MIN_FORECAST_DAYS: u8 = 1;
/// Most forecast days the provider serves
pub const MAX_FORECAST_DAYS: u8 = 14;
/// Hourly records every detailed forecast day carries
pub const HOURS_PER_DAY: usize = 24;

/// A validated forecast request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastQuery {
    pub location: LocationQuery,
    /// Always within `MIN_FORECAST_DAYS..=MAX_FORECAST_DAYS`
    pub days: u8,
    pub include_alerts: bool,
    pub include_aqi: bool,
}

impl ForecastQuery {
    /// Build a query from raw request values.
    ///
    /// A missing day count means the maximum; out-of-range counts are
    /// clamped to the nearest bound instead of being rejected.
    pub fn new(
        location: &str,
        days: Option<i64>,
        include_alerts: bool,
        include_aqi: bool,
    ) -> Result<Self> {
        Ok(Self {
            location: LocationQuery::parse(location)?,
            days: clamp_days(days.unwrap_or(i64::from(MAX_FORECAST_DAYS))),
            include_alerts,
            include_aqi,
        })
    }
}

/// Clamp a requested day count into the supported range
#[must_use]
pub fn clamp_days(days: i64) -> u8 {
    let clamped = days.clamp(i64::from(MIN_FORECAST_DAYS), i64::from(MAX_FORECAST_DAYS));
    u8::try_from(clamped).unwrap_or(MAX_FORECAST_DAYS)
}

/// Daily summary record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub condition: String,
    pub icon: String,
    pub max_temp_c: f64,
    pub min_temp_c: f64,
    pub avg_temp_c: f64,
    /// Percent, 0-100
    pub chance_of_rain: u8,
    pub total_precip_mm: f64,
    /// Percent, 0-100
    pub avg_humidity: u8,
    pub max_wind_kph: f64,
    pub uv: f64,
    pub sunrise: String,
    pub sunset: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_quality: Option<AirQuality>,
}

/// One hour of a detailed forecast day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecast {
    /// Local time, "YYYY-MM-DD HH:MM"
    pub time: String,
    pub temp_c: f64,
    pub feelslike_c: f64,
    pub condition: String,
    pub icon: String,
    pub is_day: bool,
    pub wind_kph: f64,
    pub wind_degree: u16,
    pub wind_dir: String,
    pub gust_kph: f64,
    pub pressure_mb: f64,
    pub precip_mm: f64,
    pub humidity: u8,
    pub cloud: u8,
    pub chance_of_rain: u8,
    pub chance_of_snow: u8,
    pub will_it_rain: bool,
    pub vis_km: f64,
    pub uv: f64,
}

/// Daily summary plus astronomy details and the 24 hourly records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedForecastDay {
    #[serde(flatten)]
    pub summary: ForecastDay,
    pub moonrise: String,
    pub moonset: String,
    pub moon_phase: String,
    pub hourly: Vec<HourlyForecast>,
}

/// Air quality readings; every pollutant is optional upstream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AirQuality {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub co: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub o3: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub so2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pm2_5: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pm10: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub us_epa_index: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gb_defra_index: Option<u8>,
}

/// Government weather alert issued for the location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherAlert {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub areas: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
}

/// Simple forecast: one summary record per day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleForecast {
    pub location_name: String,
    pub country: String,
    pub timezone: String,
    pub local_time: String,
    pub forecast_days: Vec<ForecastDay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alerts: Option<Vec<WeatherAlert>>,
}

/// Detailed forecast: summaries plus hourly records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedForecast {
    pub location_name: String,
    pub country: String,
    pub timezone: String,
    pub local_time: String,
    pub forecast_days: Vec<DetailedForecastDay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alerts: Option<Vec<WeatherAlert>>,
}

/// Precipitation aggregate over the forecast range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RainfallSummary {
    pub location_name: String,
    pub country: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub days: usize,
    pub total_precip_mm: f64,
    pub max_daily_precip_mm: f64,
    /// Days with at least `RAINY_DAY_THRESHOLD_MM` of precipitation
    pub rainy_days: usize,
    pub average_chance_of_rain: f64,
}

/// Daily precipitation at which a day counts as rainy
pub const RAINY_DAY_THRESHOLD_MM: f64 = 1.0;

impl RainfallSummary {
    /// Sum precipitation across the days of a simple forecast
    #[must_use]
    pub fn from_forecast(forecast: &SimpleForecast) -> Self {
        let days = &forecast.forecast_days;

        let total_precip_mm: f64 = days.iter().map(|d| d.total_precip_mm).sum();
        let max_daily_precip_mm = days
            .iter()
            .map(|d| d.total_precip_mm)
            .fold(0.0_f64, f64::max);
        let rainy_days = days
            .iter()
            .filter(|d| d.total_precip_mm >= RAINY_DAY_THRESHOLD_MM)
            .count();
        let average_chance_of_rain = if days.is_empty() {
            0.0
        } else {
            let sum: f64 = days.iter().map(|d| f64::from(d.chance_of_rain)).sum();
            round_to(sum / days.len() as f64, 1)
        };

        Self {
            location_name: forecast.location_name.clone(),
            country: forecast.country.clone(),
            start_date: days.iter().map(|d| d.date).min(),
            end_date: days.iter().map(|d| d.date).max(),
            days: days.len(),
            total_precip_mm: round_to(total_precip_mm, 2),
            max_daily_precip_mm,
            rainy_days,
            average_chance_of_rain,
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}
