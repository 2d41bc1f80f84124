//! WeatherAPI.com response structures
//!
//! Only the fields the normalizer reads are declared. Optional blocks
//! (`alerts`, `air_quality`, astronomy strings) default when absent so a
//! thinner payload never fails to decode.

use chrono::NaiveDate;
use serde::Deserialize;

/// `forecast.json` response
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastResponse {
    pub location: ProviderLocation,
    pub forecast: Forecast,
    #[serde(default)]
    pub alerts: Option<Alerts>,
}

/// `current.json` response
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentResponse {
    pub location: ProviderLocation,
    pub current: Current,
}

/// Error envelope returned with non-2xx statuses
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: ProviderError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderError {
    pub code: u32,
    #[serde(default)]
    pub message: String,
}

/// Provider error codes that describe the location query itself
pub mod error_codes {
    /// Parameter q is missing
    pub const QUERY_MISSING: u32 = 1003;
    /// API request url is invalid
    pub const INVALID_REQUEST_URL: u32 = 1005;
    /// No location found matching parameter q
    pub const NO_MATCHING_LOCATION: u32 = 1006;
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderLocation {
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lon: f64,
    #[serde(default)]
    pub tz_id: String,
    #[serde(default)]
    pub localtime: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub code: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Forecast {
    #[serde(default)]
    pub forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub day: Day,
    #[serde(default)]
    pub astro: Astro,
    #[serde(default)]
    pub hour: Vec<Hour>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Day {
    pub maxtemp_c: f64,
    pub mintemp_c: f64,
    pub avgtemp_c: f64,
    #[serde(default)]
    pub maxwind_kph: f64,
    #[serde(default)]
    pub totalprecip_mm: f64,
    /// Sent as an integer by older API versions, a float by newer ones
    #[serde(default)]
    pub avghumidity: f64,
    #[serde(default)]
    pub daily_chance_of_rain: f64,
    #[serde(default)]
    pub condition: Condition,
    #[serde(default)]
    pub uv: f64,
    #[serde(default)]
    pub air_quality: Option<AirQuality>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Astro {
    #[serde(default)]
    pub sunrise: String,
    #[serde(default)]
    pub sunset: String,
    #[serde(default)]
    pub moonrise: String,
    #[serde(default)]
    pub moonset: String,
    #[serde(default)]
    pub moon_phase: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Hour {
    pub time: String,
    pub temp_c: f64,
    #[serde(default)]
    pub feelslike_c: f64,
    #[serde(default)]
    pub is_day: u8,
    #[serde(default)]
    pub condition: Condition,
    #[serde(default)]
    pub wind_kph: f64,
    #[serde(default)]
    pub wind_degree: u16,
    #[serde(default)]
    pub wind_dir: String,
    #[serde(default)]
    pub gust_kph: f64,
    #[serde(default)]
    pub pressure_mb: f64,
    #[serde(default)]
    pub precip_mm: f64,
    #[serde(default)]
    pub humidity: f64,
    #[serde(default)]
    pub cloud: f64,
    #[serde(default)]
    pub chance_of_rain: f64,
    #[serde(default)]
    pub chance_of_snow: f64,
    #[serde(default)]
    pub will_it_rain: u8,
    #[serde(default)]
    pub vis_km: f64,
    #[serde(default)]
    pub uv: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Current {
    #[serde(default)]
    pub last_updated: String,
    pub temp_c: f64,
    #[serde(default)]
    pub feelslike_c: f64,
    #[serde(default)]
    pub is_day: u8,
    #[serde(default)]
    pub condition: Condition,
    #[serde(default)]
    pub wind_kph: f64,
    #[serde(default)]
    pub wind_degree: u16,
    #[serde(default)]
    pub wind_dir: String,
    #[serde(default)]
    pub gust_kph: f64,
    #[serde(default)]
    pub pressure_mb: f64,
    #[serde(default)]
    pub precip_mm: f64,
    #[serde(default)]
    pub humidity: f64,
    #[serde(default)]
    pub cloud: f64,
    #[serde(default)]
    pub vis_km: f64,
    #[serde(default)]
    pub uv: f64,
    #[serde(default)]
    pub air_quality: Option<AirQuality>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AirQuality {
    pub co: Option<f64>,
    pub no2: Option<f64>,
    pub o3: Option<f64>,
    pub so2: Option<f64>,
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
    #[serde(rename = "us-epa-index")]
    pub us_epa_index: Option<u8>,
    #[serde(rename = "gb-defra-index")]
    pub gb_defra_index: Option<u8>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Alerts {
    #[serde(default)]
    pub alert: Vec<Alert>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Alert {
    pub headline: Option<String>,
    #[serde(rename = "msgtype")]
    pub msg_type: Option<String>,
    pub severity: Option<String>,
    pub urgency: Option<String>,
    pub areas: Option<String>,
    pub category: Option<String>,
    pub certainty: Option<String>,
    pub event: Option<String>,
    pub note: Option<String>,
    pub effective: Option<String>,
    pub expires: Option<String>,
    pub desc: Option<String>,
    pub instruction: Option<String>,
}
