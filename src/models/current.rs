//! Current conditions model

use super::AirQuality;
use serde::{Deserialize, Serialize};

/// Real-time snapshot for a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub location_name: String,
    pub country: String,
    pub timezone: String,
    pub local_time: String,
    /// Provider observation time, local
    pub last_updated: String,
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
    pub vis_km: f64,
    pub uv: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_quality: Option<AirQuality>,
}
