//! Weather service
//!
//! Stateless façade the HTTP handlers call: validates the request, asks the
//! provider for data and shapes the result.

use crate::models::{
    CurrentConditions, DetailedForecast, ForecastQuery, LocationQuery, RainfallSummary,
    SimpleForecast,
};
use crate::weather::{WeatherProvider, normalize};
use crate::Result;
use std::sync::Arc;
use tracing::{debug, info};

/// Weather forecast service
#[derive(Clone)]
pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
}

impl WeatherService {
    #[must_use]
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    /// Daily summaries only
    pub async fn simple_forecast(&self, query: &ForecastQuery) -> Result<SimpleForecast> {
        info!(location = %query.location, days = query.days, "Simple forecast requested");
        let response = self.provider.forecast(query).await?;
        let forecast = normalize::simple_forecast(&response, query);
        debug!("Normalized {} forecast days", forecast.forecast_days.len());
        Ok(forecast)
    }

    /// Daily summaries plus hourly records
    pub async fn detailed_forecast(&self, query: &ForecastQuery) -> Result<DetailedForecast> {
        info!(location = %query.location, days = query.days, "Detailed forecast requested");
        let response = self.provider.forecast(query).await?;
        normalize::detailed_forecast(&response, query)
    }

    pub async fn current_conditions(
        &self,
        location: &LocationQuery,
        include_aqi: bool,
    ) -> Result<CurrentConditions> {
        info!(%location, "Current weather requested");
        let response = self.provider.current(location, include_aqi).await?;
        Ok(normalize::current_conditions(&response, include_aqi))
    }

    /// Precipitation totals over the forecast range
    pub async fn rainfall_summary(&self, location: &LocationQuery, days: u8) -> Result<RainfallSummary> {
        let query = ForecastQuery {
            location: location.clone(),
            days,
            include_alerts: false,
            include_aqi: false,
        };
        let forecast = self.simple_forecast(&query).await?;
        Ok(RainfallSummary::from_forecast(&forecast))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::weather::weatherapi;
    use crate::WeatherError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Provider serving a canned Arusha forecast, or a fixed error
    pub(crate) struct StubProvider {
        pub fail_with: Option<fn() -> WeatherError>,
        pub seen: Mutex<Vec<ForecastQuery>>,
    }

    impl StubProvider {
        pub(crate) fn ok() -> Self {
            Self {
                fail_with: None,
                seen: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn failing(error: fn() -> WeatherError) -> Self {
            Self {
                fail_with: Some(error),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    pub(crate) fn forecast_payload(days: u8) -> weatherapi::ForecastResponse {
        let forecastday: Vec<_> = (0..days)
            .rev()
            .map(|offset| {
                let date = chrono::NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
                    + chrono::Duration::days(i64::from(offset));
                let hours: Vec<_> = (0..24)
                    .map(|h| json!({"time": format!("{date} {h:02}:00"), "temp_c": 20.0}))
                    .collect();
                json!({
                    "date": date.to_string(),
                    "day": {
                        "maxtemp_c": 27.0,
                        "mintemp_c": 15.0,
                        "avgtemp_c": 21.0,
                        "totalprecip_mm": f64::from(offset) * 0.5,
                        "avghumidity": 70,
                        "daily_chance_of_rain": 40 + offset,
                        "condition": {"text": "Partly cloudy", "icon": "//cdn/116.png", "code": 1003}
                    },
                    "astro": {"sunrise": "06:32 AM", "sunset": "06:41 PM"},
                    "hour": hours
                })
            })
            .collect();

        serde_json::from_value(json!({
            "location": {"name": "Arusha", "country": "Tanzania", "tz_id": "Africa/Dar_es_Salaam", "localtime": "2025-03-01 10:00"},
            "forecast": {"forecastday": forecastday},
            "alerts": {"alert": []}
        }))
        .unwrap()
    }

    #[async_trait]
    impl WeatherProvider for StubProvider {
        async fn forecast(&self, query: &ForecastQuery) -> Result<weatherapi::ForecastResponse> {
            self.seen.lock().unwrap().push(query.clone());
            if let Some(error) = self.fail_with {
                return Err(error());
            }
            Ok(forecast_payload(query.days))
        }

        async fn current(
            &self,
            _location: &LocationQuery,
            _include_aqi: bool,
        ) -> Result<weatherapi::CurrentResponse> {
            if let Some(error) = self.fail_with {
                return Err(error());
            }
            Ok(serde_json::from_value(json!({
                "location": {"name": "Mwanza", "country": "Tanzania", "tz_id": "Africa/Dar_es_Salaam", "localtime": "2025-03-01 10:00"},
                "current": {"temp_c": 24.0, "humidity": 65, "condition": {"text": "Sunny", "icon": "//cdn/113.png", "code": 1000}}
            }))
            .unwrap())
        }
    }

    #[tokio::test]
    async fn test_simple_forecast_is_ascending() {
        let service = WeatherService::new(Arc::new(StubProvider::ok()));
        let query = ForecastQuery::new("Arusha", Some(7), true, true).unwrap();

        let forecast = service.simple_forecast(&query).await.unwrap();
        assert_eq!(forecast.forecast_days.len(), 7);
        assert!(forecast.forecast_days.windows(2).all(|w| w[0].date < w[1].date));
        for day in &forecast.forecast_days {
            assert!(day.chance_of_rain <= 100);
            assert!(day.avg_humidity <= 100);
        }
    }

    #[tokio::test]
    async fn test_detailed_forecast_hours() {
        let service = WeatherService::new(Arc::new(StubProvider::ok()));
        let query = ForecastQuery::new("Arusha", Some(3), false, false).unwrap();

        let forecast = service.detailed_forecast(&query).await.unwrap();
        assert_eq!(forecast.forecast_days.len(), 3);
        assert!(forecast.forecast_days.iter().all(|d| d.hourly.len() == 24));
    }

    #[tokio::test]
    async fn test_rainfall_summary_skips_optional_blocks() {
        let provider = Arc::new(StubProvider::ok());
        let service = WeatherService::new(provider.clone());
        let location = LocationQuery::parse("Arusha").unwrap();

        let summary = service.rainfall_summary(&location, 4).await.unwrap();
        assert_eq!(summary.days, 4);
        // 0.0 + 0.5 + 1.0 + 1.5
        assert_eq!(summary.total_precip_mm, 3.0);
        assert_eq!(summary.rainy_days, 2);

        let seen = provider.seen.lock().unwrap();
        assert!(!seen[0].include_alerts);
        assert!(!seen[0].include_aqi);
    }

    #[tokio::test]
    async fn test_provider_errors_propagate() {
        let service = WeatherService::new(Arc::new(StubProvider::failing(|| {
            WeatherError::location_not_found("No matching location found.")
        })));
        let query = ForecastQuery::new("InvalidCity12345XYZ", Some(7), true, true).unwrap();

        let err = service.simple_forecast(&query).await.unwrap_err();
        assert!(matches!(err, WeatherError::LocationNotFound { .. }));
    }
}
