//! HTTP handlers for the weather endpoints
//!
//! All routes are read-only. Query parameters are validated here; a bad
//! parameter is answered with 400 and a `{"detail": ...}` body.

use crate::WeatherError;
use crate::models::{
    CurrentConditions, DetailedForecast, ForecastQuery, LocationQuery, RainfallSummary,
    SimpleForecast, forecast::clamp_days,
};
use crate::service::WeatherService;
use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    routing::get,
};
use serde::{Deserialize, Deserializer, de};

/// Query parameters for the forecast endpoints
#[derive(Debug, Deserialize)]
pub struct ForecastParams {
    pub location: Option<String>,
    #[serde(default, deserialize_with = "deserialize_days")]
    pub days: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub include_alerts: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub include_aqi: Option<bool>,
}

/// Query parameters for the current conditions endpoint
#[derive(Debug, Deserialize)]
pub struct CurrentParams {
    pub location: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub include_aqi: Option<bool>,
}

/// Query parameters for the rainfall summary endpoint
#[derive(Debug, Deserialize)]
pub struct RainfallParams {
    pub location: Option<String>,
    #[serde(default, deserialize_with = "deserialize_days")]
    pub days: Option<i64>,
}

impl ForecastParams {
    fn into_query(self) -> Result<ForecastQuery, WeatherError> {
        ForecastQuery::new(
            &required_location(self.location)?,
            self.days,
            self.include_alerts.unwrap_or(true),
            self.include_aqi.unwrap_or(true),
        )
    }
}

pub fn router(service: WeatherService) -> Router {
    Router::new()
        .route("/weather/forecast", get(get_forecast))
        .route("/weather/forecast/detailed", get(get_detailed_forecast))
        .route("/weather/current", get(get_current_weather))
        .route("/weather/rainfall", get(get_rainfall_summary))
        .with_state(service)
}

async fn get_forecast(
    State(service): State<WeatherService>,
    params: Result<Query<ForecastParams>, QueryRejection>,
) -> Result<Json<SimpleForecast>, WeatherError> {
    let query = query_params(params)?.into_query()?;
    Ok(Json(service.simple_forecast(&query).await?))
}

async fn get_detailed_forecast(
    State(service): State<WeatherService>,
    params: Result<Query<ForecastParams>, QueryRejection>,
) -> Result<Json<DetailedForecast>, WeatherError> {
    let query = query_params(params)?.into_query()?;
    Ok(Json(service.detailed_forecast(&query).await?))
}

async fn get_current_weather(
    State(service): State<WeatherService>,
    params: Result<Query<CurrentParams>, QueryRejection>,
) -> Result<Json<CurrentConditions>, WeatherError> {
    let params = query_params(params)?;
    let location = LocationQuery::parse(&required_location(params.location)?)?;
    let current = service
        .current_conditions(&location, params.include_aqi.unwrap_or(true))
        .await?;
    Ok(Json(current))
}

async fn get_rainfall_summary(
    State(service): State<WeatherService>,
    params: Result<Query<RainfallParams>, QueryRejection>,
) -> Result<Json<RainfallSummary>, WeatherError> {
    let params = query_params(params)?;
    let location = LocationQuery::parse(&required_location(params.location)?)?;
    let days = clamp_days(params.days.unwrap_or(14));
    Ok(Json(service.rainfall_summary(&location, days).await?))
}

fn query_params<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, WeatherError> {
    params
        .map(|Query(params)| params)
        .map_err(|rejection| WeatherError::validation(rejection.body_text()))
}

fn required_location(location: Option<String>) -> Result<String, WeatherError> {
    location.ok_or_else(|| WeatherError::validation("location query parameter is required"))
}

/// Accepts the boolean spellings browsers and form posts tend to send
fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Integer day count; values past the i64 range saturate so they clamp
/// like any other out-of-range count
fn parse_days(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(days) = raw.parse::<i64>() {
        return Some(days);
    }

    let (negative, digits) = match raw.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some(if negative { i64::MIN } else { i64::MAX })
}

fn deserialize_days<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_days(&raw)
        .map(Some)
        .ok_or_else(|| de::Error::custom(format!("days: invalid integer '{raw}'")))
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_flag(&raw)
        .map(Some)
        .ok_or_else(|| de::Error::custom(format!("invalid boolean value '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::tests::StubProvider;
    use axum::{body::Body, http::Request, http::StatusCode};
    use http_body_util::BodyExt;
    use rstest::rstest;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(provider: StubProvider) -> Router {
        router(WeatherService::new(Arc::new(provider)))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[rstest]
    #[case("true", Some(true))]
    #[case("YES", Some(true))]
    #[case("1", Some(true))]
    #[case("off", Some(false))]
    #[case("False", Some(false))]
    #[case("maybe", None)]
    fn test_parse_flag(#[case] raw: &str, #[case] expected: Option<bool>) {
        assert_eq!(parse_flag(raw), expected);
    }

    #[tokio::test]
    async fn test_forecast_returns_requested_days() {
        let (status, body) = get_json(
            app(StubProvider::ok()),
            "/weather/forecast?location=Arusha&days=7",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["location_name"], "Arusha");
        let days = body["forecast_days"].as_array().unwrap();
        assert_eq!(days.len(), 7);
        for day in days {
            let rain = day["chance_of_rain"].as_u64().unwrap();
            let humidity = day["avg_humidity"].as_u64().unwrap();
            assert!(rain <= 100);
            assert!(humidity <= 100);
        }
    }

    #[tokio::test]
    async fn test_forecast_clamps_days() {
        let (_, clamped) = get_json(
            app(StubProvider::ok()),
            "/weather/forecast?location=Arusha&days=20",
        )
        .await;
        let (_, max) = get_json(
            app(StubProvider::ok()),
            "/weather/forecast?location=Arusha&days=14",
        )
        .await;

        assert_eq!(clamped, max);
        assert_eq!(clamped["forecast_days"].as_array().unwrap().len(), 14);
    }

    #[rstest]
    #[case("7", Some(7))]
    #[case(" -3 ", Some(-3))]
    #[case("+5", Some(5))]
    #[case("99999999999999999999", Some(i64::MAX))]
    #[case("-99999999999999999999", Some(i64::MIN))]
    #[case("abc", None)]
    #[case("-", None)]
    #[case("1.5", None)]
    fn test_parse_days(#[case] raw: &str, #[case] expected: Option<i64>) {
        assert_eq!(parse_days(raw), expected);
    }

    #[rstest]
    #[case("99999999999999999999", 14)]
    #[case("-99999999999999999999", 1)]
    #[tokio::test]
    async fn test_forecast_clamps_overflowing_days(#[case] days: &str, #[case] expected: usize) {
        let (status, body) = get_json(
            app(StubProvider::ok()),
            &format!("/weather/forecast?location=Arusha&days={days}"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["forecast_days"].as_array().unwrap().len(), expected);
    }

    #[tokio::test]
    async fn test_rainfall_clamps_overflowing_days() {
        let (status, body) = get_json(
            app(StubProvider::ok()),
            "/weather/rainfall?location=Arusha&days=99999999999999999999",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["days"], 14);
    }

    #[tokio::test]
    async fn test_forecast_defaults_to_fourteen_days() {
        let (status, body) =
            get_json(app(StubProvider::ok()), "/weather/forecast?location=Arusha").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["forecast_days"].as_array().unwrap().len(), 14);
    }

    #[tokio::test]
    async fn test_forecast_without_optional_blocks() {
        let (status, body) = get_json(
            app(StubProvider::ok()),
            "/weather/forecast?location=Arusha&days=3&include_alerts=false&include_aqi=false",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.get("alerts").is_none());
        for day in body["forecast_days"].as_array().unwrap() {
            assert!(day.get("air_quality").is_none());
        }
    }

    #[tokio::test]
    async fn test_detailed_forecast_has_hourly_records() {
        let (status, body) = get_json(
            app(StubProvider::ok()),
            "/weather/forecast/detailed?location=Arusha,TZ&days=2",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let days = body["forecast_days"].as_array().unwrap();
        assert_eq!(days.len(), 2);
        assert!(days.iter().all(|d| d["hourly"].as_array().unwrap().len() == 24));
    }

    #[tokio::test]
    async fn test_current_weather() {
        let (status, body) =
            get_json(app(StubProvider::ok()), "/weather/current?location=Mwanza,TZ").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["location_name"], "Mwanza");
        assert_eq!(body["condition"], "Sunny");
    }

    #[tokio::test]
    async fn test_rainfall_summary() {
        let (status, body) = get_json(
            app(StubProvider::ok()),
            "/weather/rainfall?location=Arusha&days=4",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["days"], 4);
        assert_eq!(body["start_date"], "2025-03-01");
        assert_eq!(body["end_date"], "2025-03-04");
    }

    #[rstest]
    #[case("/weather/forecast")]
    #[case("/weather/forecast?location=")]
    #[case("/weather/forecast?location=%20%20")]
    #[case("/weather/forecast?location=Arusha&days=abc")]
    #[case("/weather/forecast?location=Arusha&include_aqi=maybe")]
    #[case("/weather/forecast/detailed")]
    #[case("/weather/current")]
    #[case("/weather/rainfall?days=3")]
    #[tokio::test]
    async fn test_invalid_parameters(#[case] uri: &str) {
        let (status, body) = get_json(app(StubProvider::ok()), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body["detail"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unresolvable_location() {
        let provider = StubProvider::failing(|| {
            WeatherError::location_not_found("No matching location found.")
        });
        let (status, body) = get_json(
            app(provider),
            "/weather/forecast?location=InvalidCity12345XYZ&days=7",
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "No matching location found.");
    }

    #[tokio::test]
    async fn test_provider_unavailable() {
        let provider = StubProvider::failing(|| WeatherError::unavailable("Failed to fetch weather data"));
        let (status, body) =
            get_json(app(provider), "/weather/current?location=Dodoma").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["detail"], "Failed to fetch weather data");
    }

    #[tokio::test]
    async fn test_invalid_provider_payload() {
        let provider = StubProvider::failing(|| WeatherError::invalid_response("missing field"));
        let (status, body) = get_json(
            app(provider),
            "/weather/forecast/detailed?location=Dodoma",
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body["detail"],
            "An unexpected error occurred while fetching weather data"
        );
    }
}
