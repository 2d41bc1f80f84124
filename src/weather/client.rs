//! WeatherAPI.com HTTP client
//!
//! Issues `forecast.json` / `current.json` calls, classifies provider
//! failures, and keeps successful bodies in the response cache.

use super::rate_limit::RateLimiter;
use super::weatherapi::{self, error_codes};
use super::WeatherProvider;
use crate::cache::PersistentCache;
use crate::config::EcofyConfig;
use crate::models::{ForecastQuery, LocationQuery};
use crate::{Result, VERSION, WeatherError};
use async_trait::async_trait;
use rand::RngExt;
use reqwest::{StatusCode, Url};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

/// Provider endpoints, each with the details reported when it fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Forecast,
    Current,
}

impl Endpoint {
    fn path(self) -> &'static str {
        match self {
            Endpoint::Forecast => "forecast.json",
            Endpoint::Current => "current.json",
        }
    }

    fn unavailable_detail(self) -> &'static str {
        match self {
            Endpoint::Forecast => "Failed to fetch weather data",
            Endpoint::Current => "Failed to fetch current weather",
        }
    }

    fn unexpected_detail(self) -> &'static str {
        match self {
            Endpoint::Forecast => "An unexpected error occurred while fetching weather data",
            Endpoint::Current => "An unexpected error occurred while fetching current weather",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Weather API client for WeatherAPI.com
pub struct WeatherApiClient {
    /// HTTP client, shared by every request
    client: ClientWithMiddleware,
    base_url: String,
    api_key: String,
    rate_limiter: Mutex<RateLimiter>,
    cache: Option<PersistentCache>,
    cache_ttl: Duration,
}

impl WeatherApiClient {
    /// Create a new weather API client from validated configuration
    pub fn new(config: &EcofyConfig) -> Result<Self> {
        let api_key = config
            .weather
            .api_key
            .clone()
            .ok_or_else(|| WeatherError::config("Weather API key is required but not configured"))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.weather.timeout_seconds.into()))
            .user_agent(format!("ecofy-weather/{VERSION}"))
            .build()
            .map_err(|e| WeatherError::config(format!("Failed to create HTTP client: {e}")))?;

        let mut builder = ClientBuilder::new(http);
        if config.weather.max_retries > 0 {
            let policy = ExponentialBackoff::builder().build_with_max_retries(config.weather.max_retries);
            builder = builder.with(RetryTransientMiddleware::new_with_policy(policy));
        }

        let cache = if config.cache.enabled {
            match PersistentCache::open(&config.cache.location) {
                Ok(cache) => Some(cache),
                Err(e) => {
                    warn!(
                        "Failed to open response cache at {}, continuing without it: {}",
                        config.cache.location, e
                    );
                    None
                }
            }
        } else {
            None
        };

        Ok(Self {
            client: builder.build(),
            base_url: config.weather.base_url.trim_end_matches('/').to_string(),
            api_key,
            rate_limiter: Mutex::new(RateLimiter::new(config.weather.max_requests_per_minute)),
            cache,
            cache_ttl: Duration::from_secs(u64::from(config.cache.ttl_minutes) * 60),
        })
    }

    /// Fetch an endpoint and decode its JSON body
    async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        params: &[(&str, String)],
    ) -> Result<T> {
        let cache_key = cache_key(endpoint.path(), params);
        let body = match self.cached_body(&cache_key).await {
            Some(body) => body,
            None => {
                let body = self.request(endpoint, params).await?;
                self.store_body(&cache_key, &body).await;
                body
            }
        };

        serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse {} response: {}", endpoint, e);
            WeatherError::invalid_response_with_detail(
                format!("undecodable {endpoint} payload: {e}"),
                endpoint.unexpected_detail(),
            )
        })
    }

    /// Make a single provider request and return the raw body of a 2xx answer
    #[instrument(skip(self, params))]
    async fn request(&self, endpoint: Endpoint, params: &[(&str, String)]) -> Result<String> {
        {
            let mut limiter = self.rate_limiter.lock().await;
            if !limiter.allow_request() {
                let wait_time = limiter.time_until_next_request();
                warn!("Local rate limit reached, next slot in {:.1}s", wait_time.as_secs_f64());
                return Err(WeatherError::unavailable(format!(
                    "Weather provider rate limit reached. Please retry in {} seconds.",
                    wait_time.as_secs().max(1)
                )));
            }
        }

        let mut query: Vec<(&str, &str)> = vec![("key", self.api_key.as_str())];
        query.extend(params.iter().map(|(k, v)| (*k, v.as_str())));
        let url = Url::parse_with_params(&format!("{}/{}", self.base_url, endpoint.path()), &query)
            .map_err(|e| WeatherError::config(format!("Invalid weather API base URL: {e}")))?;

        let start_time = Instant::now();
        let response = self.client.get(url).send().await.map_err(|e| {
            let reason = match e {
                reqwest_middleware::Error::Reqwest(e) => e.without_url().to_string(),
                other => other.to_string(),
            };
            warn!("Network error calling {}: {}", endpoint, reason);
            WeatherError::unavailable(endpoint.unavailable_detail())
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            warn!("Failed to read {} response body: {}", endpoint, e.without_url());
            WeatherError::unavailable(endpoint.unavailable_detail())
        })?;

        let duration = start_time.elapsed();
        if !status.is_success() {
            return Err(classify_failure(endpoint, status, &body));
        }

        info!(
            "Provider {} answered in {:.3}s",
            endpoint,
            duration.as_secs_f64()
        );
        if duration.as_secs() > 5 {
            warn!("Slow provider response detected: {:.3}s", duration.as_secs_f64());
        }

        Ok(body)
    }

    async fn cached_body(&self, key: &str) -> Option<String> {
        let cache = self.cache.as_ref()?;
        match cache.get::<String>(key).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!("Cache read failed, calling provider: {}", e);
                None
            }
        }
    }

    async fn store_body(&self, key: &str, body: &str) {
        let Some(cache) = &self.cache else {
            return;
        };

        let jitter: f64 = rand::rng().random_range(0.9..1.1);
        let ttl = self.cache_ttl.mul_f64(jitter);
        if let Err(e) = cache.put(key, body.to_string(), ttl).await {
            warn!("Cache write failed: {}", e);
        }
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiClient {
    #[instrument(skip(self), fields(location = %query.location, kind = query.location.kind(), days = query.days))]
    async fn forecast(&self, query: &ForecastQuery) -> Result<weatherapi::ForecastResponse> {
        info!("Fetching {}-day forecast", query.days);

        let response: weatherapi::ForecastResponse = self
            .fetch(
                Endpoint::Forecast,
                &[
                    ("q", query.location.as_provider_query()),
                    ("days", query.days.to_string()),
                    ("alerts", yes_no(query.include_alerts)),
                    ("aqi", yes_no(query.include_aqi)),
                ],
            )
            .await?;

        info!(
            "Successfully retrieved forecast for {} ({} days)",
            response.location.name,
            response.forecast.forecastday.len()
        );
        Ok(response)
    }

    #[instrument(skip(self), fields(location = %location, kind = location.kind()))]
    async fn current(
        &self,
        location: &LocationQuery,
        include_aqi: bool,
    ) -> Result<weatherapi::CurrentResponse> {
        info!("Fetching current weather");

        let response: weatherapi::CurrentResponse = self
            .fetch(
                Endpoint::Current,
                &[
                    ("q", location.as_provider_query()),
                    ("aqi", yes_no(include_aqi)),
                ],
            )
            .await?;

        info!("Successfully retrieved current weather for {}", response.location.name);
        Ok(response)
    }
}

fn yes_no(flag: bool) -> String {
    if flag { "yes" } else { "no" }.to_string()
}

fn cache_key(endpoint: &str, params: &[(&str, String)]) -> String {
    let mut key = endpoint.to_string();
    for (name, value) in params {
        key.push('|');
        key.push_str(name);
        key.push('=');
        key.push_str(&value.trim().to_lowercase());
    }
    key
}

/// Map a non-2xx provider answer onto the service error taxonomy
fn classify_failure(endpoint: Endpoint, status: StatusCode, body: &str) -> WeatherError {
    let provider_error = serde_json::from_str::<weatherapi::ErrorResponse>(body)
        .ok()
        .map(|response| response.error);

    match provider_error {
        Some(err) if err.code == error_codes::NO_MATCHING_LOCATION => {
            debug!("Provider could not resolve location: {}", err.message);
            WeatherError::location_not_found(err.message)
        }
        Some(err)
            if err.code == error_codes::QUERY_MISSING
                || err.code == error_codes::INVALID_REQUEST_URL =>
        {
            WeatherError::validation(err.message)
        }
        Some(err) => {
            error!(
                "Provider error {} (HTTP {}): {}",
                err.code,
                status.as_u16(),
                err.message
            );
            WeatherError::unavailable(err.message)
        }
        None => {
            error!(
                "Provider {} returned HTTP {} without an error envelope",
                endpoint,
                status.as_u16()
            );
            WeatherError::unavailable(endpoint.unavailable_detail())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_no_matching_location() {
        let err = classify_failure(
            Endpoint::Forecast,
            StatusCode::BAD_REQUEST,
            r#"{"error":{"code":1006,"message":"No matching location found."}}"#,
        );
        assert!(matches!(err, WeatherError::LocationNotFound { .. }));
        assert_eq!(err.user_message(), "No matching location found.");
    }

    #[test]
    fn test_classify_missing_query() {
        let err = classify_failure(
            Endpoint::Forecast,
            StatusCode::BAD_REQUEST,
            r#"{"error":{"code":1003,"message":"Parameter q is missing."}}"#,
        );
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_classify_quota_exceeded() {
        let err = classify_failure(
            Endpoint::Current,
            StatusCode::FORBIDDEN,
            r#"{"error":{"code":2007,"message":"API key has exceeded calls per month quota."}}"#,
        );
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(err.user_message().contains("quota"));
    }

    #[test]
    fn test_classify_opaque_failure() {
        let err = classify_failure(
            Endpoint::Forecast,
            StatusCode::BAD_GATEWAY,
            "<html>bad gateway</html>",
        );
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.user_message(), "Failed to fetch weather data");
    }

    #[test]
    fn test_classify_opaque_current_failure() {
        let err = classify_failure(Endpoint::Current, StatusCode::BAD_GATEWAY, "");
        assert_eq!(err.user_message(), "Failed to fetch current weather");
    }

    #[test]
    fn test_cache_key_normalizes_location() {
        let a = cache_key("forecast.json", &[("q", " Arusha ".to_string()), ("days", "7".to_string())]);
        let b = cache_key("forecast.json", &[("q", "arusha".to_string()), ("days", "7".to_string())]);
        assert_eq!(a, b);
        assert_ne!(
            a,
            cache_key("forecast.json", &[("q", "arusha".to_string()), ("days", "3".to_string())])
        );
    }
}
