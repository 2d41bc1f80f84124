use std::time::Duration;

use anyhow::Context;
use axum::{BoxError, Json, Router, error_handling::HandleErrorLayer, routing::get};
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower::timeout::error::Elapsed;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::{VERSION, WeatherError, api, config::ServerConfig, service::WeatherService};

/// Full application router: `/health` plus the API under `/api`
pub fn app(service: WeatherService, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .nest("/api", api::router(service))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(request_timeout),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn run(config: &ServerConfig, service: WeatherService) -> anyhow::Result<()> {
    let app = app(
        service,
        Duration::from_secs(config.request_timeout_seconds.into()),
    );

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server failed")?;

    tracing::info!("Web server stopped");
    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": VERSION }))
}

/// Timed-out requests get the same `{"detail": ...}` body as every other failure
async fn handle_middleware_error(err: BoxError) -> WeatherError {
    if err.is::<Elapsed>() {
        WeatherError::unavailable("Request timed out while fetching weather data")
    } else {
        WeatherError::unavailable(format!("Request failed: {err}"))
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ForecastQuery, LocationQuery};
    use crate::weather::{WeatherProvider, weatherapi};
    use async_trait::async_trait;
    use axum::{body::Body, http::Request, http::StatusCode};
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;

    struct SlowProvider;

    #[async_trait]
    impl WeatherProvider for SlowProvider {
        async fn forecast(&self, _query: &ForecastQuery) -> crate::Result<weatherapi::ForecastResponse> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Err(WeatherError::unavailable("too slow"))
        }

        async fn current(
            &self,
            _location: &LocationQuery,
            _include_aqi: bool,
        ) -> crate::Result<weatherapi::CurrentResponse> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Err(WeatherError::unavailable("too slow"))
        }
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

    #[tokio::test]
    async fn test_request_timeout_has_detail_body() {
        let app = app(
            WeatherService::new(Arc::new(SlowProvider)),
            Duration::from_millis(50),
        );

        let (status, body) = get_json(app, "/api/weather/current?location=Arusha").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["detail"], "Request timed out while fetching weather data");
    }

    #[tokio::test]
    async fn test_health() {
        let app = app(
            WeatherService::new(Arc::new(SlowProvider)),
            Duration::from_secs(1),
        );

        let (status, body) = get_json(app, "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["version"], VERSION);
    }
}
