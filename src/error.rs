//! Error types and HTTP mapping for the weather service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

const GENERIC_FETCH_FAILURE: &str = "Failed to fetch weather data";
const GENERIC_INTERNAL_FAILURE: &str = "An unexpected error occurred while fetching weather data";

/// Main error type for the weather service
#[derive(Error, Debug)]
pub enum WeatherError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors (bad location, bad query parameters)
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// The provider could not resolve the location query
    #[error("Location not found: {message}")]
    LocationNotFound { message: String },

    /// Transport failure or non-2xx answer from the provider
    #[error("Weather provider unavailable: {message}")]
    Unavailable { message: String },

    /// Provider answered 2xx with a payload we cannot use.
    /// `message` is logged; `detail` is what callers see.
    #[error("Invalid provider response: {message}")]
    InvalidResponse {
        message: String,
        detail: &'static str,
    },

    /// Cache operation errors
    #[error("Cache error: {message}")]
    Cache { message: String },
}

impl WeatherError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new location-not-found error
    pub fn location_not_found<S: Into<String>>(message: S) -> Self {
        Self::LocationNotFound {
            message: message.into(),
        }
    }

    /// Create a new upstream-unavailable error
    pub fn unavailable<S: Into<String>>(message: S) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Create a new invalid-response error
    pub fn invalid_response<S: Into<String>>(message: S) -> Self {
        Self::invalid_response_with_detail(message, GENERIC_INTERNAL_FAILURE)
    }

    /// Invalid-response error with a caller-facing detail of its own
    pub fn invalid_response_with_detail<S: Into<String>>(message: S, detail: &'static str) -> Self {
        Self::InvalidResponse {
            message: message.into(),
            detail,
        }
    }

    /// Create a new cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// HTTP status this error is reported with
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            WeatherError::Validation { .. } | WeatherError::LocationNotFound { .. } => {
                StatusCode::BAD_REQUEST
            }
            WeatherError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            WeatherError::Config { .. }
            | WeatherError::InvalidResponse { .. }
            | WeatherError::Cache { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Human-readable detail returned to API callers. Never empty.
    #[must_use]
    pub fn user_message(&self) -> String {
        let message = match self {
            WeatherError::Validation { message }
            | WeatherError::LocationNotFound { message }
            | WeatherError::Unavailable { message } => message.trim(),
            WeatherError::InvalidResponse { detail, .. } => *detail,
            _ => GENERIC_INTERNAL_FAILURE,
        };

        if !message.is_empty() {
            return message.to_string();
        }

        match self {
            WeatherError::Validation { .. } => "Invalid request parameters".to_string(),
            WeatherError::LocationNotFound { .. } => "No matching location found.".to_string(),
            _ => GENERIC_FETCH_FAILURE.to_string(),
        }
    }
}

impl IntoResponse for WeatherError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Weather request failed");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "Weather request rejected");
        }

        (status, Json(json!({ "detail": self.user_message() }))).into_response()
    }
}
