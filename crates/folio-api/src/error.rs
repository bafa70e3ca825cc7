//! HTTP error mapping for the weather API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use folio_weather::WeatherError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message returned for any upstream failure. Details stay in the logs.
pub const UPSTREAM_FAILURE_MESSAGE: &str = "Failed to fetch weather data";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed request fields.
    #[error("{0}")]
    BadRequest(String),

    /// Geocoding found no match.
    #[error("{0}")]
    NotFound(String),

    /// Any other outbound failure, including unexpected upstream payloads.
    #[error("Upstream failure: {0}")]
    Upstream(String),
}

/// Error body: `{ "message": ... }`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<WeatherError> for ApiError {
    fn from(err: WeatherError) -> Self {
        match err {
            WeatherError::NotFound(_) => Self::NotFound("City not found".to_string()),
            other => Self::Upstream(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) => msg,
            ApiError::Upstream(detail) => {
                tracing::error!("Weather API error: {}", detail);
                UPSTREAM_FAILURE_MESSAGE.to_string()
            }
        };

        (status, Json(ErrorResponse { message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::bad_request("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Upstream("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_weather_not_found_maps_to_404() {
        let err: ApiError = WeatherError::NotFound("Atlantis".into()).into();
        assert!(matches!(err, ApiError::NotFound(ref m) if m == "City not found"));
    }

    #[test]
    fn test_other_weather_errors_map_to_upstream() {
        let err: ApiError = WeatherError::Upstream {
            status: 503,
            message: "maintenance".into(),
        }
        .into();
        assert!(matches!(err, ApiError::Upstream(ref d) if d.contains("503")));

        let err: ApiError = WeatherError::Parse("bad".into()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_upstream_response_hides_detail() {
        let response = ApiError::Upstream("secret upstream detail".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
