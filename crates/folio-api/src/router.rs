//! Router configuration for the weather API.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use folio_weather::WeatherService;

use crate::error::ErrorResponse;
use crate::handlers::{
    batch_weather_handler, current_weather_handler, forecast_handler, health_handler,
    search_handler,
};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub weather: Arc<WeatherService>,
}

/// Create the API router.
///
/// Provides:
/// - GET  /api/weather/current   - current conditions by city or lat/lon
/// - GET  /api/weather/forecast  - five-day forecast by city
/// - GET  /api/weather/search    - city suggestions
/// - POST /api/weather/multiple  - current conditions for several cities
/// - GET  /api/health            - liveness
pub fn api_router(weather: Arc<WeatherService>) -> Router {
    let state = AppState { weather };

    Router::new()
        .route("/api/weather/current", get(current_weather_handler))
        .route("/api/weather/forecast", get(forecast_handler))
        .route("/api/weather/search", get(search_handler))
        .route("/api/weather/multiple", post(batch_weather_handler))
        .route("/api/health", get(health_handler))
        .fallback(not_found)
        .with_state(state)
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            message: "Route not found".to_string(),
        }),
    )
}
