//! Weather lookup handlers. Each one validates its input, delegates to
//! [`WeatherService`](folio_weather::WeatherService) and wraps the result.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use folio_weather::{BatchItem, CitySuggestion, CurrentWeatherRequest, Forecast, WeatherSnapshot};

use crate::error::ApiError;
use crate::models::{
    BatchBody, BatchRequest, CurrentWeatherQuery, ForecastQuery, ForecastRequest, SearchQuery,
};
use crate::router::AppState;

/// `GET /api/weather/current?city=` or `?lat=&lon=`
pub async fn current_weather_handler(
    State(state): State<AppState>,
    Query(query): Query<CurrentWeatherQuery>,
) -> Result<Json<WeatherSnapshot>, ApiError> {
    let request = CurrentWeatherRequest::try_from(query)?;
    tracing::debug!(?request, "Current weather request");

    let snapshot = state.weather.current_weather(request).await?;
    Ok(Json(snapshot))
}

/// `GET /api/weather/forecast?city=`
pub async fn forecast_handler(
    State(state): State<AppState>,
    Query(query): Query<ForecastQuery>,
) -> Result<Json<Forecast>, ApiError> {
    let request = ForecastRequest::try_from(query)?;
    let forecast = state.weather.forecast(&request.city).await?;
    Ok(Json(forecast))
}

/// `GET /api/weather/search?q=`
pub async fn search_handler(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<CitySuggestion>>, ApiError> {
    let q = query.q.unwrap_or_default();
    let results = state.weather.search(&q).await?;
    Ok(Json(results))
}

/// `POST /api/weather/multiple` with `{ "cities": [...] }`
///
/// Always 200 once the body is valid; per-city failures are reported on
/// the individual items.
pub async fn batch_weather_handler(
    State(state): State<AppState>,
    body: Result<Json<BatchBody>, JsonRejection>,
) -> Result<Json<Vec<BatchItem>>, ApiError> {
    let Json(body) = body.map_err(|e| {
        tracing::debug!("Rejected batch body: {}", e);
        ApiError::bad_request("Cities array is required")
    })?;
    let request = BatchRequest::try_from(body)?;

    tracing::info!(count = request.cities.len(), "Batch weather request");
    let items = state.weather.batch(&request.cities).await;
    Ok(Json(items))
}
