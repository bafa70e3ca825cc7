//! Raw request shapes and their validation into typed requests.
//!
//! Query strings are deserialized as optional strings so malformed values
//! reach validation and come back as `{message}` 400s instead of extractor
//! rejections.

use folio_weather::{Coordinates, CurrentWeatherRequest};
use serde::Deserialize;

use crate::error::ApiError;

/// `GET /api/weather/current` query
#[derive(Debug, Default, Deserialize)]
pub struct CurrentWeatherQuery {
    pub city: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
}

impl TryFrom<CurrentWeatherQuery> for CurrentWeatherRequest {
    type Error = ApiError;

    fn try_from(query: CurrentWeatherQuery) -> Result<Self, Self::Error> {
        if let Some(city) = non_blank(query.city) {
            return Ok(Self::City(city));
        }

        match (non_blank(query.lat), non_blank(query.lon)) {
            (Some(lat), Some(lon)) => {
                let coords = parse_coordinates(&lat, &lon)?;
                Ok(Self::Coordinates(coords))
            }
            _ => Err(ApiError::bad_request(
                "City name or coordinates (lat, lon) are required",
            )),
        }
    }
}

/// `GET /api/weather/forecast` query
#[derive(Debug, Default, Deserialize)]
pub struct ForecastQuery {
    pub city: Option<String>,
}

/// Validated forecast request: a trimmed, non-empty city name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastRequest {
    pub city: String,
}

impl TryFrom<ForecastQuery> for ForecastRequest {
    type Error = ApiError;

    fn try_from(query: ForecastQuery) -> Result<Self, Self::Error> {
        non_blank(query.city)
            .map(|city| Self { city })
            .ok_or_else(|| ApiError::bad_request("City name is required"))
    }
}

/// `GET /api/weather/search` query
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// `POST /api/weather/multiple` body
#[derive(Debug, Default, Deserialize)]
pub struct BatchBody {
    pub cities: Option<Vec<String>>,
}

/// Validated batch request: city names in request order, never empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    pub cities: Vec<String>,
}

impl TryFrom<BatchBody> for BatchRequest {
    type Error = ApiError;

    fn try_from(body: BatchBody) -> Result<Self, Self::Error> {
        match body.cities {
            Some(cities) if !cities.is_empty() => Ok(Self { cities }),
            _ => Err(ApiError::bad_request("Cities array is required")),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_coordinates(lat: &str, lon: &str) -> Result<Coordinates, ApiError> {
    let invalid = || ApiError::bad_request("Invalid coordinates");
    let lat: f64 = lat.parse().map_err(|_| invalid())?;
    let lon: f64 = lon.parse().map_err(|_| invalid())?;

    let coords = Coordinates::new(lat, lon);
    if coords.is_valid() {
        Ok(coords)
    } else {
        Err(invalid())
    }
}
