use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Semantic condition tag derived from a WMO weather code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCondition {
    #[default]
    Clear,
    Clouds,
    Mist,
    Rain,
    Snow,
    Thunderstorm,
}

/// Condition tag plus human-readable description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionInfo {
    pub condition: WeatherCondition,
    pub description: &'static str,
}

/// Latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// True when both components are finite and inside the WGS84 range.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Resolved place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// Current conditions for one place, shaped for the front end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    pub city: String,
    pub country: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub wind_speed: f64,
    pub wind_deg: f64,
    /// Metres
    pub visibility: f64,
    pub condition: WeatherCondition,
    pub description: String,
    /// Unix seconds, UTC
    pub sunrise: i64,
    /// Unix seconds, UTC
    pub sunset: i64,
    pub coord: Coordinates,
}

/// Daily forecast entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub high: f64,
    pub low: f64,
    pub condition: WeatherCondition,
    pub description: String,
}

/// Multi-day forecast for a named place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub city: String,
    pub country: String,
    pub list: Vec<ForecastDay>,
}

/// Place suggestion returned by city search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitySuggestion {
    pub name: String,
    pub country: String,
    pub state: String,
    pub lat: f64,
    pub lon: f64,
    pub display_name: String,
}

/// One entry of a batch lookup; exactly one of `data` / `error` is set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItem {
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<WeatherSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchItem {
    pub fn success(city: String, data: WeatherSnapshot) -> Self {
        Self {
            city,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(city: String, error: impl Into<String>) -> Self {
        Self {
            city,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Validated current-weather query. A place name wins over coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum CurrentWeatherRequest {
    City(String),
    Coordinates(Coordinates),
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Location not found: {0}")]
    NotFound(String),
    #[error("Upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Parse error: {0}")]
    Parse(String),
}

impl WeatherError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
