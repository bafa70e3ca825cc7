//! Open-Meteo forecast client.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::condition::map_weather_code;
use crate::http::read_json;
use crate::types::{Coordinates, ForecastDay, Location, WeatherError, WeatherSnapshot};

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,\
weather_code,surface_pressure,wind_speed_10m,wind_direction_10m";
const DAILY_FORECAST_FIELDS: &str = "weather_code,temperature_2m_max,temperature_2m_min";

/// Open-Meteo local timestamps carry no seconds or offset
const LOCAL_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Current-conditions payload: current block plus the hourly and daily
/// samples needed to complete a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentResponse {
    #[serde(default)]
    pub utc_offset_seconds: i64,
    pub current: CurrentBlock,
    pub hourly: HourlyBlock,
    pub daily: SunBlock,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentBlock {
    /// Local time, `YYYY-MM-DDTHH:MM`
    pub time: String,
    pub temperature_2m: f64,
    pub relative_humidity_2m: f64,
    pub apparent_temperature: f64,
    pub weather_code: i32,
    pub surface_pressure: f64,
    pub wind_speed_10m: f64,
    pub wind_direction_10m: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourlyBlock {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub visibility: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SunBlock {
    #[serde(default)]
    pub sunrise: Vec<String>,
    #[serde(default)]
    pub sunset: Vec<String>,
}

/// Daily forecast payload; arrays are aligned by index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyResponse {
    pub daily: DailyBlock,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyBlock {
    pub time: Vec<NaiveDate>,
    pub weather_code: Vec<i32>,
    pub temperature_2m_max: Vec<f64>,
    pub temperature_2m_min: Vec<f64>,
}

impl CurrentResponse {
    /// Shape the payload into a snapshot for `location`.
    ///
    /// Visibility is taken from the hourly sample at the hour of
    /// `current.time`; a missing sample reads as 0.
    pub fn to_snapshot(&self, location: &Location) -> Result<WeatherSnapshot, WeatherError> {
        let current_time = parse_local(&self.current.time)?;
        let hour = current_time.hour() as usize;
        let visibility = self
            .hourly
            .visibility
            .get(hour)
            .copied()
            .flatten()
            .unwrap_or(0.0);

        let info = map_weather_code(self.current.weather_code);

        Ok(WeatherSnapshot {
            city: location.name.clone(),
            country: location.country.clone(),
            temperature: self.current.temperature_2m,
            feels_like: self.current.apparent_temperature,
            humidity: self.current.relative_humidity_2m,
            pressure: self.current.surface_pressure,
            wind_speed: self.current.wind_speed_10m,
            wind_deg: self.current.wind_direction_10m,
            visibility,
            condition: info.condition,
            description: info.description.to_string(),
            sunrise: self.first_unix(&self.daily.sunrise)?,
            sunset: self.first_unix(&self.daily.sunset)?,
            coord: location.coordinates(),
        })
    }

    fn first_unix(&self, times: &[String]) -> Result<i64, WeatherError> {
        match times.first() {
            Some(t) => Ok(parse_local(t)?.and_utc().timestamp() - self.utc_offset_seconds),
            None => Ok(0),
        }
    }
}

impl DailyResponse {
    /// Zip the per-day arrays into entries, ascending by date. Extra
    /// elements in longer arrays are dropped.
    pub fn to_days(&self) -> Vec<ForecastDay> {
        let daily = &self.daily;
        let mut days: Vec<ForecastDay> = daily
            .time
            .iter()
            .zip(&daily.weather_code)
            .zip(daily.temperature_2m_max.iter().zip(&daily.temperature_2m_min))
            .map(|((date, code), (high, low))| {
                let info = map_weather_code(*code);
                ForecastDay {
                    date: *date,
                    high: *high,
                    low: *low,
                    condition: info.condition,
                    description: info.description.to_string(),
                }
            })
            .collect();
        days.sort_by_key(|d| d.date);
        days
    }
}

fn parse_local(value: &str) -> Result<NaiveDateTime, WeatherError> {
    NaiveDateTime::parse_from_str(value, LOCAL_TIME_FORMAT)
        .map_err(|e| WeatherError::Parse(format!("Bad upstream time '{}': {}", value, e)))
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Client,
    forecast_url: String,
}

impl WeatherProvider {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            forecast_url: format!("{}/forecast", base_url.trim_end_matches('/')),
        }
    }

    /// Current conditions, today's hourly visibility and today's sun times.
    #[instrument(skip(self), level = "debug")]
    pub async fn current(&self, coords: Coordinates) -> Result<CurrentResponse, WeatherError> {
        let lat = coords.lat.to_string();
        let lon = coords.lon.to_string();
        let response = self
            .client
            .get(&self.forecast_url)
            .query(&[
                ("latitude", lat.as_str()),
                ("longitude", lon.as_str()),
                ("current", CURRENT_FIELDS),
                ("hourly", "visibility"),
                ("daily", "sunrise,sunset"),
                ("wind_speed_unit", "ms"),
                ("timezone", "auto"),
                ("forecast_days", "1"),
            ])
            .send()
            .await?;

        read_json(response).await
    }

    /// Daily codes and temperature extremes for the next `days` days.
    #[instrument(skip(self), level = "debug")]
    pub async fn forecast(
        &self,
        coords: Coordinates,
        days: u8,
    ) -> Result<DailyResponse, WeatherError> {
        let lat = coords.lat.to_string();
        let lon = coords.lon.to_string();
        let days = days.to_string();
        let response = self
            .client
            .get(&self.forecast_url)
            .query(&[
                ("latitude", lat.as_str()),
                ("longitude", lon.as_str()),
                ("daily", DAILY_FORECAST_FIELDS),
                ("timezone", "auto"),
                ("forecast_days", days.as_str()),
            ])
            .send()
            .await?;

        read_json(response).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::types::WeatherCondition;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn current_body() -> serde_json::Value {
        let mut visibility: Vec<serde_json::Value> = (0..24).map(|h| (h * 100).into()).collect();
        visibility[5] = serde_json::Value::Null;
        serde_json::json!({
            "utc_offset_seconds": 3600,
            "current": {
                "time": "2024-06-01T14:45",
                "temperature_2m": 21.3,
                "relative_humidity_2m": 55,
                "apparent_temperature": 20.1,
                "weather_code": 61,
                "surface_pressure": 1009.4,
                "wind_speed_10m": 3.2,
                "wind_direction_10m": 240
            },
            "hourly": {
                "time": (0..24).map(|h| format!("2024-06-01T{:02}:00", h)).collect::<Vec<_>>(),
                "visibility": visibility
            },
            "daily": {
                "sunrise": ["2024-06-01T05:00"],
                "sunset": ["2024-06-01T21:30"]
            }
        })
    }

    fn berlin() -> Location {
        Location {
            name: "Berlin".into(),
            country: "Germany".into(),
            latitude: 52.52,
            longitude: 13.41,
        }
    }

    #[test]
    fn test_snapshot_shaping() {
        let response: CurrentResponse = serde_json::from_value(current_body()).unwrap();
        let snapshot = response.to_snapshot(&berlin()).unwrap();

        assert_eq!(snapshot.city, "Berlin");
        assert_eq!(snapshot.temperature, 21.3);
        assert_eq!(snapshot.feels_like, 20.1);
        assert_eq!(snapshot.humidity, 55.0);
        assert_eq!(snapshot.wind_deg, 240.0);
        assert_eq!(snapshot.visibility, 1400.0);
        assert_eq!(snapshot.condition, WeatherCondition::Rain);
        assert_eq!(snapshot.description, "Slight rain");
        // 2024-06-01T05:00 at UTC+1 is 04:00Z
        assert_eq!(snapshot.sunrise, 1_717_214_400);
        assert_eq!(snapshot.coord, Coordinates::new(52.52, 13.41));
    }

    #[test]
    fn test_snapshot_null_visibility_reads_zero() {
        let mut body = current_body();
        body["current"]["time"] = "2024-06-01T05:15".into();
        let response: CurrentResponse = serde_json::from_value(body).unwrap();
        let snapshot = response.to_snapshot(&berlin()).unwrap();
        assert_eq!(snapshot.visibility, 0.0);
    }

    #[test]
    fn test_snapshot_bad_time_is_parse_error() {
        let mut body = current_body();
        body["current"]["time"] = "yesterday".into();
        let response: CurrentResponse = serde_json::from_value(body).unwrap();
        assert!(matches!(
            response.to_snapshot(&berlin()),
            Err(WeatherError::Parse(_))
        ));
    }

    #[test]
    fn test_days_zip_truncates_to_shortest() {
        let response: DailyResponse = serde_json::from_value(serde_json::json!({
            "daily": {
                "time": ["2024-06-01", "2024-06-02", "2024-06-03"],
                "weather_code": [0, 3, 95],
                "temperature_2m_max": [25.0, 22.5, 19.0],
                "temperature_2m_min": [14.0, 13.5]
            }
        }))
        .unwrap();

        let days = response.to_days();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(days[0].description, "Clear sky");
        assert_eq!(days[1].condition, WeatherCondition::Clouds);
        assert_eq!(days[1].low, 13.5);
    }

    #[tokio::test]
    async fn test_current_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/forecast"))
            .and(query_param("latitude", "52.52"))
            .and(query_param("hourly", "visibility"))
            .and(query_param("forecast_days", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
            .mount(&mock_server)
            .await;

        let provider = WeatherProvider::new(Client::new(), &mock_server.uri());
        let response = provider
            .current(Coordinates::new(52.52, 13.41))
            .await
            .unwrap();
        assert_eq!(response.current.weather_code, 61);
        assert_eq!(response.hourly.visibility.len(), 24);
    }

    #[tokio::test]
    async fn test_forecast_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/forecast"))
            .and(query_param("forecast_days", "5"))
            .and(query_param("daily", DAILY_FORECAST_FIELDS))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "daily": {
                    "time": ["2024-06-01"],
                    "weather_code": [2],
                    "temperature_2m_max": [20.0],
                    "temperature_2m_min": [10.0]
                }
            })))
            .mount(&mock_server)
            .await;

        let provider = WeatherProvider::new(Client::new(), &mock_server.uri());
        let response = provider
            .forecast(Coordinates::new(1.0, 2.0), 5)
            .await
            .unwrap();
        assert_eq!(response.daily.time.len(), 1);
    }

    #[tokio::test]
    async fn test_unexpected_shape_is_parse_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"oops": true})),
            )
            .mount(&mock_server)
            .await;

        let provider = WeatherProvider::new(Client::new(), &mock_server.uri());
        let result = provider.current(Coordinates::new(1.0, 2.0)).await;
        assert!(matches!(result, Err(WeatherError::Parse(_))));
    }

    #[tokio::test]
    async fn test_server_error_is_upstream_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&mock_server)
            .await;

        let provider = WeatherProvider::new(Client::new(), &mock_server.uri());
        let result = provider.forecast(Coordinates::new(1.0, 2.0), 5).await;
        assert!(matches!(result, Err(WeatherError::Upstream { status: 502, .. })));
    }
}
