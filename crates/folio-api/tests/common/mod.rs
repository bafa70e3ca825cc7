//! Shared fixtures: a router wired to a wiremock upstream.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use folio_api::api_router;
use folio_core::{CacheSettings, UpstreamConfig};
use folio_weather::WeatherService;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Router whose geocoding, reverse geocoding and forecast calls all go to `server`.
pub fn create_test_app(server: &MockServer) -> Router {
    let upstream = UpstreamConfig {
        geocoding_url: server.uri(),
        forecast_url: server.uri(),
        reverse_geocoding_url: server.uri(),
        ..UpstreamConfig::default()
    };
    let service = WeatherService::from_config(&upstream, &CacheSettings::default())
        .expect("service should build");
    api_router(Arc::new(service))
}

pub async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn post_json(
    app: Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

pub async fn mount_city(server: &MockServer, name: &str, lat: f64, lon: f64, country: &str) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("name", name))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [{"name": name, "latitude": lat, "longitude": lon, "country": country}]
        })))
        .mount(server)
        .await;
}

pub async fn mount_unknown_city(server: &MockServer, name: &str) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("name", name))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "generationtime_ms": 0.4
        })))
        .mount(server)
        .await;
}

/// Current-conditions payload for the forecast endpoint (UTC, code `code`).
pub fn current_body(code: i32) -> serde_json::Value {
    serde_json::json!({
        "utc_offset_seconds": 0,
        "current": {
            "time": "2024-06-01T10:30",
            "temperature_2m": 22.4,
            "relative_humidity_2m": 48,
            "apparent_temperature": 21.9,
            "weather_code": code,
            "surface_pressure": 1015.2,
            "wind_speed_10m": 4.1,
            "wind_direction_10m": 310
        },
        "hourly": {
            "time": (0..24).map(|h| format!("2024-06-01T{:02}:00", h)).collect::<Vec<_>>(),
            "visibility": vec![24140.0; 24]
        },
        "daily": {
            "sunrise": ["2024-06-01T05:12"],
            "sunset": ["2024-06-01T20:48"]
        }
    })
}

pub async fn mount_current(server: &MockServer, code: i32) {
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("forecast_days", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body(code)))
        .mount(server)
        .await;
}
