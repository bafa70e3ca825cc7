//! Weather lookups for Folio
//!
//! Proxies Open-Meteo geocoding and forecast data behind an expiring
//! in-memory cache, and maps WMO weather codes to display conditions.

pub mod cache;
pub mod condition;
pub mod geocode;
mod http;
pub mod provider;
pub mod service;
pub mod types;

pub use cache::{CacheConfig, Clock, ExpiringCache, ManualClock, SystemClock};
pub use condition::map_weather_code;
pub use geocode::GeocodingClient;
pub use http::build_client;
pub use provider::WeatherProvider;
pub use service::WeatherService;
pub use types::*;
