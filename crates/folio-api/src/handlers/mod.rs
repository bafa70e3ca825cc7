//! HTTP handlers for the weather API.

pub mod health;
pub mod weather;

pub use health::health_handler;
pub use weather::{
    batch_weather_handler, current_weather_handler, forecast_handler, search_handler,
};
