//! Read-through orchestration over the geocoding and forecast clients.
//!
//! Every read path shares the caches: geocoding results under `geo_*`,
//! current conditions under `weather_*` and daily forecasts under
//! `forecast_*`. Each cache expires independently.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use crate::cache::{
    forecast_key, geo_key, weather_key, CacheConfig, Clock, ExpiringCache, SystemClock,
};
use crate::geocode::{display_name, GeocodingClient};
use crate::http::build_client;
use crate::provider::{CurrentResponse, DailyResponse, WeatherProvider};
use crate::types::{
    BatchItem, CitySuggestion, Coordinates, CurrentWeatherRequest, Forecast, Location,
    WeatherError, WeatherSnapshot,
};

/// Days returned by [`WeatherService::forecast`]
pub const FORECAST_DAYS: u8 = 5;
/// Upper bound on suggestions returned by [`WeatherService::search`]
pub const SEARCH_LIMIT: usize = 8;
/// Queries shorter than this (after trimming) return no suggestions
pub const MIN_SEARCH_LEN: usize = 2;

const BATCH_NOT_FOUND: &str = "City not found";
const BATCH_FAILED: &str = "Failed to fetch weather data";

#[derive(Debug)]
pub struct WeatherService {
    geocoder: GeocodingClient,
    provider: WeatherProvider,
    geo_cache: ExpiringCache<Location>,
    weather_cache: ExpiringCache<CurrentResponse>,
    forecast_cache: ExpiringCache<DailyResponse>,
}

impl WeatherService {
    pub fn new(
        geocoder: GeocodingClient,
        provider: WeatherProvider,
        cache: CacheConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            geocoder,
            provider,
            geo_cache: ExpiringCache::new(cache, clock.clone()),
            weather_cache: ExpiringCache::new(cache, clock.clone()),
            forecast_cache: ExpiringCache::new(cache, clock),
        }
    }

    /// Build the service and its HTTP client from configuration.
    pub fn from_config(
        upstream: &folio_core::UpstreamConfig,
        cache: &folio_core::CacheSettings,
    ) -> Result<Self, WeatherError> {
        let client = build_client(
            &upstream.user_agent,
            Duration::from_secs(upstream.request_timeout_secs),
        )?;

        let geocoder = GeocodingClient::new(
            client.clone(),
            &upstream.geocoding_url,
            &upstream.reverse_geocoding_url,
        );
        let provider = WeatherProvider::new(client, &upstream.forecast_url);

        Ok(Self::new(
            geocoder,
            provider,
            CacheConfig::from(cache),
            Arc::new(SystemClock),
        ))
    }

    /// Current conditions by place name or coordinates.
    pub async fn current_weather(
        &self,
        request: CurrentWeatherRequest,
    ) -> Result<WeatherSnapshot, WeatherError> {
        let location = match request {
            CurrentWeatherRequest::City(city) => self.resolve_city(&city).await?,
            CurrentWeatherRequest::Coordinates(coords) => self.geocoder.reverse(coords).await,
        };

        let current = self.current_conditions(location.coordinates()).await?;
        current.to_snapshot(&location)
    }

    /// Five-day daily forecast for a place name.
    pub async fn forecast(&self, city: &str) -> Result<Forecast, WeatherError> {
        let location = self.resolve_city(city).await?;
        let coords = location.coordinates();
        let key = forecast_key(coords);

        let daily = match self.forecast_cache.get(&key) {
            Some(daily) => daily,
            None => {
                let daily = self.provider.forecast(coords, FORECAST_DAYS).await?;
                self.forecast_cache.set(key, daily.clone());
                daily
            }
        };

        Ok(Forecast {
            city: location.name,
            country: location.country,
            list: daily.to_days(),
        })
    }

    /// Place suggestions for a partial name. Short queries return nothing
    /// without calling upstream.
    pub async fn search(&self, query: &str) -> Result<Vec<CitySuggestion>, WeatherError> {
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_LEN {
            return Ok(Vec::new());
        }

        let places = self.geocoder.search(query, SEARCH_LIMIT).await?;

        Ok(places
            .into_iter()
            .take(SEARCH_LIMIT)
            .map(|place| CitySuggestion {
                display_name: display_name(&place),
                name: place.name,
                country: place.country.unwrap_or_default(),
                state: place.admin1.unwrap_or_default(),
                lat: place.latitude,
                lon: place.longitude,
            })
            .collect())
    }

    /// Current conditions for several places at once. Lookups run
    /// concurrently; each failure is reported on its own item.
    pub async fn batch(&self, cities: &[String]) -> Vec<BatchItem> {
        let lookups = cities.iter().map(|city| async move {
            match self
                .current_weather(CurrentWeatherRequest::City(city.clone()))
                .await
            {
                Ok(snapshot) => BatchItem::success(city.clone(), snapshot),
                Err(e) if e.is_not_found() => BatchItem::failure(city.clone(), BATCH_NOT_FOUND),
                Err(e) => {
                    tracing::warn!(city = %city, "Batch lookup failed: {}", e);
                    BatchItem::failure(city.clone(), BATCH_FAILED)
                }
            }
        });

        join_all(lookups).await
    }

    /// Drop stale entries from every cache. Returns the number removed.
    pub fn purge_expired(&self) -> usize {
        self.geo_cache.purge_expired()
            + self.weather_cache.purge_expired()
            + self.forecast_cache.purge_expired()
    }

    /// Entries currently held across all caches, stale ones included.
    pub fn cached_entries(&self) -> usize {
        self.geo_cache.len() + self.weather_cache.len() + self.forecast_cache.len()
    }

    async fn resolve_city(&self, city: &str) -> Result<Location, WeatherError> {
        let key = geo_key(city);
        if let Some(location) = self.geo_cache.get(&key) {
            return Ok(location);
        }

        let location = self.geocoder.locate(city.trim()).await?;
        self.geo_cache.set(key, location.clone());
        Ok(location)
    }

    async fn current_conditions(
        &self,
        coords: Coordinates,
    ) -> Result<CurrentResponse, WeatherError> {
        let key = weather_key(coords);
        if let Some(current) = self.weather_cache.get(&key) {
            return Ok(current);
        }

        let current = self.provider.current(coords).await?;
        self.weather_cache.set(key, current.clone());
        Ok(current)
    }
}
