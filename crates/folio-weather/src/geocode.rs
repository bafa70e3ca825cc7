//! Geocoding: place names to coordinates and back.
//!
//! Forward search uses the Open-Meteo geocoding API. Reverse lookup uses
//! Nominatim (OpenStreetMap); both are free and need no API key.

use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::http::read_json;
use crate::types::{Coordinates, Location, WeatherError};

/// Name used when a reverse lookup cannot name the coordinates.
pub const PLACEHOLDER_NAME: &str = "Current Location";

/// One forward search hit, in upstream relevance order
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeoPlace {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub country: Option<String>,
    /// First-level administrative area (state, province, region)
    #[serde(default)]
    pub admin1: Option<String>,
}

impl From<GeoPlace> for Location {
    fn from(place: GeoPlace) -> Self {
        Self {
            name: place.name,
            country: place.country.unwrap_or_default(),
            latitude: place.latitude,
            longitude: place.longitude,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Option<Vec<GeoPlace>>,
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    county: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GeocodingClient {
    client: Client,
    search_url: String,
    reverse_url: String,
}

impl GeocodingClient {
    pub fn new(client: Client, search_base: &str, reverse_base: &str) -> Self {
        Self {
            client,
            search_url: format!("{}/search", search_base.trim_end_matches('/')),
            reverse_url: format!("{}/reverse", reverse_base.trim_end_matches('/')),
        }
    }

    /// Forward search by place name. No matches is an empty list, not an error.
    #[instrument(skip(self), level = "debug")]
    pub async fn search(&self, name: &str, count: usize) -> Result<Vec<GeoPlace>, WeatherError> {
        let count = count.to_string();
        let response = self
            .client
            .get(&self.search_url)
            .query(&[
                ("name", name),
                ("count", count.as_str()),
                ("language", "en"),
                ("format", "json"),
            ])
            .send()
            .await?;

        let body: SearchResponse = read_json(response).await?;
        Ok(body.results.unwrap_or_default())
    }

    /// Best match for `name`, or `NotFound` when the upstream has none.
    pub async fn locate(&self, name: &str) -> Result<Location, WeatherError> {
        self.search(name, 1)
            .await?
            .into_iter()
            .next()
            .map(Location::from)
            .ok_or_else(|| WeatherError::NotFound(name.to_string()))
    }

    /// Name the place at `coords`. Never fails: any upstream problem yields
    /// a "Current Location" placeholder carrying the original coordinates.
    #[instrument(skip(self), level = "debug")]
    pub async fn reverse(&self, coords: Coordinates) -> Location {
        match self.try_reverse(coords).await {
            Ok(Some(location)) => location,
            Ok(None) => {
                tracing::debug!("Reverse geocode returned no address");
                placeholder(coords)
            }
            Err(e) => {
                tracing::debug!("Reverse geocode failed: {}", e);
                placeholder(coords)
            }
        }
    }

    async fn try_reverse(&self, coords: Coordinates) -> Result<Option<Location>, WeatherError> {
        let lat = coords.lat.to_string();
        let lon = coords.lon.to_string();
        let response = self
            .client
            .get(&self.reverse_url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("format", "json"),
                ("addressdetails", "1"),
                ("zoom", "10"),
            ])
            .send()
            .await?;

        let body: NominatimResponse = read_json(response).await?;
        let Some(addr) = body.address else {
            return Ok(None);
        };

        let country = addr.country.clone().unwrap_or_default();

        // Prefer city > town > village > municipality for the place name
        let name = addr
            .city
            .or(addr.town)
            .or(addr.village)
            .or(addr.municipality)
            .or(addr.county)
            .or(addr.state)
            .or(addr.country);

        Ok(name.map(|name| {
            tracing::info!("Reverse geocoded to: {}", name);
            Location {
                name,
                country,
                latitude: coords.lat,
                longitude: coords.lon,
            }
        }))
    }
}

fn placeholder(coords: Coordinates) -> Location {
    Location {
        name: PLACEHOLDER_NAME.to_string(),
        country: String::new(),
        latitude: coords.lat,
        longitude: coords.lon,
    }
}

/// `name, admin1, country`, skipping empty segments.
pub fn display_name(place: &GeoPlace) -> String {
    [Some(place.name.as_str()), place.admin1.as_deref(), place.country.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}
