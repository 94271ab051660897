use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::config::GeocoderConfig;
use crate::domain::Coordinates;

const USER_AGENT: &str = concat!("porchmap/", env!("CARGO_PKG_VERSION"));
const SEARCH_PATH: &str = "/search.php";

/// First candidate of a geocoding lookup, as returned by the service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeocodeResult {
    pub lat: String,
    pub lon: String,
}

impl GeocodeResult {
    /// Parse the decimal strings into a coordinate pair.
    pub fn coordinates(&self) -> Option<Coordinates> {
        let lat = self.lat.trim().parse().ok()?;
        let lon = self.lon.trim().parse().ok()?;
        Some(Coordinates { lat, lon })
    }
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoding request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("geocoding service returned status {0}")]
    Status(StatusCode),
    #[error("malformed geocoding response: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Anything that can turn a free-text address into a lookup result.
///
/// `Ok(None)` means the service answered but found nothing.
pub trait Geocoder {
    fn geocode(&self, address: &str) -> Result<Option<GeocodeResult>, GeocodeError>;
}

/// Append the locality to an address unless it already mentions it.
pub fn qualify(address: &str, locality: &str) -> String {
    let address = address.trim();
    let locality = locality.trim();
    if locality.is_empty() || address.to_lowercase().contains(&locality.to_lowercase()) {
        address.to_string()
    } else {
        format!("{}, {}", address, locality)
    }
}

/// Blocking client for a Nominatim-compatible `search.php` endpoint.
pub struct NominatimClient {
    client: reqwest::blocking::Client,
    search_url: String,
    locality: String,
}

impl NominatimClient {
    pub fn new(config: &GeocoderConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(GeocodeError::Request)?;

        Ok(Self {
            client,
            search_url: format!("{}{}", config.url.trim_end_matches('/'), SEARCH_PATH),
            locality: config.locality.clone(),
        })
    }

    #[cfg(test)]
    fn search_url(&self) -> &str {
        &self.search_url
    }
}

impl Geocoder for NominatimClient {
    fn geocode(&self, address: &str) -> Result<Option<GeocodeResult>, GeocodeError> {
        let query = qualify(address, &self.locality);
        tracing::debug!(%query, "geocoding");

        let response = self
            .client
            .get(&self.search_url)
            .query(&[("q", query.as_str()), ("format", "json")])
            .send()
            .map_err(GeocodeError::Request)?;

        if !response.status().is_success() {
            return Err(GeocodeError::Status(response.status()));
        }

        let results: Vec<GeocodeResult> = response.json().map_err(|e| {
            if e.is_decode() {
                GeocodeError::Decode(e)
            } else {
                GeocodeError::Request(e)
            }
        })?;

        Ok(results.into_iter().next())
    }
}
