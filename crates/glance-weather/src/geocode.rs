//! Reverse geocoding: convert coordinates to a "City, State" label.
//! Uses Nominatim (OpenStreetMap) - free, no API key required.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::types::Coordinate;

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// The parts of a postal address the panel label needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostalAddress {
    pub city: Option<String>,
    pub state: Option<String>,
}

impl PostalAddress {
    /// "City, State", or whichever half is known.
    pub fn label(&self) -> Option<String> {
        let city = self.city.as_deref().filter(|c| !c.is_empty());
        let state = self.state.as_deref().filter(|s| !s.is_empty());
        match (city, state) {
            (Some(c), Some(s)) if c != s => Some(format!("{}, {}", c, s)),
            (Some(c), _) => Some(c.to_string()),
            (None, Some(s)) => Some(s.to_string()),
            (None, None) => None,
        }
    }
}

/// Best-effort reverse geocoder. `None` means "no label", never an error.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn reverse(&self, coord: Coordinate) -> Option<PostalAddress>;
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
    state: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: Option<Client>,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(user_agent: &str) -> Self {
        Self::with_base_url(user_agent, NOMINATIM_URL)
    }

    pub fn with_base_url(user_agent: &str, base_url: &str) -> Self {
        let client = match Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(user_agent)
            .build()
        {
            Ok(c) => Some(c),
            Err(e) => {
                tracing::warn!("Failed to create geocoding client: {}", e);
                None
            }
        };

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn reverse(&self, coord: Coordinate) -> Option<PostalAddress> {
        let client = self.client.as_ref()?;
        let url = format!(
            "{}/reverse?lat={}&lon={}&format=json&addressdetails=1&zoom=10",
            self.base_url, coord.latitude, coord.longitude
        );

        let response = match client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Reverse geocode request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!("Reverse geocode returned status {}", response.status());
            return None;
        }

        let body: NominatimResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                tracing::debug!("Reverse geocode parse error: {}", e);
                return None;
            }
        };

        let addr = body.address?;
        // Prefer city > town > village > municipality
        let city = addr
            .city
            .or(addr.town)
            .or(addr.village)
            .or(addr.municipality);

        let address = PostalAddress {
            city,
            state: addr.state,
        };
        tracing::debug!("Reverse geocoded to: {:?}", address.label());
        Some(address)
    }
}
