use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::geocode::Geocoder;
use crate::glyph::{glyph_for, is_night, UNKNOWN_GLYPH};
use crate::provider::{OneCallResponse, WeatherSource};
use crate::types::{Coordinate, Reading, WeatherSummary, UNKNOWN_DESCRIPTION};

/// Coordinate to display-ready weather. Never fails: a provider failure
/// yields [`WeatherSummary::unknown`].
pub struct WeatherLookup {
    source: Arc<dyn WeatherSource>,
    geocoder: Option<Arc<dyn Geocoder>>,
}

impl WeatherLookup {
    pub fn new(source: Arc<dyn WeatherSource>) -> Self {
        Self {
            source,
            geocoder: None,
        }
    }

    /// Attach a "City, State" label to every summary.
    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    pub async fn fetch(&self, coord: Coordinate) -> WeatherSummary {
        self.fetch_at(coord, Utc::now()).await
    }

    pub async fn fetch_at(&self, coord: Coordinate, now: DateTime<Utc>) -> WeatherSummary {
        let location = match &self.geocoder {
            Some(geocoder) => geocoder
                .reverse(coord)
                .await
                .and_then(|address| address.label()),
            None => None,
        };

        match self.source.one_call(coord).await {
            Ok(response) => summarize(&response, now, location),
            Err(e) => {
                tracing::warn!("Weather fetch failed, showing unknown: {}", e);
                WeatherSummary::unknown(location)
            }
        }
    }
}

fn summarize(
    response: &OneCallResponse,
    now: DateTime<Utc>,
    location: Option<String>,
) -> WeatherSummary {
    let night = is_night(now, response.current.sunrise, response.current.sunset);

    let (glyph, description) = match response.primary_condition() {
        Some(condition) => (glyph_for(condition.id, night), condition.main.clone()),
        None => (UNKNOWN_GLYPH, UNKNOWN_DESCRIPTION.to_string()),
    };

    let (high, low) = match response.today() {
        Some(today) => (Reading::rounded(today.temp.max), Reading::rounded(today.temp.min)),
        None => (Reading::Unknown, Reading::Unknown),
    };

    WeatherSummary {
        location,
        glyph: glyph.to_string(),
        description,
        temperature: Reading::rounded(response.current.temp),
        feels_like: Reading::rounded(response.current.feels_like),
        high,
        low,
        wind: Reading::rounded(response.current.wind_speed),
    }
}
