//! OpenWeatherMap One Call client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

use crate::types::{Coordinate, WeatherError};

const OPENWEATHER_URL: &str = "https://api.openweathermap.org/data/2.5";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Source of raw current/daily conditions for a coordinate.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn one_call(&self, coord: Coordinate) -> Result<OneCallResponse, WeatherError>;
}

// --- One Call JSON response types ---

#[derive(Debug, Clone, Deserialize)]
pub struct OneCallResponse {
    pub current: CurrentConditions,
    pub daily: Vec<DailyConditions>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentConditions {
    pub temp: f64,
    pub feels_like: f64,
    #[serde(default)]
    pub wind_speed: f64,
    /// Unix seconds. Absent during polar day and polar night
    #[serde(default)]
    pub sunrise: Option<i64>,
    /// Unix seconds
    #[serde(default)]
    pub sunset: Option<i64>,
    pub weather: Vec<Condition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Condition {
    pub id: i32,
    pub main: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DailyConditions {
    pub temp: DailyTemperature,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DailyTemperature {
    pub max: f64,
    pub min: f64,
}

impl OneCallResponse {
    /// Primary current condition. One Call lists the most significant first.
    pub fn primary_condition(&self) -> Option<&Condition> {
        self.current.weather.first()
    }

    pub fn today(&self) -> Option<&DailyConditions> {
        self.daily.first()
    }
}

/// HTTP client for the One Call API, imperial units.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenWeatherClient {
    pub fn new(api_key: &str) -> Result<Self, WeatherError> {
        Self::with_base_url(api_key, OPENWEATHER_URL)
    }

    pub fn with_base_url(api_key: &str, base_url: &str) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    #[instrument(skip(self), level = "info")]
    async fn one_call(&self, coord: Coordinate) -> Result<OneCallResponse, WeatherError> {
        let url = format!("{}/onecall", self.base_url);
        tracing::debug!("Fetching url: {}?lat={}&lon={}", url, coord.latitude, coord.longitude);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", coord.latitude.to_string()),
                ("lon", coord.longitude.to_string()),
                ("exclude", "minutely,hourly,alerts".to_string()),
                ("units", "imperial".to_string()),
                ("lang", "en".to_string()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Status(status.as_u16()));
        }

        let body: OneCallResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))?;

        if body.primary_condition().is_none() {
            return Err(WeatherError::Parse("current.weather is empty".to_string()));
        }
        if body.today().is_none() {
            return Err(WeatherError::Parse("daily is empty".to_string()));
        }

        Ok(body)
    }
}
