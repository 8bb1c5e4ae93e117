//! Coordinate resolution: live fix, then cached fix, then the fixed default.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::LocationCache;
use crate::types::{Coordinate, LocationError, DEFAULT_COORDINATE};

const IP_API_URL: &str = "http://ip-api.com/json";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Live location fix.
#[async_trait]
pub trait LocationSource: Send + Sync {
    async fn current(&self) -> Result<Coordinate, LocationError>;
}

/// City-level location from the public IP address.
#[derive(Debug, Clone)]
pub struct IpLocator {
    client: Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpLocator {
    pub fn new() -> Result<Self, LocationError> {
        Self::with_url(IP_API_URL)
    }

    pub fn with_url(url: &str) -> Result<Self, LocationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl LocationSource for IpLocator {
    async fn current(&self) -> Result<Coordinate, LocationError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("fields", "status,message,lat,lon")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LocationError::Unavailable(format!(
                "locator returned status {}",
                response.status()
            )));
        }

        let body: IpApiResponse = response.json().await?;
        match (body.status.as_str(), body.lat, body.lon) {
            ("success", Some(latitude), Some(longitude)) => Ok(Coordinate {
                latitude,
                longitude,
            }),
            _ => Err(LocationError::Unavailable(
                body.message.unwrap_or_else(|| "no fix".to_string()),
            )),
        }
    }
}

/// Always yields a coordinate: live fix, else cached fix, else `{0, 0}`.
pub struct LocationResolver {
    source: Arc<dyn LocationSource>,
    cache: Arc<dyn LocationCache>,
    remember: bool,
}

impl LocationResolver {
    pub fn new(source: Arc<dyn LocationSource>, cache: Arc<dyn LocationCache>) -> Self {
        Self {
            source,
            cache,
            remember: false,
        }
    }

    /// Write successful live fixes back to the cache.
    pub fn remember_fixes(mut self, remember: bool) -> Self {
        self.remember = remember;
        self
    }

    pub async fn resolve(&self) -> Coordinate {
        match self.source.current().await {
            Ok(coord) => {
                tracing::debug!("Live location: {}, {}", coord.latitude, coord.longitude);
                if self.remember {
                    if let Err(e) = self.cache.write(&coord) {
                        tracing::warn!("Failed to cache location: {}", e);
                    }
                }
                coord
            }
            Err(e) => {
                tracing::info!("Live location unavailable ({}), using cache", e);
                self.cache.read().unwrap_or_else(|| {
                    tracing::info!("No cached location, using default");
                    DEFAULT_COORDINATE
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CacheError;
    use std::sync::Mutex;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FixedSource(Option<Coordinate>);

    #[async_trait]
    impl LocationSource for FixedSource {
        async fn current(&self) -> Result<Coordinate, LocationError> {
            self.0
                .ok_or_else(|| LocationError::Unavailable("denied".to_string()))
        }
    }

    #[derive(Default)]
    struct MemoryCache(Mutex<Option<Coordinate>>);

    impl LocationCache for MemoryCache {
        fn read(&self) -> Option<Coordinate> {
            *self.0.lock().unwrap()
        }

        fn write(&self, coord: &Coordinate) -> Result<(), CacheError> {
            *self.0.lock().unwrap() = Some(*coord);
            Ok(())
        }
    }

    fn resolver(live: Option<Coordinate>, cached: Option<Coordinate>) -> LocationResolver {
        LocationResolver::new(
            Arc::new(FixedSource(live)),
            Arc::new(MemoryCache(Mutex::new(cached))),
        )
    }

    #[tokio::test]
    async fn test_prefers_live_fix() {
        let r = resolver(Some(Coordinate::new(45.0, 7.0)), Some(Coordinate::new(1.0, 1.0)));
        assert_eq!(r.resolve().await, Coordinate::new(45.0, 7.0));
    }

    #[tokio::test]
    async fn test_falls_back_to_cache() {
        let r = resolver(None, Some(Coordinate::new(1.0, 2.0)));
        assert_eq!(r.resolve().await, Coordinate::new(1.0, 2.0));
    }

    #[tokio::test]
    async fn test_falls_back_to_default() {
        let r = resolver(None, None);
        assert_eq!(r.resolve().await, Coordinate::new(0.0, 0.0));
    }

    #[tokio::test]
    async fn test_cache_untouched_unless_remembering() {
        let cache = Arc::new(MemoryCache::default());
        let live = Coordinate::new(45.0, 7.0);

        LocationResolver::new(Arc::new(FixedSource(Some(live))), cache.clone())
            .resolve()
            .await;
        assert_eq!(cache.read(), None);

        LocationResolver::new(Arc::new(FixedSource(Some(live))), cache.clone())
            .remember_fixes(true)
            .resolve()
            .await;
        assert_eq!(cache.read(), Some(live));
    }

    #[tokio::test]
    async fn test_ip_locator_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success", "lat": 45.07, "lon": 7.69
            })))
            .mount(&mock_server)
            .await;

        let locator = IpLocator::with_url(&format!("{}/json", mock_server.uri())).unwrap();
        assert_eq!(locator.current().await.unwrap(), Coordinate::new(45.07, 7.69));
    }

    #[tokio::test]
    async fn test_ip_locator_fail_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "fail", "message": "reserved range"
            })))
            .mount(&mock_server)
            .await;

        let locator = IpLocator::with_url(&format!("{}/json", mock_server.uri())).unwrap();
        let result = locator.current().await;
        assert!(matches!(result, Err(LocationError::Unavailable(m)) if m == "reserved range"));
    }
}
