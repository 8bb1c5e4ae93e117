use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Serialize;
use std::sync::Arc;

use glance_calendar::{CalendarClient, CalendarError, CalendarEvent, CalendarLookup};
use glance_core::{AppError, Config};
use glance_weather::{
    FileLocationCache, IpLocator, LocationResolver, NominatimGeocoder, OpenWeatherClient,
    WeatherLookup, WeatherSummary,
};

/// Everything one panel refresh displays.
#[derive(Debug, Clone, Serialize)]
pub struct WidgetData {
    pub weather: WeatherSummary,
    pub next_work_event: Option<CalendarEvent>,
    pub next_personal_event: Option<CalendarEvent>,
}

/// Runs the location, weather and calendar lookups for one refresh.
pub struct Orchestrator {
    locator: LocationResolver,
    weather: WeatherLookup,
    calendars: CalendarLookup,
    work_calendar: String,
    personal_calendar: String,
}

impl Orchestrator {
    pub fn new(
        locator: LocationResolver,
        weather: WeatherLookup,
        calendars: CalendarLookup,
        work_calendar: impl Into<String>,
        personal_calendar: impl Into<String>,
    ) -> Self {
        Self {
            locator,
            weather,
            calendars,
            work_calendar: work_calendar.into(),
            personal_calendar: personal_calendar.into(),
        }
    }

    /// Wire the live HTTP clients described by `config`.
    ///
    /// # Errors
    /// Fails when an HTTP client cannot be built or the cache location
    /// cannot be determined.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let locator = IpLocator::with_url(&config.location.provider_url)
            .map_err(anyhow::Error::from)?;
        let cache = FileLocationCache::new(config.location_cache_path()?);
        let resolver = LocationResolver::new(Arc::new(locator), Arc::new(cache))
            .remember_fixes(config.location.remember);

        let source = OpenWeatherClient::with_base_url(&config.weather.api_key, &config.weather.base_url)
            .map_err(anyhow::Error::from)?;
        let mut weather = WeatherLookup::new(Arc::new(source));
        if config.variant.include_location_label {
            weather = weather.with_geocoder(Arc::new(NominatimGeocoder::with_base_url(
                &config.geocoding.user_agent,
                &config.geocoding.base_url,
            )));
        }

        let client =
            CalendarClient::with_base_url(&config.calendar.access_token, &config.calendar.api_base_url)
                .map_err(anyhow::Error::from)?;

        Ok(Self::new(
            resolver,
            weather,
            CalendarLookup::new(Arc::new(client)),
            config.calendar.work_calendar.clone(),
            config.calendar.personal_calendar.clone(),
        ))
    }

    pub async fn run(&self) -> Result<WidgetData, AppError> {
        self.run_at(&Local::now()).await
    }

    /// Refresh as of `now`; calendar day windows follow its time zone.
    ///
    /// # Errors
    /// `AppError::CalendarNotFound` when a configured calendar does not exist.
    /// Every other failure degrades the affected field instead.
    pub async fn run_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<WidgetData, AppError> {
        let now_utc = now.with_timezone(&Utc);

        let weather = async {
            let coord = self.locator.resolve().await;
            self.weather.fetch_at(coord, now_utc).await
        };

        let (weather, work, personal) = tokio::join!(
            weather,
            self.calendars.next_event_at(&self.work_calendar, now),
            self.calendars.next_event_at(&self.personal_calendar, now),
        );

        let data = WidgetData {
            weather,
            next_work_event: settle(&self.work_calendar, work)?,
            next_personal_event: settle(&self.personal_calendar, personal)?,
        };

        match serde_json::to_string(&data) {
            Ok(json) => tracing::debug!("Widget data: {}", json),
            Err(e) => tracing::debug!("Widget data not serializable: {}", e),
        }

        Ok(data)
    }
}

fn settle(
    name: &str,
    result: Result<Option<CalendarEvent>, CalendarError>,
) -> Result<Option<CalendarEvent>, AppError> {
    match result {
        Ok(event) => Ok(event),
        Err(e) if e.is_misconfiguration() => Err(AppError::CalendarNotFound(name.to_string())),
        Err(e) => {
            tracing::warn!("Calendar {} unavailable: {}", name, e.user_message());
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settle_keeps_found_events() {
        assert!(matches!(settle("Lessons", Ok(None)), Ok(None)));
    }

    #[test]
    fn test_settle_missing_calendar_is_fatal() {
        let result = settle("Lessons", Err(CalendarError::CalendarNotFound("Lessons".into())));
        assert!(matches!(result, Err(AppError::CalendarNotFound(n)) if n == "Lessons"));
    }

    #[test]
    fn test_settle_transient_errors_degrade() {
        assert!(matches!(settle("Lessons", Err(CalendarError::TokenExpired)), Ok(None)));
        assert!(matches!(settle("Lessons", Err(CalendarError::RateLimited(5))), Ok(None)));
        assert!(matches!(
            settle("Lessons", Err(CalendarError::ApiError("500".into()))),
            Ok(None)
        ));
    }
}
