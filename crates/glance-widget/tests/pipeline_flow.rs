//! End-to-end refreshes of the panel pipeline.
//!
//! The first group wires the real HTTP clients from a `Config` against a
//! mock server; the second swaps in in-memory collaborators.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use glance_calendar::{Calendar, CalendarError, CalendarEvent, CalendarLookup, CalendarStore, EventStatus};
use glance_core::{AppError, Config, PanelConfig, VariantConfig};
use glance_weather::{
    CacheError, Coordinate, LocationCache, LocationError, LocationResolver, LocationSource,
    OneCallResponse, Reading, WeatherError, WeatherLookup, WeatherSource,
};
use glance_widget::{render_in, Orchestrator};

fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap()
}

fn one_call_body(now: DateTime<Utc>) -> serde_json::Value {
    serde_json::json!({
        "current": {
            "sunrise": now.timestamp() - 6 * 3600,
            "sunset": now.timestamp() + 6 * 3600,
            "temp": 91.4,
            "feels_like": 95.5,
            "wind_speed": 3.2,
            "weather": [{"id": 801, "main": "Clouds"}]
        },
        "daily": [{"temp": {"min": 70.49, "max": 98.6}}]
    })
}

// Mock-server pipeline

async fn mount_location(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "success", "lat": 45.07, "lon": 7.69
        })))
        .mount(server)
        .await;
}

async fn mount_calendars(server: &MockServer, names: &[(&str, &str)]) {
    let items: Vec<_> = names
        .iter()
        .map(|(id, summary)| serde_json::json!({"id": id, "summary": summary}))
        .collect();

    Mock::given(method("GET"))
        .and(path("/users/me/calendarList"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "items": items })))
        .mount(server)
        .await;
}

async fn mount_events(server: &MockServer, calendar_id: &str, items: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/calendars/{}/events", calendar_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "items": items })))
        .mount(server)
        .await;
}

fn mock_config(server: &MockServer, cache_dir: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.weather.api_key = "key".to_string();
    config.weather.base_url = server.uri();
    config.location.provider_url = format!("{}/json", server.uri());
    config.location.cache_path = Some(cache_dir.join("location_cache.json"));
    config.calendar.api_base_url = server.uri();
    config.calendar.access_token = "token".to_string();
    config.calendar.work_calendar = "Lessons".to_string();
    config.calendar.personal_calendar = "Home".to_string();
    config.variant.include_location_label = false;
    config
}

#[tokio::test]
async fn test_full_refresh_from_config() {
    let server = MockServer::start().await;
    let now = noon();

    mount_location(&server).await;
    Mock::given(method("GET"))
        .and(path("/onecall"))
        .respond_with(ResponseTemplate::new(200).set_body_json(one_call_body(now)))
        .mount(&server)
        .await;
    mount_calendars(&server, &[("lessons", "Lessons"), ("home", "Home")]).await;
    mount_events(
        &server,
        "lessons",
        serde_json::json!([
            {
                "id": "done",
                "summary": "Physics",
                "start": {"dateTime": "2024-02-01T08:00:00Z"},
                "end": {"dateTime": "2024-02-01T09:00:00Z"}
            },
            {
                "id": "math",
                "summary": "Math",
                "start": {"dateTime": "2024-02-01T13:00:00Z"},
                "end": {"dateTime": "2024-02-01T14:00:00Z"}
            }
        ]),
    )
    .await;
    mount_events(&server, "home", serde_json::json!([])).await;

    let dir = tempfile::tempdir().unwrap();
    let config = mock_config(&server, dir.path());
    let orchestrator = Orchestrator::from_config(&config).unwrap();

    let data = orchestrator.run_at(&now).await.unwrap();

    assert_eq!(data.weather.glyph, "🌤");
    assert_eq!(data.weather.temperature, Reading::Value(91));
    assert_eq!(data.weather.location, None);
    assert_eq!(data.next_work_event.as_ref().unwrap().title, "Math");
    assert!(data.next_personal_event.is_none());

    let panel = render_in(&data, &config.variant, &config.panel, &Utc);
    assert_eq!(panel.lines[1].text, "📌 13:00 Math");
    assert_eq!(panel.lines[2].text, "📘 No upcoming events");
    assert_eq!(panel.lines[3].text, "🌤 32c Scope : 37c to 21c");
}

#[tokio::test]
async fn test_missing_calendar_aborts_refresh() {
    let server = MockServer::start().await;
    let now = noon();

    mount_location(&server).await;
    Mock::given(method("GET"))
        .and(path("/onecall"))
        .respond_with(ResponseTemplate::new(200).set_body_json(one_call_body(now)))
        .mount(&server)
        .await;
    mount_calendars(&server, &[("lessons", "Lessons")]).await;
    mount_events(&server, "lessons", serde_json::json!([])).await;

    let dir = tempfile::tempdir().unwrap();
    let orchestrator = Orchestrator::from_config(&mock_config(&server, dir.path())).unwrap();

    let result = orchestrator.run_at(&now).await;
    assert!(matches!(result, Err(AppError::CalendarNotFound(n)) if n == "Home"));
}

#[tokio::test]
async fn test_weather_outage_degrades_without_error() {
    let server = MockServer::start().await;

    mount_location(&server).await;
    Mock::given(method("GET"))
        .and(path("/onecall"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_calendars(&server, &[("lessons", "Lessons"), ("home", "Home")]).await;
    mount_events(&server, "lessons", serde_json::json!([])).await;
    mount_events(&server, "home", serde_json::json!([])).await;

    let dir = tempfile::tempdir().unwrap();
    let config = mock_config(&server, dir.path());
    let data = Orchestrator::from_config(&config)
        .unwrap()
        .run_at(&noon())
        .await
        .unwrap();

    assert!(data.weather.is_unknown());
    let panel = render_in(&data, &config.variant, &config.panel, &Utc);
    assert_eq!(panel.lines[1].text, "📌 No upcoming lessons");
    assert_eq!(panel.lines[3].text, "❓ ?c Scope : ?c to ?c");
}

// In-memory collaborators

struct NoFix;

#[async_trait]
impl LocationSource for NoFix {
    async fn current(&self) -> Result<Coordinate, LocationError> {
        Err(LocationError::Unavailable("permission denied".to_string()))
    }
}

struct CachedAt(Coordinate);

impl LocationCache for CachedAt {
    fn read(&self) -> Option<Coordinate> {
        Some(self.0)
    }

    fn write(&self, _coord: &Coordinate) -> Result<(), CacheError> {
        Ok(())
    }
}

/// Records the coordinate it was asked about.
#[derive(Default)]
struct RecordingWeather {
    asked: Mutex<Option<Coordinate>>,
}

#[async_trait]
impl WeatherSource for RecordingWeather {
    async fn one_call(&self, coord: Coordinate) -> Result<OneCallResponse, WeatherError> {
        *self.asked.lock().unwrap() = Some(coord);
        serde_json::from_value(one_call_body(noon())).map_err(|e| WeatherError::Parse(e.to_string()))
    }
}

struct OneCalendar {
    events: Vec<CalendarEvent>,
    failure: Option<fn() -> CalendarError>,
}

#[async_trait]
impl CalendarStore for OneCalendar {
    async fn find_calendar(&self, name: &str) -> Result<Calendar, CalendarError> {
        Ok(Calendar {
            id: name.to_lowercase(),
            summary: name.to_string(),
            is_primary: false,
        })
    }

    async fn events_between(
        &self,
        calendar: &Calendar,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        if let (Some(failure), "home") = (self.failure, calendar.id.as_str()) {
            return Err(failure());
        }
        Ok(self
            .events
            .iter()
            .filter(|e| e.start >= start && e.start < end)
            .cloned()
            .collect())
    }
}

fn event(title: &str, start: DateTime<Utc>) -> CalendarEvent {
    CalendarEvent {
        id: title.to_lowercase(),
        title: title.to_string(),
        start,
        end: start + Duration::hours(1),
        all_day: false,
        status: EventStatus::Confirmed,
    }
}

fn orchestrator(weather: Arc<RecordingWeather>, store: OneCalendar) -> Orchestrator {
    Orchestrator::new(
        LocationResolver::new(Arc::new(NoFix), Arc::new(CachedAt(Coordinate::new(45.0, 7.0)))),
        WeatherLookup::new(weather),
        CalendarLookup::new(Arc::new(store)),
        "Lessons",
        "Home",
    )
}

#[tokio::test]
async fn test_cached_location_feeds_weather() {
    let weather = Arc::new(RecordingWeather::default());
    let store = OneCalendar {
        events: Vec::new(),
        failure: None,
    };

    orchestrator(weather.clone(), store).run_at(&noon()).await.unwrap();

    assert_eq!(*weather.asked.lock().unwrap(), Some(Coordinate::new(45.0, 7.0)));
}

#[tokio::test]
async fn test_tomorrow_event_when_today_is_over() {
    let now = noon();
    let store = OneCalendar {
        events: vec![
            event("Breakfast", now - Duration::hours(4)),
            event("Dentist", now + Duration::hours(22)),
        ],
        failure: None,
    };

    let data = orchestrator(Arc::new(RecordingWeather::default()), store)
        .run_at(&now)
        .await
        .unwrap();

    assert_eq!(data.next_personal_event.unwrap().title, "Dentist");
}

#[tokio::test]
async fn test_transient_calendar_failure_clears_only_that_line() {
    let now = noon();
    let store = OneCalendar {
        events: vec![event("Math", now + Duration::hours(1))],
        failure: Some(|| CalendarError::RateLimited(30)),
    };

    let data = orchestrator(Arc::new(RecordingWeather::default()), store)
        .run_at(&now)
        .await
        .unwrap();

    assert_eq!(data.next_work_event.unwrap().title, "Math");
    assert!(data.next_personal_event.is_none());
}

#[tokio::test]
async fn test_branding_icon_follows_variant() {
    let data = orchestrator(
        Arc::new(RecordingWeather::default()),
        OneCalendar {
            events: Vec::new(),
            failure: None,
        },
    )
    .run_at(&noon())
    .await
    .unwrap();

    let plain = VariantConfig {
        show_branding_image: false,
        ..VariantConfig::default()
    };
    let panel = PanelConfig {
        link_url: "https://example.com/course".to_string(),
        ..PanelConfig::default()
    };

    assert_eq!(render_in(&data, &plain, &panel, &Utc).lines.len(), 4);

    let branded = render_in(&data, &VariantConfig::default(), &panel, &Utc);
    let icon = branded.lines.last().unwrap();
    assert_eq!(icon.symbol.as_deref(), Some("book"));
    assert_eq!(icon.url, "https://example.com/course");
}
