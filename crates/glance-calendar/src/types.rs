//! Calendar types and Google Calendar API payloads.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::store::local_midnight;

/// One scheduled appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub all_day: bool,
    pub status: EventStatus,
}

impl CalendarEvent {
    /// Events that end at or after `now` are still upcoming.
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.end >= now
    }

    /// Move an all-day event onto midnight in `tz`. Timed events are unchanged.
    ///
    /// All-day dates arrive pinned to UTC midnight; call this once per event.
    pub fn anchored_in<Tz: TimeZone>(mut self, tz: &Tz) -> Self {
        if self.all_day {
            self.start = local_midnight(tz, self.start.date_naive());
            self.end = local_midnight(tz, self.end.date_naive());
        }
        self
    }
}

/// Event status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum EventStatus {
    #[default]
    Confirmed,
    Tentative,
    Cancelled,
}

/// Calendar metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calendar {
    pub id: String,
    /// Display name; calendars are looked up by this
    pub summary: String,
    pub is_primary: bool,
}

// API Response Types

/// Google Calendar API event response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    pub id: String,
    pub summary: Option<String>,
    pub start: Option<ApiEventTime>,
    pub end: Option<ApiEventTime>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEventTime {
    pub date_time: Option<String>,
    pub date: Option<String>,
}

/// API response for event list.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListResponse {
    #[serde(default)]
    pub items: Vec<ApiEvent>,
    pub next_page_token: Option<String>,
}

/// API response for calendar list.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarListResponse {
    #[serde(default)]
    pub items: Vec<ApiCalendar>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCalendar {
    pub id: String,
    pub summary: Option<String>,
    /// Name the user gave the calendar, overriding `summary` in their list
    pub summary_override: Option<String>,
    #[serde(default)]
    pub primary: bool,
}

impl CalendarEvent {
    /// Convert an API event. Events without a parseable start are skipped.
    pub fn from_api(api: ApiEvent) -> Option<Self> {
        let (start, all_day) = api.start.as_ref().and_then(parse_event_time)?;
        let end = api
            .end
            .as_ref()
            .and_then(parse_event_time)
            .map(|(end, _)| end)
            .unwrap_or(start);

        let status = match api.status.as_deref() {
            Some("tentative") => EventStatus::Tentative,
            Some("cancelled") => EventStatus::Cancelled,
            _ => EventStatus::Confirmed,
        };

        Some(Self {
            id: api.id,
            title: api.summary.unwrap_or_default(),
            start,
            end,
            all_day,
            status,
        })
    }
}

impl From<ApiCalendar> for Calendar {
    fn from(api: ApiCalendar) -> Self {
        Self {
            id: api.id,
            summary: api.summary_override.or(api.summary).unwrap_or_default(),
            is_primary: api.primary,
        }
    }
}

/// Timed events carry an RFC 3339 `dateTime`; all-day events a plain `date`,
/// taken as UTC midnight until [`CalendarEvent::anchored_in`] places it.
fn parse_event_time(api: &ApiEventTime) -> Option<(DateTime<Utc>, bool)> {
    if let Some(dt_str) = &api.date_time {
        if let Ok(dt) = DateTime::parse_from_rfc3339(dt_str) {
            return Some((dt.with_timezone(&Utc), false));
        }
    }
    if let Some(date_str) = &api.date {
        if let Ok(date) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
            return Some((date.and_hms_opt(0, 0, 0)?.and_utc(), true));
        }
    }
    None
}
