//! Google Calendar API client.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::instrument;

use crate::error::CalendarError;
use crate::store::CalendarStore;
use crate::types::*;

const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const PAGE_SIZE: u32 = 50;
const MAX_PAGES: usize = 20;

pub struct CalendarClient {
    client: reqwest::Client,
    access_token: String,
    base_url: String,
}

impl CalendarClient {
    pub fn new(access_token: &str) -> Result<Self, CalendarError> {
        Self::with_base_url(access_token, CALENDAR_API_BASE)
    }

    pub fn with_base_url(access_token: &str, base_url: &str) -> Result<Self, CalendarError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            access_token: access_token.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    /// List all calendars in the user's calendar list.
    #[instrument(skip(self), level = "debug")]
    pub async fn list_calendars(&self) -> Result<Vec<Calendar>, CalendarError> {
        let mut calendars = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0;

        loop {
            let mut url = format!("{}/users/me/calendarList", self.base_url);
            if let Some(pt) = &page_token {
                url.push_str(&format!("?pageToken={}", urlencoding::encode(pt)));
            }

            let response = self
                .client
                .get(&url)
                .header("Authorization", self.auth_header())
                .send()
                .await?;

            let resp: CalendarListResponse = self.handle_response(response).await?;
            calendars.extend(resp.items.into_iter().map(Calendar::from));
            pages += 1;

            if !advance_page(&mut page_token, resp.next_page_token, pages) {
                break;
            }
        }

        Ok(calendars)
    }

    /// One page of single (expanded) events in a time range, ordered by start.
    #[instrument(skip(self), level = "debug")]
    pub async fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
        page_token: Option<&str>,
    ) -> Result<EventListResponse, CalendarError> {
        let mut url = format!(
            "{}/calendars/{}/events?timeMin={}&timeMax={}&singleEvents=true&orderBy=startTime&maxResults={}",
            self.base_url,
            urlencoding::encode(calendar_id),
            urlencoding::encode(&time_min.to_rfc3339()),
            urlencoding::encode(&time_max.to_rfc3339()),
            PAGE_SIZE,
        );

        if let Some(pt) = page_token {
            url.push_str(&format!("&pageToken={}", urlencoding::encode(pt)));
        }

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        self.handle_response(response).await
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, CalendarError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| CalendarError::ApiError(format!("JSON parse error: {}", e)))
        } else if status.as_u16() == 401 {
            Err(CalendarError::TokenExpired)
        } else if status.as_u16() == 403 {
            Err(CalendarError::AuthRequired)
        } else if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            Err(CalendarError::RateLimited(retry_after))
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(CalendarError::ApiError(format!("{}: {}", status, text)))
        }
    }
}

#[async_trait]
impl CalendarStore for CalendarClient {
    async fn find_calendar(&self, name: &str) -> Result<Calendar, CalendarError> {
        self.list_calendars()
            .await?
            .into_iter()
            .find(|c| c.summary == name)
            .ok_or_else(|| CalendarError::CalendarNotFound(name.to_string()))
    }

    async fn events_between(
        &self,
        calendar: &Calendar,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0;

        loop {
            let resp = self
                .list_events(&calendar.id, start, end, page_token.as_deref())
                .await?;

            events.extend(
                resp.items
                    .into_iter()
                    .filter_map(CalendarEvent::from_api)
                    .filter(|e| e.status != EventStatus::Cancelled),
            );
            pages += 1;

            if !advance_page(&mut page_token, resp.next_page_token, pages) {
                break;
            }
        }

        Ok(events)
    }
}

/// Move on to `next` unless paging is done, the token repeats, or the page
/// cap is reached.
fn advance_page(current: &mut Option<String>, next: Option<String>, pages: usize) -> bool {
    let Some(next) = next else {
        return false;
    };
    if current.as_deref() == Some(next.as_str()) {
        tracing::warn!("Calendar API repeated page token, stopping");
        return false;
    }
    if pages >= MAX_PAGES {
        tracing::warn!("Calendar API still paging after {} pages, stopping", pages);
        return false;
    }
    *current = Some(next);
    true
}
