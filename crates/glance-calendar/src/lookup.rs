use chrono::{DateTime, Local, TimeZone, Utc};
use std::sync::Arc;

use crate::error::CalendarError;
use crate::store::{day_window, CalendarStore, Day};
use crate::types::CalendarEvent;

/// First event, in the given order, that has not ended by `now`.
///
/// Order is kept as supplied; an event that ends first but starts later
/// than one before it is not preferred.
pub fn select_next(
    events: impl IntoIterator<Item = CalendarEvent>,
    now: DateTime<Utc>,
) -> Option<CalendarEvent> {
    events.into_iter().find(|e| e.is_upcoming(now))
}

/// Next event of a named calendar, looking at today and then tomorrow.
pub struct CalendarLookup {
    store: Arc<dyn CalendarStore>,
}

impl CalendarLookup {
    pub fn new(store: Arc<dyn CalendarStore>) -> Self {
        Self { store }
    }

    pub async fn next_event(&self, name: &str) -> Result<Option<CalendarEvent>, CalendarError> {
        self.next_event_at(name, &Local::now()).await
    }

    /// Day boundaries follow the time zone of `now`.
    ///
    /// # Errors
    /// Any store failure, including `CalendarNotFound` for an unknown name.
    pub async fn next_event_at<Tz: TimeZone>(
        &self,
        name: &str,
        now: &DateTime<Tz>,
    ) -> Result<Option<CalendarEvent>, CalendarError> {
        let now_utc = now.with_timezone(&Utc);
        let (today_start, today_end) = day_window(now, Day::Today);
        let (tomorrow_start, tomorrow_end) = day_window(now, Day::Tomorrow);

        let calendar = self.store.find_calendar(name).await?;

        let mut events = self
            .store
            .events_between(&calendar, today_start, today_end)
            .await?;
        tracing::debug!("Got {} events today for {}", events.len(), name);

        let tomorrow = self
            .store
            .events_between(&calendar, tomorrow_start, tomorrow_end)
            .await?;
        tracing::debug!("Got {} events tomorrow for {}", tomorrow.len(), name);

        events.extend(tomorrow);

        let tz = now.timezone();
        Ok(select_next(
            events.into_iter().map(|e| e.anchored_in(&tz)),
            now_utc,
        ))
    }
}
