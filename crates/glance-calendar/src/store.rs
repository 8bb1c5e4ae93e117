use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::error::CalendarError;
use crate::types::{Calendar, CalendarEvent};

/// Read-only access to a calendar provider.
#[async_trait]
pub trait CalendarStore: Send + Sync {
    /// Calendar whose display name is exactly `name`.
    ///
    /// # Errors
    /// `CalendarError::CalendarNotFound` when no calendar has that name.
    async fn find_calendar(&self, name: &str) -> Result<Calendar, CalendarError>;

    /// Events overlapping `[start, end)`, in provider order.
    async fn events_between(
        &self,
        calendar: &Calendar,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, CalendarError>;
}

/// Day scope relative to the current local date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Day {
    Today,
    Tomorrow,
}

impl Day {
    fn offset(self) -> u64 {
        match self {
            Day::Today => 0,
            Day::Tomorrow => 1,
        }
    }
}

/// `[midnight, next midnight)` of `day`, in the time zone of `now`.
pub fn day_window<Tz: TimeZone>(now: &DateTime<Tz>, day: Day) -> (DateTime<Utc>, DateTime<Utc>) {
    let tz = now.timezone();
    let date = now.date_naive() + Days::new(day.offset());
    (
        local_midnight(&tz, date),
        local_midnight(&tz, date + Days::new(1)),
    )
}

/// Midnight at the start of `date` in `tz`.
pub(crate) fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::default());
    tz.from_local_datetime(&naive)
        .earliest()
        // Midnight skipped by a DST change
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
        .with_timezone(&Utc)
}
