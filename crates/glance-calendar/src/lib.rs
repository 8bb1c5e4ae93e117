//! Calendar access for the Glance panel.
//!
//! Looks calendars up by display name and selects the next entry that has
//! not ended yet from today's and tomorrow's events.

pub mod client;
pub mod error;
pub mod lookup;
pub mod store;
pub mod types;

pub use client::CalendarClient;
pub use error::CalendarError;
pub use lookup::{select_next, CalendarLookup};
pub use store::{day_window, CalendarStore, Day};
pub use types::{Calendar, CalendarEvent, EventStatus};
