//! Calendar-specific error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Authentication required")]
    AuthRequired,

    #[error("Token expired")]
    TokenExpired,

    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    #[error("Calendar not found: {0}")]
    CalendarNotFound(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

impl CalendarError {
    /// User-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            Self::AuthRequired => "Calendar access was denied. Check the access token.".to_string(),
            Self::TokenExpired => "The calendar access token has expired.".to_string(),
            Self::RateLimited(secs) => format!("Too many requests. Please wait {} seconds.", secs),
            Self::CalendarNotFound(name) => format!("No calendar named \"{}\"", name),
            Self::ApiError(msg) => format!("Calendar error: {}", msg),
            Self::NetworkError(_) => "Network error. Check your connection.".to_string(),
        }
    }

    /// Errors that point at the configuration rather than a transient failure.
    /// These abort a refresh instead of degrading to "no upcoming event".
    pub fn is_misconfiguration(&self) -> bool {
        matches!(self, Self::CalendarNotFound(_))
    }
}
