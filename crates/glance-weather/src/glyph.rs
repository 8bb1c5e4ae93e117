//! OpenWeatherMap condition code to emoji glyph.
//!
//! The mapping is a static, ordered rule table: the first rule with a
//! matching code wins, and codes matched by no rule fall through to
//! [`UNKNOWN_GLYPH`]. Four sky conditions (clear and the three partly
//! cloudy variants) have a separate night glyph.
//!
//! See: https://openweathermap.org/weather-conditions

use chrono::{DateTime, Utc};

pub const UNKNOWN_GLYPH: &str = "❓";

/// Matches a single condition code or a half-open range of codes.
#[derive(Debug, Clone, Copy)]
enum Codes {
    Exact(i32),
    Range(i32, i32),
}

impl Codes {
    fn matches(&self, code: i32) -> bool {
        match *self {
            Codes::Exact(c) => c == code,
            Codes::Range(start, end) => code >= start && code < end,
        }
    }
}

struct GlyphRule {
    codes: &'static [Codes],
    day: &'static str,
    night: &'static str,
}

impl GlyphRule {
    fn matches(&self, code: i32) -> bool {
        self.codes.iter().any(|c| c.matches(code))
    }
}

macro_rules! rule {
    ([$($codes:expr),+] => $glyph:expr) => {
        GlyphRule { codes: &[$($codes),+], day: $glyph, night: $glyph }
    };
    ([$($codes:expr),+] => $day:expr, night $night:expr) => {
        GlyphRule { codes: &[$($codes),+], day: $day, night: $night }
    };
}

use Codes::{Exact, Range};

// Order matters: 701 and 781 sit inside 700..800 but are claimed earlier.
static RULES: &[GlyphRule] = &[
    // Thunderstorm, tropical storm, hurricane
    rule!([Range(200, 300), Exact(960), Exact(961)] => "⛈"),
    // Drizzle, rain, mist
    rule!([Range(300, 600), Exact(701)] => "🌧"),
    rule!([Range(600, 700)] => "❄️"),
    // Smoke
    rule!([Exact(711)] => "🔥"),
    rule!([Exact(800)] => "☀️", night "🌕"),
    rule!([Exact(801)] => "🌤", night "☁️"),
    rule!([Exact(802)] => "⛅️", night "☁️"),
    rule!([Exact(803)] => "🌥", night "☁️"),
    rule!([Exact(804)] => "☁️"),
    // Tornado
    rule!([Exact(900), Exact(962), Exact(781)] => "🌪"),
    // Remaining atmosphere codes: haze, dust, fog, sand, ash, squalls
    rule!([Range(700, 800)] => "🌫"),
    rule!([Exact(903)] => "🥶"),
    rule!([Exact(904)] => "🥵"),
    // Windy, high wind
    rule!([Exact(905), Exact(957)] => "🌬"),
    // Hail, gale, severe gale
    rule!([Exact(906), Exact(958), Exact(959)] => "🧊"),
];

/// Glyph for a condition code. Total: every code yields exactly one glyph.
pub fn glyph_for(code: i32, is_night: bool) -> &'static str {
    RULES
        .iter()
        .find(|rule| rule.matches(code))
        .map(|rule| if is_night { rule.night } else { rule.day })
        .unwrap_or(UNKNOWN_GLYPH)
}

/// Night is at or after sunset, or at or before sunrise. Without both
/// times (polar day or night) it is treated as day.
pub fn is_night(now: DateTime<Utc>, sunrise: Option<i64>, sunset: Option<i64>) -> bool {
    let (Some(sunrise), Some(sunset)) = (sunrise, sunset) else {
        return false;
    };
    let now_ms = now.timestamp_millis();
    now_ms >= sunset.saturating_mul(1000) || now_ms <= sunrise.saturating_mul(1000)
}
