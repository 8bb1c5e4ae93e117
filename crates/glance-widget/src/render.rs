//! Text layout of the panel.

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Serialize;
use std::fmt;

use glance_calendar::CalendarEvent;
use glance_core::{PanelConfig, VariantConfig};
use glance_weather::WeatherSummary;

use crate::pipeline::WidgetData;

pub const CALENDAR_URL: &str = "calshow://";
pub const WEATHER_URL: &str = "weather://";

const WORK_MARKER: &str = "📌";
const PERSONAL_MARKER: &str = "📘";

/// One tappable row of the panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelLine {
    pub text: String,
    pub url: String,
    /// Symbol drawn instead of text (the decorative link icon)
    pub symbol: Option<String>,
}

impl PanelLine {
    fn text(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: url.into(),
            symbol: None,
        }
    }
}

impl fmt::Display for PanelLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.symbol {
            Some(symbol) => write!(f, "[{}]", symbol),
            None => f.write_str(&self.text),
        }
    }
}

/// Lines top to bottom: title, work, personal, weather, optional link icon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub lines: Vec<PanelLine>,
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Lay out `data` with event times in the local time zone.
pub fn render(data: &WidgetData, variant: &VariantConfig, panel: &PanelConfig) -> Panel {
    render_in(data, variant, panel, &Local)
}

/// Lay out `data` with event times shown in `tz`.
pub fn render_in<Tz: TimeZone>(
    data: &WidgetData,
    variant: &VariantConfig,
    panel: &PanelConfig,
    tz: &Tz,
) -> Panel
where
    Tz::Offset: fmt::Display,
{
    let time_format = time_format(&variant.time_locale);

    let mut lines = vec![
        PanelLine::text(&panel.title, &panel.title_url),
        PanelLine::text(
            event_line(
                WORK_MARKER,
                data.next_work_event.as_ref(),
                "No upcoming lessons",
                tz,
                time_format,
            ),
            CALENDAR_URL,
        ),
        PanelLine::text(
            event_line(
                PERSONAL_MARKER,
                data.next_personal_event.as_ref(),
                "No upcoming events",
                tz,
                time_format,
            ),
            CALENDAR_URL,
        ),
        PanelLine::text(weather_line(&data.weather), WEATHER_URL),
    ];

    if variant.show_branding_image {
        lines.push(PanelLine {
            text: String::new(),
            url: panel.link_url.clone(),
            symbol: Some(panel.link_symbol.clone()),
        });
    }

    Panel { lines }
}

fn event_line<Tz: TimeZone>(
    marker: &str,
    event: Option<&CalendarEvent>,
    fallback: &str,
    tz: &Tz,
    time_format: &str,
) -> String
where
    Tz::Offset: fmt::Display,
{
    match event {
        Some(event) => format!(
            "{} {} {}",
            marker,
            local_time(event.start, tz, time_format),
            event.title
        ),
        None => format!("{} {}", marker, fallback),
    }
}

fn local_time<Tz: TimeZone>(start: DateTime<Utc>, tz: &Tz, time_format: &str) -> String
where
    Tz::Offset: fmt::Display,
{
    start.with_timezone(tz).format(time_format).to_string()
}

fn weather_line(weather: &WeatherSummary) -> String {
    format!(
        "{} {}c Scope : {}c to {}c",
        weather.glyph,
        weather.temperature.to_celsius(),
        weather.high.to_celsius(),
        weather.low.to_celsius()
    )
}

/// Short time style: 12-hour for US English, 24-hour elsewhere.
fn time_format(locale: &str) -> &'static str {
    match locale.trim().replace('-', "_").to_lowercase().as_str() {
        "en" | "en_us" => "%-I:%M %p",
        _ => "%H:%M",
    }
}
