//! One refresh of the Glance panel: resolve location, fetch weather, find the
//! next work and personal calendar entries, and lay them out as panel lines.

pub mod pipeline;
pub mod render;

pub use pipeline::{Orchestrator, WidgetData};
pub use render::{render, render_in, Panel, PanelLine, CALENDAR_URL, WEATHER_URL};
