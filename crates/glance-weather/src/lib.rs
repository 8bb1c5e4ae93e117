//! Weather and location for the Glance panel.
//!
//! Resolves a coordinate (live fix, cached fix, fixed default), fetches
//! current conditions from the OpenWeatherMap One Call API and reduces them
//! to a display-ready [`WeatherSummary`].

pub mod cache;
pub mod geocode;
pub mod glyph;
pub mod location;
pub mod lookup;
pub mod provider;
pub mod types;

pub use cache::{FileLocationCache, LocationCache};
pub use geocode::{Geocoder, NominatimGeocoder, PostalAddress};
pub use glyph::{glyph_for, is_night, UNKNOWN_GLYPH};
pub use location::{IpLocator, LocationResolver, LocationSource};
pub use lookup::WeatherLookup;
pub use provider::{OneCallResponse, OpenWeatherClient, WeatherSource};
pub use types::*;
