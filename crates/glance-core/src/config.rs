use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

const APP_DIR: &str = "glance";
const CONFIG_FILE: &str = "config.toml";
const LOCATION_CACHE_FILE: &str = "location_cache.json";
const ENV_PREFIX: &str = "GLANCE";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OpenWeatherMap settings
    pub weather: WeatherConfig,

    /// Live location and location cache
    pub location: LocationConfig,

    /// Reverse geocoding for the location label
    pub geocoding: GeocodingConfig,

    /// Calendar store and the two calendars shown on the panel
    pub calendar: CalendarConfig,

    /// Behavior differences between panel variants
    pub variant: VariantConfig,

    /// Fixed panel text and links
    pub panel: PanelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key
    /// Create at: https://home.openweathermap.org/api_keys
    pub api_key: String,

    /// Base URL of the One Call API (without the `/onecall` path)
    pub base_url: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openweathermap.org/data/2.5".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// City-level IP geolocation endpoint used for the live fix
    pub provider_url: String,

    /// Location cache file. Defaults to `<config dir>/glance/location_cache.json`.
    pub cache_path: Option<PathBuf>,

    /// Write successful live fixes back to the cache
    pub remember: bool,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            provider_url: "http://ip-api.com/json".to_string(),
            cache_path: None,
            remember: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    /// Nominatim base URL
    pub base_url: String,

    /// Nominatim requires an identifying user agent
    pub user_agent: String,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: format!("Glance/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Google Calendar API base URL
    pub api_base_url: String,

    /// OAuth access token for the calendar API
    pub access_token: String,

    /// Display name of the calendar shown on the pinned (work) line
    pub work_calendar: String,

    /// Display name of the calendar shown on the personal line
    pub personal_calendar: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://www.googleapis.com/calendar/v3".to_string(),
            access_token: String::new(),
            work_calendar: String::new(),
            personal_calendar: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VariantConfig {
    /// Reverse geocode the coordinate into a "city, state" label
    pub include_location_label: bool,

    /// Locale used for the event start time (e.g. "it", "en_US")
    pub time_locale: String,

    /// Emit the decorative link icon below the weather line
    pub show_branding_image: bool,
}

impl Default for VariantConfig {
    fn default() -> Self {
        Self {
            include_location_label: true,
            time_locale: "it".to_string(),
            show_branding_image: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub title: String,
    pub title_url: String,
    /// Symbol name of the decorative icon
    pub link_symbol: String,
    pub link_url: String,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            title: "MESSAGE".to_string(),
            title_url: "notion://".to_string(),
            link_symbol: "book".to_string(),
            link_url: String::new(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating a default file
    /// if none exists yet.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_or_init(&Self::config_path()?)
    }

    /// Load `path`, first writing a default file there if it is missing.
    /// Environment overrides apply on the first run too.
    pub fn load_or_init(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            Self::default().save_to(path)?;
            tracing::info!("Wrote default configuration to {}", path.display());
        }

        Self::load_from(path)
    }

    /// Load configuration from a TOML file, layered with `GLANCE__SECTION__KEY`
    /// environment overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Load configuration and validate it.
    ///
    /// Warnings are logged; any validation error fails the load.
    pub fn load_validated() -> Result<(Self, ValidationResult), ConfigError> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()));
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        require(&self.weather.api_key, "weather.api_key", &mut result);
        require(&self.calendar.access_token, "calendar.access_token", &mut result);
        require(&self.calendar.work_calendar, "calendar.work_calendar", &mut result);
        require(
            &self.calendar.personal_calendar,
            "calendar.personal_calendar",
            &mut result,
        );

        validate_url(&self.weather.base_url, "weather.base_url", &mut result);
        validate_url(&self.location.provider_url, "location.provider_url", &mut result);
        validate_url(&self.calendar.api_base_url, "calendar.api_base_url", &mut result);
        if self.variant.include_location_label {
            validate_url(&self.geocoding.base_url, "geocoding.base_url", &mut result);
        }

        if self.variant.time_locale.trim().is_empty() {
            result.add_error("variant.time_locale", "Time locale must not be empty");
        }

        if !self.calendar.work_calendar.is_empty()
            && self.calendar.work_calendar == self.calendar.personal_calendar
        {
            result.add_warning(
                "calendar.personal_calendar",
                "Work and personal calendars are the same calendar",
            );
        }

        if self.variant.show_branding_image && self.panel.link_url.is_empty() {
            result.add_warning("panel.link_url", "Link icon is shown but has no URL");
        }

        result
    }

    /// Location cache file, falling back to the per-user config directory.
    pub fn location_cache_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.location.cache_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::app_dir()?.join(LOCATION_CACHE_FILE)),
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::WriteFailed(format!("{}: {}", parent.display(), e)))?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::WriteFailed(e.to_string()))?;

        std::fs::write(path, contents)
            .map_err(|e| ConfigError::WriteFailed(format!("{}: {}", path.display(), e)))
    }

    fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::app_dir()?.join(CONFIG_FILE))
    }

    fn app_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| ConfigError::NotFound("user config directory".to_string()))
    }
}

fn require(value: &str, field_name: &str, result: &mut ValidationResult) {
    if value.trim().is_empty() {
        result.add_error(field_name, "Required setting is empty");
    }
}

fn validate_url(url_str: &str, field_name: &str, result: &mut ValidationResult) {
    match Url::parse(url_str) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                result.add_error(
                    field_name,
                    format!("URL must use http or https scheme, got: {}", url.scheme()),
                );
            }

            if url.host().is_none() {
                result.add_error(field_name, "URL must have a host");
            }
        }
        Err(e) => {
            result.add_error(field_name, format!("Invalid URL: {}", e));
        }
    }
}
