use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Geographic point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Used when neither a live fix nor a cached fix is available.
pub const DEFAULT_COORDINATE: Coordinate = Coordinate::new(0.0, 0.0);

/// Placeholder printed for a reading that could not be obtained.
pub const UNKNOWN_READING: &str = "?";

/// Description used when the weather could not be fetched.
pub const UNKNOWN_DESCRIPTION: &str = "Unknown";

/// A whole-number measurement, or the unknown sentinel.
///
/// Serializes as a JSON number or the string `"?"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reading {
    Value(i64),
    #[default]
    Unknown,
}

impl Reading {
    /// Round a Fahrenheit (or any imperial) value to the nearest whole number.
    /// Halves round up, so `-2.5` becomes `-2`.
    pub fn rounded(value: f64) -> Self {
        if value.is_finite() {
            Self::Value((value + 0.5).floor() as i64)
        } else {
            Self::Unknown
        }
    }

    pub fn value(self) -> Option<i64> {
        match self {
            Self::Value(v) => Some(v),
            Self::Unknown => None,
        }
    }

    /// Celsius for display, truncated toward zero.
    pub fn to_celsius(self) -> Reading {
        match self {
            Self::Value(f) => Self::Value(fahrenheit_to_celsius(f as f64)),
            Self::Unknown => Self::Unknown,
        }
    }
}

impl std::fmt::Display for Reading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{}", v),
            Self::Unknown => f.write_str(UNKNOWN_READING),
        }
    }
}

impl Serialize for Reading {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(v) => serializer.serialize_i64(*v),
            Self::Unknown => serializer.serialize_str(UNKNOWN_READING),
        }
    }
}

impl<'de> Deserialize<'de> for Reading {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(v) => Ok(Self::Value(v)),
            Raw::Text(text) if text == UNKNOWN_READING => Ok(Self::Unknown),
            Raw::Text(text) => Err(serde::de::Error::invalid_value(
                serde::de::Unexpected::Str(&text),
                &"a whole number or \"?\"",
            )),
        }
    }
}

/// Convert Fahrenheit to whole Celsius degrees, truncating toward zero.
pub fn fahrenheit_to_celsius(fahrenheit: f64) -> i64 {
    ((fahrenheit - 32.0) / 1.8).trunc() as i64
}

/// Display-ready weather conditions for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSummary {
    /// "City, State" label, when requested and resolvable
    pub location: Option<String>,
    pub glyph: String,
    pub description: String,
    /// Current temperature, °F
    pub temperature: Reading,
    pub feels_like: Reading,
    /// Today's high, °F
    pub high: Reading,
    /// Today's low, °F
    pub low: Reading,
    /// Wind speed, mph
    pub wind: Reading,
}

impl WeatherSummary {
    /// Summary used when the weather provider could not be reached or parsed.
    pub fn unknown(location: Option<String>) -> Self {
        Self {
            location,
            glyph: crate::glyph::UNKNOWN_GLYPH.to_string(),
            description: UNKNOWN_DESCRIPTION.to_string(),
            temperature: Reading::Unknown,
            feels_like: Reading::Unknown,
            high: Reading::Unknown,
            low: Reading::Unknown,
            wind: Reading::Unknown,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.glyph == crate::glyph::UNKNOWN_GLYPH
            && [
                self.temperature,
                self.feels_like,
                self.high,
                self.low,
                self.wind,
            ]
            .iter()
            .all(|r| *r == Reading::Unknown)
    }
}

/// Live location errors
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Location unavailable: {0}")]
    Unavailable(String),
    #[error("Location request failed: {0}")]
    Network(#[from] reqwest::Error),
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Weather API returned status {0}")]
    Status(u16),
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Location cache errors
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cache format error: {0}")]
    Format(#[from] serde_json::Error),
}
