//! Last known-good location, kept in a small JSON key-value file.

use chrono::Utc;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::types::{CacheError, Coordinate};

pub const CACHE_KEY_LOCATION: &str = "location";
pub const CACHE_KEY_LAST_UPDATED: &str = "last_updated";

/// Key-value store holding the last known coordinate.
pub trait LocationCache: Send + Sync {
    /// Cached coordinate, if one has been written. Unreadable entries read as absent.
    fn read(&self) -> Option<Coordinate>;

    fn write(&self, coord: &Coordinate) -> Result<(), CacheError>;
}

#[derive(Debug, Clone)]
pub struct FileLocationCache {
    cache_path: PathBuf,
}

impl FileLocationCache {
    pub fn new(cache_path: impl Into<PathBuf>) -> Self {
        Self {
            cache_path: cache_path.into(),
        }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join("location_cache.json"))
    }

    pub fn path(&self) -> &Path {
        &self.cache_path
    }

    fn load_entries(&self) -> Result<Map<String, Value>, CacheError> {
        if !self.cache_path.exists() {
            return Ok(Map::new());
        }
        let contents = std::fs::read_to_string(&self.cache_path)?;
        match serde_json::from_str(&contents)? {
            Value::Object(entries) => Ok(entries),
            _ => Ok(Map::new()),
        }
    }
}

impl LocationCache for FileLocationCache {
    fn read(&self) -> Option<Coordinate> {
        let mut entries = match self.load_entries() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    "Ignoring unreadable location cache {}: {}",
                    self.cache_path.display(),
                    e
                );
                return None;
            }
        };

        let value = entries.remove(CACHE_KEY_LOCATION)?;
        match serde_json::from_value(value) {
            Ok(coord) => Some(coord),
            Err(e) => {
                tracing::warn!("Ignoring malformed cached location: {}", e);
                None
            }
        }
    }

    fn write(&self, coord: &Coordinate) -> Result<(), CacheError> {
        // Keep unrelated keys; a corrupt file is replaced.
        let mut entries = self.load_entries().unwrap_or_default();
        entries.insert(CACHE_KEY_LOCATION.to_string(), serde_json::to_value(coord)?);
        entries.insert(
            CACHE_KEY_LAST_UPDATED.to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );

        if let Some(parent) = self.cache_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&Value::Object(entries))?;
        std::fs::write(&self.cache_path, contents)?;
        Ok(())
    }
}
