//! File-backed repositories: one JSON document per entity.

use classics_anchor::{EventRepository, RepositoryError, VehicleRepository};
use classics_core::{Event, Vehicle};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;

/// A single entity stored as pretty-printed JSON at `path`.
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads and parses the stored entity.
    pub fn load<T: DeserializeOwned>(&self) -> Result<T, RepositoryError> {
        let text = std::fs::read_to_string(&self.path)?;
        serde_json::from_str(&text).map_err(|e| {
            RepositoryError::Serialization(format!("{}: {}", self.path.display(), e))
        })
    }

    /// Replaces the stored entity. Writes a sibling temp file and renames it
    /// over the original.
    pub fn store<T: Serialize>(&self, value: &T) -> Result<(), RepositoryError> {
        let mut text = serde_json::to_string_pretty(value)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        text.push('\n');
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, text)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl VehicleRepository for JsonFile {
    fn update_vehicle(&self, vehicle: &Vehicle) -> Result<(), RepositoryError> {
        self.store(vehicle)
    }
}

impl EventRepository for JsonFile {
    fn update_event(&self, event: &Event) -> Result<(), RepositoryError> {
        self.store(event)
    }
}
