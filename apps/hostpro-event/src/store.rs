//! Project persistence
//!
//! The whole project list is stored as one JSON value under a single key and
//! overwritten on every save. There is no schema versioning.

use log::{debug, info};
use parking_lot::Mutex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::project::EventProject;

/// Key the project list is stored under
pub const STORE_KEY: &str = "ai_events";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("stored projects are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Storage for the saved project list
pub trait ProjectStore {
    /// Load all saved projects. Nothing saved yet is an empty list.
    fn load(&self) -> Result<Vec<EventProject>, StoreError>;

    /// Replace the saved list
    fn save(&self, projects: &[EventProject]) -> Result<(), StoreError>;
}

/// `<dir>/ai_events.json`
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", STORE_KEY)),
        }
    }

    /// Store under the platform data directory
    pub fn in_default_location() -> Self {
        Self::new(default_data_dir())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// `<platform data dir>/ai-host-pro`, or the working directory when unknown
pub fn default_data_dir() -> PathBuf {
    let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("ai-host-pro");
    path
}

impl ProjectStore for JsonFileStore {
    fn load(&self) -> Result<Vec<EventProject>, StoreError> {
        if !self.path.exists() {
            debug!("No saved projects at {}", self.path.display());
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        let projects: Vec<EventProject> = serde_json::from_str(&content)?;
        info!("Loaded {} projects from {}", projects.len(), self.path.display());
        Ok(projects)
    }

    fn save(&self, projects: &[EventProject]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(projects)?;
        fs::write(&self.path, json)?;
        debug!("Saved {} projects to {}", projects.len(), self.path.display());
        Ok(())
    }
}

/// In-process store holding the serialized list, for tests and dry runs
#[derive(Default)]
pub struct MemoryStore {
    value: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored JSON, if anything was saved
    pub fn raw(&self) -> Option<String> {
        self.value.lock().clone()
    }

    pub fn with_raw(json: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(Some(json.into())),
        }
    }
}

impl ProjectStore for MemoryStore {
    fn load(&self) -> Result<Vec<EventProject>, StoreError> {
        match self.value.lock().as_deref() {
            Some(json) => Ok(serde_json::from_str(json)?),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, projects: &[EventProject]) -> Result<(), StoreError> {
        *self.value.lock() = Some(serde_json::to_string(projects)?);
        Ok(())
    }
}
