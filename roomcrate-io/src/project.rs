//! Project persistence in a string key/value store
//!
//! A project is stored as one JSON document under [`PROJECT_STORAGE_KEY`].
//! Stored documents are validated before use: anything malformed is logged and
//! treated as "no saved project" rather than merged partially into a layout.

use crate::error::IoError;
use log::{debug, info, warn};
use roomcrate_core::{FloorMaterial, Project};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

type Result<T> = std::result::Result<T, IoError>;

pub const PROJECT_STORAGE_KEY: &str = "blueprint3d-project";

/// Minimal string storage, the shape of browser local storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Volatile store, mainly for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per entry inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// The per-user data directory, e.g. `~/.local/share/roomcrate` on Linux
    pub fn default_location() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "roomcrate").ok_or_else(|| {
            IoError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no home directory to keep projects in",
            ))
        })?;
        Ok(Self::new(dirs.data_dir()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(IoError::InvalidFormat {
                format: format!("storage key {:?}", key),
            });
        }
        Ok(self.root.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.entry_path(key)?;
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.entry_path(key)?;
        std::fs::create_dir_all(&self.root)?;
        std::fs::write(path, value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.entry_path(key)?;
        match std::fs::remove_file(path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Write the project under [`PROJECT_STORAGE_KEY`]
pub fn save_project(store: &mut dyn KeyValueStore, project: &Project) -> Result<()> {
    let json = serde_json::to_string(project).map_err(|e| IoError::WriteError { message: e.to_string() })?;
    store.set(PROJECT_STORAGE_KEY, &json)?;
    info!(
        "saved project ({} walls, {} furniture items)",
        project.walls.len(),
        project.furniture.len()
    );
    Ok(())
}

/// Check the top-level shape of a stored document
fn validate_document(value: &Value) -> std::result::Result<(), String> {
    let object = value.as_object().ok_or("document is not an object")?;
    for key in ["walls", "furniture"] {
        if !object.get(key).map_or(false, Value::is_array) {
            return Err(format!("`{}` is not an array", key));
        }
    }
    for key in ["floorMaterial", "wallColor"] {
        if !object.get(key).map_or(false, Value::is_string) {
            return Err(format!("`{}` is not a string", key));
        }
    }
    Ok(())
}

/// Parse a stored document, `None` when it does not describe a project
pub fn parse_project(text: &str) -> Option<Project> {
    let mut value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            warn!("ignoring stored project: {}", e);
            return None;
        }
    };
    if let Err(reason) = validate_document(&value) {
        warn!("ignoring stored project: {}", reason);
        return None;
    }

    if let Some(floor) = value.get_mut("floorMaterial") {
        let known = floor.as_str().map_or(false, |s| s.parse::<FloorMaterial>().is_ok());
        if !known {
            debug!("unknown floor material {}, using hardwood", floor);
            *floor = Value::from(FloorMaterial::Hardwood.as_str());
        }
    }

    match serde_json::from_value(value) {
        Ok(project) => Some(project),
        Err(e) => {
            warn!("ignoring stored project: {}", e);
            None
        }
    }
}

/// Read the stored project.
///
/// `Ok(None)` covers both "nothing saved" and "saved data is unusable"; errors
/// are reserved for the store itself failing.
pub fn load_project(store: &dyn KeyValueStore) -> Result<Option<Project>> {
    match store.get(PROJECT_STORAGE_KEY)? {
        Some(text) => Ok(parse_project(&text)),
        None => {
            debug!("no saved project under {}", PROJECT_STORAGE_KEY);
            Ok(None)
        }
    }
}
