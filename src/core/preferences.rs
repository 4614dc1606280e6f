//! Durable key-value preferences.
//!
//! The session keeps exactly one durable value (the selected model), but
//! it is reached through [`PreferenceStore`] so tests and alternate
//! frontends can swap the backing store.

use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::config::data::path_display;
use crate::utils::atomic_file::write_atomically;

pub const SELECTED_MODEL_KEY: &str = "selectedModel";

#[derive(Debug)]
pub enum PreferenceError {
    Io { path: PathBuf, source: std::io::Error },
    Serialize(toml::ser::Error),
}

impl fmt::Display for PreferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreferenceError::Io { path, source } => write!(
                f,
                "Failed to write preferences at {}: {}",
                path_display(path),
                source
            ),
            PreferenceError::Serialize(source) => {
                write!(f, "Failed to encode preferences: {source}")
            }
        }
    }
}

impl StdError for PreferenceError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            PreferenceError::Io { source, .. } => Some(source),
            PreferenceError::Serialize(source) => Some(source),
        }
    }
}

pub trait PreferenceStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryPreferences {
    values: BTreeMap<String, String>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let mut prefs = Self::new();
        prefs.values.insert(key.to_string(), value.to_string());
        prefs
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Flat TOML table on disk, rewritten atomically on every `set`.
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FilePreferences {
    /// Open the store at `path`. A missing or unparsable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|err| {
                tracing::warn!(
                    path = %path_display(&path),
                    error = %err,
                    "ignoring unreadable preferences file"
                );
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), PreferenceError> {
        let contents = toml::to_string_pretty(&self.values).map_err(PreferenceError::Serialize)?;
        write_atomically(&self.path, contents.as_bytes()).map_err(|source| PreferenceError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let previous = self.values.insert(key.to_string(), value.to_string());
        if let Err(err) = self.save() {
            match previous {
                Some(old) => self.values.insert(key.to_string(), old),
                None => self.values.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }
}
