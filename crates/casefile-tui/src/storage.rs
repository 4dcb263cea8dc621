//! Where settings, progress and leaderboard files live.
//!
//! The environment decides the backing store:
//! - Local: JSON files under the data directory
//! - Test: nothing touches disk

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Storage environment, selected by `CASEFILE_ENV`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// File-based storage under the data directory
    Local,
    /// In-memory only
    Test,
}

impl Environment {
    /// Detect environment from the CASEFILE_ENV variable
    pub fn detect() -> Self {
        Self::from_value(std::env::var("CASEFILE_ENV").ok().as_deref())
    }

    fn from_value(value: Option<&str>) -> Self {
        match value {
            Some("test") | Some("testing") => Environment::Test,
            _ => Environment::Local,
        }
    }
}

/// Errors from reading or writing storage files
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Resolves and reads/writes the JSON files of one data directory
#[derive(Debug, Clone)]
pub struct Storage {
    root: Option<PathBuf>,
}

impl Default for Storage {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl Storage {
    /// Default data directory: platform local data dir + `casefile`
    pub fn default_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("casefile")
    }

    /// Storage for an environment rooted at `dir`
    pub fn new(env: Environment, dir: PathBuf) -> Self {
        match env {
            Environment::Local => Self::at(dir),
            Environment::Test => Self::in_memory(),
        }
    }

    pub fn at(dir: PathBuf) -> Self {
        Self { root: Some(dir) }
    }

    pub fn in_memory() -> Self {
        Self { root: None }
    }

    pub fn is_persistent(&self) -> bool {
        self.root.is_some()
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Path of a named file, `None` when in memory
    pub fn path(&self, name: &str) -> Option<PathBuf> {
        self.root.as_ref().map(|root| root.join(name))
    }

    /// Create the data directory if needed
    pub fn ensure_dir(&self) -> StorageResult<()> {
        if let Some(root) = &self.root {
            fs::create_dir_all(root).map_err(|source| StorageError::Io {
                path: root.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Load a JSON file, falling back to the default when missing or corrupt
    pub fn load<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        let Some(path) = self.path(name) else {
            return T::default();
        };

        match fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(value) => {
                    debug!(path = %path.display(), "loaded");
                    value
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "corrupt file, using defaults");
                    T::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => T::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable file, using defaults");
                T::default()
            }
        }
    }

    /// Write a value as pretty JSON; a no-op in memory
    pub fn save<T: Serialize>(&self, name: &str, value: &T) -> StorageResult<()> {
        let Some(path) = self.path(name) else {
            return Ok(());
        };

        self.ensure_dir()?;
        let json = serde_json::to_string_pretty(value).map_err(|source| StorageError::Encode {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn test_environment_values() {
        assert_eq!(Environment::from_value(None), Environment::Local);
        assert_eq!(Environment::from_value(Some("test")), Environment::Test);
        assert_eq!(Environment::from_value(Some("prod")), Environment::Local);
    }

    #[test]
    fn test_round_trip_through_dir() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::at(dir.path().join("nested"));
        let sample = Sample {
            name: "Sherlock".into(),
            count: 3,
        };
        storage.save("sample.json", &sample).unwrap();
        assert_eq!(storage.load::<Sample>("sample.json"), sample);
    }

    #[test]
    fn test_missing_and_corrupt_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::at(dir.path().to_path_buf());
        assert_eq!(storage.load::<Sample>("missing.json"), Sample::default());

        fs::write(dir.path().join("bad.json"), "{ nope").unwrap();
        assert_eq!(storage.load::<Sample>("bad.json"), Sample::default());
    }

    #[test]
    fn test_in_memory_never_writes() {
        let storage = Storage::new(Environment::Test, PathBuf::from("/nonexistent/casefile"));
        assert!(!storage.is_persistent());
        storage.save("sample.json", &Sample::default()).unwrap();
        assert_eq!(storage.path("sample.json"), None);
    }
}
