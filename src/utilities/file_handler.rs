//! Saving and loading run reports.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::errors::{OpAmpError, Result};

/// Writes report files into one directory.
#[derive(Debug, Clone)]
pub struct FileHandler {
    directory: PathBuf,
}

impl FileHandler {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of `stem.extension` inside the handler's directory.
    pub fn path_for(&self, stem: &str, extension: &str) -> PathBuf {
        self.directory.join(format!("{}.{}", stem, extension))
    }

    /// Write `content` to `stem.txt`, creating the directory if needed.
    pub fn save_text(&self, stem: &str, content: &str) -> Result<PathBuf> {
        let path = self.path_for(stem, "txt");
        self.write(&path, content)?;
        Ok(path)
    }

    /// Write `data` as pretty JSON to `stem.json`.
    pub fn save_json<T: Serialize>(&self, stem: &str, data: &T) -> Result<PathBuf> {
        let content = serde_json::to_string_pretty(data)
            .map_err(|e| OpAmpError::io("cannot serialize report", e.into()))?;
        let path = self.path_for(stem, "json");
        self.write(&path, &content)?;
        Ok(path)
    }

    /// Load `stem.json`. Returns `Ok(None)` when the file does not exist.
    pub fn load_json<T: DeserializeOwned>(&self, stem: &str) -> Result<Option<T>> {
        let path = self.path_for(stem, "json");
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)
            .map_err(|e| OpAmpError::io(format!("cannot read {}", path.display()), e))?;
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| OpAmpError::io(format!("invalid report {}", path.display()), e.into()))
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        fs::create_dir_all(&self.directory)
            .map_err(|e| OpAmpError::io(format!("cannot create {}", self.directory.display()), e))?;
        fs::write(path, content)
            .map_err(|e| OpAmpError::io(format!("cannot write {}", path.display()), e))?;
        log::debug!("Saved {}", path.display());
        Ok(())
    }
}

impl Default for FileHandler {
    fn default() -> Self {
        Self::new(".")
    }
}
