use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::store;
use crate::todo::Todo;

/// Where the collection blob lives. Failures never escape the adapter:
/// a load that cannot produce data degrades to an empty collection and
/// a save that cannot complete is logged and dropped, leaving the
/// in-memory state authoritative.
pub trait StorageAdapter: Send + Sync {
    fn load(&self) -> Vec<Todo>;
    fn save(&self, todos: &[Todo]);
}

#[derive(Debug, Error)]
enum StorageError {
    #[error("read failed: {0}")]
    Read(#[from] io::Error),
    #[error("decode failed: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Single JSON file holding the whole collection as one array.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_inner(&self) -> Result<Vec<Todo>, StorageError> {
        let raw = fs::read_to_string(&self.path)?;
        Ok(store::from_json(&raw)?)
    }

    fn save_inner(&self, todos: &[Todo]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let raw = store::to_json(todos)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl StorageAdapter for JsonFileStorage {
    fn load(&self) -> Vec<Todo> {
        if !self.path.exists() {
            return Vec::new();
        }
        match self.load_inner() {
            Ok(todos) => todos,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "failed to load todos, starting empty");
                Vec::new()
            }
        }
    }

    fn save(&self, todos: &[Todo]) {
        if let Err(err) = self.save_inner(todos) {
            tracing::warn!(path = %self.path.display(), %err, "failed to persist todos");
        }
    }
}
