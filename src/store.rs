//! Key/value persistence for encoded boards.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No entry stored under \"{key}\"")]
    NotFound { key: String },

    #[error("Key \"{key}\" may only hold ascii letters, digits and '-'")]
    InvalidKey { key: String },

    #[error("Failed to access \"{key}\": {source}")]
    Io { key: String, source: io::Error },
}

/// A string to string store, one value per key.
///
/// Keys are expected to be made of ascii letters, digits and `-`, as [`storage_key`] builds them.
/// [`FileStore`] turns keys into file names and refuses any other key with
/// [`StoreError::InvalidKey`].
///
/// [`storage_key`]: crate::codec::storage_key
pub trait BoardStore {
    /// Fetch the value stored under `key`.
    fn get(&self, key: &str) -> Result<String, StoreError>;

    /// Store `value` under `key`, replacing whatever was there.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_ok()
    }
}

/// A store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl BoardStore for MemoryStore {
    fn get(&self, key: &str) -> Result<String, StoreError> {
        self.entries
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                key: key.to_string(),
            })
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());

        Ok(())
    }

    fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

/// A store keeping one file per key inside a directory. The directory is created on first write.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> Result<PathBuf, StoreError> {
        // The key is the file name, so it must not be able to leave the directory or collide
        // with another key
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(StoreError::InvalidKey {
                key: key.to_string(),
            });
        }

        Ok(self.dir.join(format!("{key}.txt")))
    }
}

impl BoardStore for FileStore {
    fn get(&self, key: &str) -> Result<String, StoreError> {
        let path = self.path(key)?;

        match fs::read_to_string(&path) {
            Ok(value) => {
                debug!(?path, "Read entry");
                Ok(value)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StoreError::NotFound {
                key: key.to_string(),
            }),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path(key)?;
        let io_err = |source: io::Error| StoreError::Io {
            key: key.to_string(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(io_err)?;
        fs::write(&path, value).map_err(io_err)?;

        debug!(?path, "Wrote entry");

        Ok(())
    }
}
