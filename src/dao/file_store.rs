//! Directory-backed [`KeyValueStore`]: one file per key.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use super::storage::{KeyValueStore, StorageError, StorageResult};

/// Stores every key as a file inside a single directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open the store rooted at `root`, creating the directory when needed.
    pub fn open(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StorageError::Prepare {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    /// Directory holding the entries.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, key: &str) -> StorageResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
            && !key.starts_with('.');
        if !valid {
            return Err(StorageError::InvalidKey { key: key.into() });
        }
        Ok(self.root.join(key))
    }

    /// Scratch file written before being renamed over the entry for `key`.
    fn staging_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.tmp"))
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.entry_path(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                key: key.into(),
                source,
            }),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.entry_path(key)?;
        // Write then rename so a crash never leaves a half-written entry.
        let staging = self.staging_path(key);
        fs::write(&staging, value)
            .and_then(|()| fs::rename(&staging, &path))
            .map_err(|source| StorageError::Io {
                key: key.into(),
                source,
            })
    }
}
