use std::{io, path::PathBuf};

use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by key-value backends regardless of where entries live.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing directory could not be prepared.
    #[error("failed to prepare storage directory `{}`", path.display())]
    Prepare {
        /// Directory that could not be created.
        path: PathBuf,
        /// Failure creating the directory.
        #[source]
        source: io::Error,
    },
    /// Reading or writing an entry failed.
    #[error("storage i/o failed for key `{key}`")]
    Io {
        /// Key being accessed.
        key: String,
        /// Underlying filesystem failure.
        #[source]
        source: io::Error,
    },
    /// A value could not be serialized before writing.
    #[error("failed to encode value for key `{key}`")]
    Encode {
        /// Key being written.
        key: String,
        /// Serializer failure.
        #[source]
        source: serde_json::Error,
    },
    /// The key contains characters that cannot name an entry.
    #[error("invalid storage key `{key}`")]
    InvalidKey {
        /// Offending key.
        key: String,
    },
}

/// Synchronous string key-value store, the persistence surface of the game client.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;
    /// Replace the value stored under `key`.
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;
}
