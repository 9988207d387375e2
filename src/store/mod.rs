//! Progress Storage
//!
//! The mastery ledger persists through a small key-value contract so the core
//! stays testable without a real storage engine:
//! - [`MemoryStore`] - in-process map, also the fallback when nothing else is
//!   available
//! - [`JsonFileStore`] - one JSON document per key inside a directory

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use thiserror::Error;

/// Key under which the mastery record is stored
pub const PROGRESS_KEY: &str = "abc_progress";

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid key: {0:?}")]
    InvalidKey(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// String values by key
pub trait ProgressStore: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    fn clear(&self, key: &str) -> StorageResult<()>;
}

impl<T: ProgressStore + ?Sized> ProgressStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn clear(&self, key: &str) -> StorageResult<()> {
        (**self).clear(key)
    }
}
