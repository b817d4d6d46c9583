use std::io;
use std::path::PathBuf;

use disktable::TableError;
use thiserror::Error;
use wal::WalError;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A zero-length key was passed to `put`, `get` or `delete`.
    #[error("key required")]
    KeyRequired,
    /// A zero-length value was passed to `put`.
    #[error("value required")]
    ValueRequired,
    #[error("key larger than {max} bytes", max = crate::MAX_KEY_SIZE)]
    KeyTooLarge,
    #[error("value larger than {max} bytes", max = crate::MAX_VALUE_SIZE)]
    ValueTooLarge,
    /// The path given to `open` cannot be used as a database directory.
    #[error("database directory not found: {0}")]
    NotFound(PathBuf),
    #[error("write-ahead log: {0}")]
    Wal(#[from] WalError),
    #[error("disk table: {0}")]
    Table(#[from] TableError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// Every adjacent pair of disk tables is above the merge size ceiling;
    /// raise the ceiling or accept more tables than the threshold.
    #[error("no adjacent disk tables below the merge size ceiling")]
    CompactionStuck,
}

pub type Result<T> = std::result::Result<T, EngineError>;
