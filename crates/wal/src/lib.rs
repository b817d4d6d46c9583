use codec::CodecError;
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Name of the write-ahead log file inside the database directory.
pub const WAL_FILE_NAME: &str = "wal.db";

#[derive(Debug, Error)]
pub enum WalError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("corrupt write-ahead log")]
    Corrupt,
}

impl From<CodecError> for WalError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Io(e) => WalError::Io(e),
            CodecError::Corrupt => WalError::Corrupt,
        }
    }
}

/// The write-ahead log: a single append-only file of record frames, held
/// open for the lifetime of the engine.
///
/// Every mutation is appended and fsynced here before it touches the
/// memtable, so replay at open reconstructs everything that was ever
/// acknowledged. A tombstone is a record with an empty value.
pub struct Wal {
    file: File,
    path: PathBuf,
}

impl Wal {
    /// Opens (or creates) the log file `wal.db` inside `dir`.
    pub fn open(dir: &Path) -> Result<Self, WalError> {
        let path = dir.join(WAL_FILE_NAME);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)?;
        Ok(Self { file, path })
    }

    /// Appends one record and fsyncs. The mutation is durable once this
    /// returns.
    ///
    /// `value: None` records a tombstone (encoded as an empty value).
    pub fn append(&mut self, key: &[u8], value: Option<&[u8]>) -> Result<(), WalError> {
        // the handle is also used for replay, so reposition first
        self.file.seek(SeekFrom::End(0))?;
        codec::encode(key, value.unwrap_or_default(), &mut self.file)?;
        self.file.sync_all()?;
        Ok(())
    }

    /// Replays every record from the start of the log, calling
    /// `apply(key, Some(value) | None)` in append order.
    ///
    /// Stops at clean end of file. A partial trailing record surfaces as
    /// [`WalError::Corrupt`].
    pub fn replay<F>(&mut self, mut apply: F) -> Result<(), WalError>
    where
        F: FnMut(Vec<u8>, Option<Vec<u8>>),
    {
        self.file.seek(SeekFrom::Start(0))?;
        let mut reader = BufReader::new(&mut self.file);
        while let Some((key, value)) = codec::decode(&mut reader)? {
            let value = if value.is_empty() { None } else { Some(value) };
            apply(key, value);
        }
        Ok(())
    }

    /// Truncates the log in place after a flush: reopens the same path with
    /// truncation and swaps the live handle for the new one.
    pub fn rotate(&mut self) -> Result<(), WalError> {
        self.file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)?;
        Ok(())
    }

    /// Closes the log. Nothing is flushed here; every append already
    /// fsynced before returning.
    pub fn close(self) -> Result<(), WalError> {
        drop(self.file);
        Ok(())
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
