//! # Disk table: immutable on-disk table triples
//!
//! On-disk storage for the ShoalKV engine. When the engine's immutable
//! memtable list reaches its cap, the merged entries are flushed to disk as
//! a **table triple**: three files sharing a numeric stem, written once and
//! never modified (only replaced wholesale by a pairwise merge).
//!
//! ## File family for table `i`
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │ i-data    all records, ascending key order           │
//! │           [total u64 BE][key_len u64 BE][key][value] │
//! ├──────────────────────────────────────────────────────┤
//! │ i-index   one record per data record; the "value" is │
//! │           the 8-byte BE offset of the data record    │
//! ├──────────────────────────────────────────────────────┤
//! │ i-sparse  every Nth index record; the "value" is the │
//! │           8-byte BE offset of the index record       │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! plus the singleton `maxdisktable` metadata file holding
//! `(live table count, highest index assigned)` as two u64 BE.
//!
//! A point lookup narrows through the ladder: the sparse index brackets a
//! byte range of the dense index, the dense index yields the exact data
//! offset, and the data file is read from there. Higher stems are newer;
//! a lookup descends from the highest stem and stops at the first table
//! that knows the key, even when what it knows is a tombstone.

use std::io;
use std::path::{Path, PathBuf};

use codec::CodecError;
use thiserror::Error;

pub mod format;
mod merge;
mod meta;
mod reader;
mod writer;

pub use merge::{merge_tables, DataFileIter};
pub use meta::{
    data_file_size, read_meta, remove_table, rename_table, sweep_orphans, write_meta, TableMeta,
};
pub use reader::{search, search_table};
pub use writer::{create_table, DiskTableWriter};

/// The stored payload of one table record: `None` is a tombstone.
pub type TableValue = Option<Vec<u8>>;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("corrupt record in {path}")]
    Corrupt { path: PathBuf },
}

impl TableError {
    /// Tags an `io::Error` with the file it happened on.
    pub(crate) fn io_at(path: &Path) -> impl FnOnce(io::Error) -> TableError + '_ {
        move |source| TableError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Tags a codec failure with the file it happened on.
    pub(crate) fn codec_at(path: &Path) -> impl FnOnce(CodecError) -> TableError + '_ {
        move |err| match err {
            CodecError::Io(source) => TableError::Io {
                path: path.to_path_buf(),
                source,
            },
            CodecError::Corrupt => TableError::Corrupt {
                path: path.to_path_buf(),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, TableError>;
