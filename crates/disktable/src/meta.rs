use std::fs;
use std::io;
use std::path::Path;

use crate::format::{self, MERGE_STEM, TABLE_SUFFIXES};
use crate::{Result, TableError};

/// Directory-level table bookkeeping, persisted in the 16-byte
/// `maxdisktable` file as `(count, max_index)`, both u64 big-endian.
///
/// `count` is the number of live table triples; `max_index` the highest
/// index ever assigned (it never decreases). A fresh database has no
/// metadata file, which reads back as zero tables and no index yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableMeta {
    pub count: u64,
    pub max_index: Option<u64>,
}

impl TableMeta {
    /// The index the next flushed table will take.
    pub fn next_index(&self) -> u64 {
        self.max_index.map_or(0, |max| max + 1)
    }
}

/// Reads the metadata file. Absence means a fresh database.
pub fn read_meta(dir: &Path) -> Result<TableMeta> {
    let path = format::meta_path(dir);
    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Ok(TableMeta {
                count: 0,
                max_index: None,
            });
        }
        Err(e) => return Err(TableError::io_at(&path)(e)),
    };

    let (count, max_index) = codec::decode_int_pair(&bytes).map_err(TableError::codec_at(&path))?;
    Ok(TableMeta {
        count,
        max_index: Some(max_index),
    })
}

/// Rewrites the metadata file with the given live count and highest index.
pub fn write_meta(dir: &Path, count: u64, max_index: u64) -> Result<()> {
    let path = format::meta_path(dir);
    fs::write(&path, codec::encode_int_pair(count, max_index)).map_err(TableError::io_at(&path))
}

/// Renames one table triple's three files from one stem to another.
///
/// Three sequential renames inside the same directory; the directory may
/// transiently hold both stems, which readers tolerate.
pub fn rename_table(dir: &Path, from_stem: &str, to_stem: &str) -> Result<()> {
    for suffix in TABLE_SUFFIXES {
        let from = format::table_path(dir, from_stem, suffix);
        let to = format::table_path(dir, to_stem, suffix);
        fs::rename(&from, &to).map_err(TableError::io_at(&from))?;
    }
    Ok(())
}

/// Unlinks one table triple's three files.
pub fn remove_table(dir: &Path, stem: &str) -> Result<()> {
    for suffix in TABLE_SUFFIXES {
        let path = format::table_path(dir, stem, suffix);
        fs::remove_file(&path).map_err(TableError::io_at(&path))?;
    }
    Ok(())
}

/// Size of table `index`'s data file, or `None` when the table is not live.
///
/// Compaction uses this both to detect live pairs and to enforce its merge
/// size ceiling.
pub fn data_file_size(dir: &Path, index: u64) -> Result<Option<u64>> {
    let path = format::table_path(dir, &index.to_string(), format::DATA_SUFFIX);
    match fs::metadata(&path) {
        Ok(meta) => Ok(Some(meta.len())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(TableError::io_at(&path)(e)),
    }
}

/// Removes crash debris from the database directory: any `merge-*` file
/// (a pairwise merge that never completed) and any numbered table file
/// beyond `max_index` (a flush that never reached the metadata update).
///
/// Returns the number of files removed.
pub fn sweep_orphans(dir: &Path, meta: &TableMeta) -> Result<usize> {
    let entries = fs::read_dir(dir).map_err(TableError::io_at(dir))?;
    let mut removed = 0;

    for entry in entries {
        let entry = entry.map_err(TableError::io_at(dir))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };

        let orphan = match name.split_once('-') {
            Some((MERGE_STEM, suffix)) if TABLE_SUFFIXES.contains(&suffix) => true,
            _ => match format::parse_table_file(name) {
                Some((index, _)) => meta.max_index.map_or(true, |max| index > max),
                None => false,
            },
        };

        if orphan {
            tracing::warn!(file = %name, "removing orphaned table file");
            fs::remove_file(entry.path()).map_err(TableError::io_at(&entry.path()))?;
            removed += 1;
        }
    }

    Ok(removed)
}
