use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use disktable::TableMeta;
use memtable::Memtable;
use wal::Wal;

use crate::error::{EngineError, Result};
use crate::options::Options;

/// Largest accepted key, in bytes. Hard-coded: the encoding properties
/// depend on it.
pub const MAX_KEY_SIZE: usize = 65_535;
/// Largest accepted value, in bytes. Hard-coded: the encoding properties
/// depend on it.
pub const MAX_VALUE_SIZE: usize = 65_535;

/// The LSM coordinator: one handle owning a database directory.
///
/// Exactly one instance may read and write a directory at a time, and the
/// caller must serialize access: no two operations may overlap. Freezes,
/// flushes and compactions all run inline inside the `put` that triggers
/// them.
pub struct Engine {
    dir: PathBuf,

    /// Every mutation is appended (and fsynced) here before it is applied.
    wal: Wal,

    /// All changes durable in the WAL but not yet flushed to a sorted file.
    memtable: Memtable,

    /// Frozen memtables awaiting flush, oldest first.
    immutables: Vec<Memtable>,

    /// Live disk-table count and the highest index assigned so far.
    meta: TableMeta,

    opts: Options,
}

/// Entry and byte counts for one in-memory table, as reported by
/// [`Engine::status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableStats {
    pub entries: usize,
    pub bytes: usize,
}

/// A point-in-time report of the engine's table population.
#[derive(Debug, Clone)]
pub struct Status {
    pub memtable: TableStats,
    /// One entry per frozen memtable, oldest first.
    pub immutables: Vec<TableStats>,
    pub disk_table_count: u64,
    pub max_disk_table_index: Option<u64>,
}

impl Engine {
    /// Opens the database in `dir`, creating the directory when missing.
    ///
    /// The WAL is replayed into a fresh memtable, so every mutation
    /// acknowledged before a crash is visible again. Crash debris from an
    /// unfinished flush or merge is swept away.
    pub fn open(dir: impl AsRef<Path>, opts: Options) -> Result<Self> {
        let dir = dir.as_ref();
        ensure_dir(dir)?;

        let mut wal = Wal::open(dir)?;
        let mut memtable = Memtable::new();
        wal.replay(|key, value| match value {
            Some(value) => memtable.put(key, value),
            None => memtable.delete(key),
        })?;

        let meta = disktable::read_meta(dir)?;
        let swept = disktable::sweep_orphans(dir, &meta)?;

        tracing::info!(
            dir = %dir.display(),
            replayed = memtable.len(),
            disk_tables = meta.count,
            swept,
            "opened database"
        );

        Ok(Self {
            dir: dir.to_path_buf(),
            wal,
            memtable,
            immutables: Vec::new(),
            meta,
            opts,
        })
    }

    /// Stores a value under a key, overwriting any previous value.
    ///
    /// The mutation is durable in the WAL before this returns. May freeze
    /// the memtable, flush the immutable list, and compact disk tables as
    /// side effects when their thresholds are crossed.
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Err(EngineError::KeyRequired);
        } else if key.len() > MAX_KEY_SIZE {
            return Err(EngineError::KeyTooLarge);
        } else if value.is_empty() {
            return Err(EngineError::ValueRequired);
        } else if value.len() > MAX_VALUE_SIZE {
            return Err(EngineError::ValueTooLarge);
        }

        self.wal.append(key, Some(value))?;
        self.memtable.put(key.to_vec(), value.to_vec());

        if self.memtable.bytes() >= self.opts.memtable_threshold_bytes {
            let frozen = std::mem::take(&mut self.memtable);
            self.immutables.push(frozen);
        }

        if self.immutables.len() >= self.opts.immutable_memtable_cap {
            self.flush()?;
            if self.meta.count >= self.opts.disk_table_count_threshold {
                self.compact()?;
            }
        }

        Ok(())
    }

    /// Returns the current value for a key, or `None` when the key is
    /// absent or deleted.
    ///
    /// Probes newest-first: the mutable memtable, the immutable list, then
    /// the disk tables from the highest index down. The first table that
    /// knows the key answers.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        if let Some(slot) = self.memtable.entry(key) {
            return Ok(slot.map(<[u8]>::to_vec));
        }

        for frozen in self.immutables.iter().rev() {
            if let Some(slot) = frozen.entry(key) {
                return Ok(slot.map(<[u8]>::to_vec));
            }
        }

        let hit = disktable::search(&self.dir, self.meta.max_index, key)?;
        Ok(hit.flatten())
    }

    /// Deletes a key by recording a tombstone.
    ///
    /// Deleting an absent key succeeds; the tombstone still shadows any
    /// older on-disk occurrence.
    pub fn delete(&mut self, key: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Err(EngineError::KeyRequired);
        } else if key.len() > MAX_KEY_SIZE {
            return Err(EngineError::KeyTooLarge);
        }

        self.wal.append(key, None)?;
        self.memtable.delete(key.to_vec());

        Ok(())
    }

    /// Reports entry/byte counts per in-memory table and the disk-table
    /// population.
    pub fn status(&self) -> Status {
        Status {
            memtable: TableStats {
                entries: self.memtable.len(),
                bytes: self.memtable.bytes(),
            },
            immutables: self
                .immutables
                .iter()
                .map(|t| TableStats {
                    entries: t.len(),
                    bytes: t.bytes(),
                })
                .collect(),
            disk_table_count: self.meta.count,
            max_disk_table_index: self.meta.max_index,
        }
    }

    /// Closes the engine. Nothing is flushed; every acknowledged mutation
    /// is already durable in the WAL.
    pub fn close(self) -> Result<()> {
        self.wal.close()?;
        Ok(())
    }

    /// Merges the immutable list into one sorted stream and writes it as
    /// the next disk table.
    ///
    /// Ordering matters for crash safety: the table is written and synced,
    /// then the metadata commits it, and only then is the WAL truncated. A
    /// crash between any two steps leaves a state `open` recovers from.
    fn flush(&mut self) -> Result<()> {
        let index = self.meta.next_index();

        // fold oldest-to-newest so a newer frozen table overwrites on tie
        let mut merged: BTreeMap<Vec<u8>, Option<Vec<u8>>> = BTreeMap::new();
        for frozen in &self.immutables {
            for (key, value) in frozen.iter() {
                merged.insert(key.to_vec(), value.map(<[u8]>::to_vec));
            }
        }
        let records = merged.len();

        disktable::create_table(&self.dir, index, self.opts.sparse_key_distance, merged)?;
        disktable::write_meta(&self.dir, self.meta.count + 1, index)?;
        self.wal.rotate()?;

        self.meta = TableMeta {
            count: self.meta.count + 1,
            max_index: Some(index),
        };
        self.immutables.clear();

        tracing::info!(table = index, records, "flushed immutable memtables");

        Ok(())
    }

    /// Merges the oldest adjacent pair of live tables whose combined data
    /// size fits under the ceiling.
    ///
    /// Indices can have gaps (tables merged away earlier), so candidate
    /// pairs are probed by data-file presence. When every candidate pair is
    /// over the ceiling the caller gets [`EngineError::CompactionStuck`].
    fn compact(&mut self) -> Result<()> {
        let Some(max_index) = self.meta.max_index else {
            return Ok(());
        };

        for a in 0..max_index {
            let b = a + 1;

            let Some(a_size) = disktable::data_file_size(&self.dir, a)? else {
                continue;
            };
            let Some(b_size) = disktable::data_file_size(&self.dir, b)? else {
                continue;
            };
            if a_size + b_size > self.opts.merge_size_ceiling_bytes {
                continue;
            }

            disktable::merge_tables(&self.dir, a, b, self.opts.sparse_key_distance)?;
            disktable::write_meta(&self.dir, self.meta.count - 1, max_index)?;
            self.meta.count -= 1;

            return Ok(());
        }

        Err(EngineError::CompactionStuck)
    }
}

/// Makes sure `dir` exists and is a directory, creating it when missing.
fn ensure_dir(dir: &Path) -> Result<()> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(EngineError::NotFound(dir.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir)?;
            Ok(())
        }
        Err(e) => Err(EngineError::Io(e)),
    }
}
